use serde::{Deserialize, Serialize};

pub mod admin;
pub mod auth;
pub mod health;
pub mod marketers;
pub mod orders;
pub mod payments;
pub mod products;
pub mod uploads;
pub mod users;

#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct PaginationParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PaginationParams {
    /// Clamp to a sane page size so a bad query cannot dump the table.
    pub fn limit(&self, default: u64, max: u64) -> u64 {
        self.limit.unwrap_or(default).min(max)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}
