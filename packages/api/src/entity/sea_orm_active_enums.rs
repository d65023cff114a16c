//! Closed enums shared by the entities. Stored as plain strings so the same
//! definitions work against Postgres and the SQLite test harness.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "seller")]
    Seller,
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "marketer")]
    Marketer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[sea_orm(string_value = "jewellery")]
    Jewellery,
    #[sea_orm(string_value = "saree")]
    Saree,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "payment_pending")]
    PaymentPending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "packed")]
    Packed,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PaymentPending => "payment_pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    fn shipping_rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Confirmed => Some(0),
            OrderStatus::Packed => Some(1),
            OrderStatus::Shipped => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::PaymentPending | OrderStatus::Cancelled => None,
        }
    }

    /// Whether a seller may move an order from `self` to `next`.
    ///
    /// Orders awaiting payment cannot be touched, terminal states cannot be
    /// left, and the shipping lifecycle only ever moves forward. Cancellation
    /// is allowed from any post-confirmation state.
    pub fn seller_can_advance_to(&self, next: OrderStatus) -> bool {
        let Some(current_rank) = self.shipping_rank() else {
            return false;
        };
        match next {
            OrderStatus::Cancelled => true,
            OrderStatus::Packed | OrderStatus::Shipped | OrderStatus::Delivered => next
                .shipping_rank()
                .map(|rank| rank > current_rank)
                .unwrap_or(false),
            OrderStatus::PaymentPending | OrderStatus::Confirmed => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
}
