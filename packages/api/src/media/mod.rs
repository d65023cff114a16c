use std::sync::Arc;

use anyhow::Result;

mod cloudinary;

pub use cloudinary::CloudinaryStore;

/// Upload size cap, 4 MiB.
pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Provider-side handle, used for later management.
    pub provider_id: String,
    /// Public CDN URL.
    pub url: String,
}

#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<StoredImage>;
}

pub type DynImageStore = Arc<dyn ImageStore>;
