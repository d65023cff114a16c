use anyhow::Result;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::CloudinaryConfig;

use super::{ImageStore, StoredImage};

pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Signed upload parameters must be concatenated in alphabetical key
    /// order before hashing, with the API secret appended. The account is
    /// configured for SHA-256 signatures.
    fn signature(&self, timestamp: i64) -> String {
        let payload = format!(
            "folder={}&timestamp={}{}",
            self.config.folder, timestamp, self.config.api_secret
        );
        hex::encode(Sha256::digest(payload.as_bytes()))
    }
}

#[async_trait::async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<StoredImage> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.signature(timestamp);

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", self.config.folder.clone())
            .text("signature", signature);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        );

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Cloudinary upload failed with {}: {}", status, body);
            anyhow::bail!("Image upload failed with status {}", status);
        }

        let uploaded = response.json::<UploadResponse>().await?;
        Ok(StoredImage {
            provider_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }
}
