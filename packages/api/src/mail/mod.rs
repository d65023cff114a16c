use std::sync::Arc;

use anyhow::Result;

mod smtp;
pub mod templates;

pub use smtp::SmtpMailClient;

#[derive(Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_html: Option<String>,
    pub body_text: Option<String>,
}

#[async_trait::async_trait]
pub trait MailClient: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
    fn from_email(&self) -> &str;
    fn from_name(&self) -> &str;
}

pub type DynMailClient = Arc<dyn MailClient>;
