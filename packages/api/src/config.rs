//! Explicitly constructed runtime configuration.
//!
//! The binary crate assembles a [`Config`] from its environment and hands it
//! to [`crate::state::State`]; nothing inside the library reads process state,
//! which keeps the core testable without environment mutation.

/// Token lifetime: 7 days from issuance.
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Password-reset codes expire 10 minutes after they are generated.
pub const OTP_TTL_MINUTES: i64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    /// HS256 signing secret for auth tokens
    pub jwt_secret: String,
    /// Origins allowed by the CORS layer
    pub client_origins: Vec<String>,
}

impl Config {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            client_origins: vec!["http://localhost:8080".to_string()],
        }
    }

    pub fn with_client_origins(mut self, origins: Vec<String>) -> Self {
        if !origins.is_empty() {
            self.client_origins = origins;
        }
        self
    }
}

/// Payment gateway credentials, held by the gateway client only.
#[derive(Clone, Debug)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
}

/// SMTP transport settings for the mail client.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

/// Image/CDN store credentials.
#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder uploads are placed under
    pub folder: String,
}
