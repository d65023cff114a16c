use std::env;

use ratna_api::config::{CloudinaryConfig, RazorpayConfig, SmtpConfig};

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub client_origins: Vec<String>,
    pub razorpay: Option<RazorpayConfig>,
    pub smtp: Option<SmtpConfig>,
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string());
        if jwt_secret == "dev-secret" {
            tracing::warn!("JWT_SECRET not set, using the development default");
        }

        let client_origins = env::var("CLIENT_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let razorpay = match (env::var("RAZORPAY_KEY_ID"), env::var("RAZORPAY_KEY_SECRET")) {
            (Ok(key_id), Ok(key_secret)) => Some(RazorpayConfig { key_id, key_secret }),
            (Err(_), Err(_)) => None,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET must be set together".to_string(),
                ));
            }
        };

        let smtp = match env::var("SMTP_HOST") {
            Err(_) => None,
            Ok(host) => {
                let port = env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("SMTP_PORT".to_string()))?;
                Some(SmtpConfig {
                    host,
                    port,
                    username: env::var("SMTP_USERNAME")
                        .map_err(|_| ConfigError::MissingVar("SMTP_USERNAME"))?,
                    password: env::var("SMTP_PASSWORD")
                        .map_err(|_| ConfigError::MissingVar("SMTP_PASSWORD"))?,
                    from_email: env::var("SMTP_FROM_EMAIL")
                        .map_err(|_| ConfigError::MissingVar("SMTP_FROM_EMAIL"))?,
                    from_name: env::var("SMTP_FROM_NAME")
                        .unwrap_or_else(|_| "Ratna".to_string()),
                })
            }
        };

        let cloudinary = match env::var("CLOUDINARY_CLOUD_NAME") {
            Err(_) => None,
            Ok(cloud_name) => Some(CloudinaryConfig {
                cloud_name,
                api_key: env::var("CLOUDINARY_API_KEY")
                    .map_err(|_| ConfigError::MissingVar("CLOUDINARY_API_KEY"))?,
                api_secret: env::var("CLOUDINARY_API_SECRET")
                    .map_err(|_| ConfigError::MissingVar("CLOUDINARY_API_SECRET"))?,
                folder: env::var("CLOUDINARY_FOLDER").unwrap_or_else(|_| "ratna".to_string()),
            }),
        };

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
            database_url,
            jwt_secret,
            client_origins,
            razorpay,
            smtp,
            cloudinary,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for: {0}")]
    InvalidValue(String),
}
