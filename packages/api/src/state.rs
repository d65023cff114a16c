use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::entity::user;
use crate::error::ApiError;
use crate::mail::DynMailClient;
use crate::media::DynImageStore;
use crate::payment::DynPaymentGateway;
use crate::token::{self, Claims};

pub type AppState = Arc<State>;

pub struct State {
    pub config: Config,
    pub db: DatabaseConnection,
    /// Payment provider. Checkout routes report a configuration error when unset.
    pub gateway: Option<DynPaymentGateway>,
    pub mail_client: Option<DynMailClient>,
    pub image_store: Option<DynImageStore>,
}

impl State {
    pub fn new(config: Config, db: DatabaseConnection) -> Self {
        Self {
            config,
            db,
            gateway: None,
            mail_client: None,
            image_store: None,
        }
    }

    pub fn with_gateway(mut self, gateway: DynPaymentGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_mail_client(mut self, mail_client: DynMailClient) -> Self {
        self.mail_client = Some(mail_client);
        self
    }

    pub fn with_image_store(mut self, image_store: DynImageStore) -> Self {
        self.image_store = Some(image_store);
        self
    }

    pub fn issue_token(&self, user: &user::Model) -> Result<String, ApiError> {
        Ok(token::issue(&self.config.jwt_secret, user)?)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        Ok(token::verify(&self.config.jwt_secret, token)?)
    }

    pub fn gateway(&self) -> Result<&DynPaymentGateway, ApiError> {
        self.gateway
            .as_ref()
            .ok_or_else(|| ApiError::upstream("Payment gateway is not configured"))
    }

    pub fn image_store(&self) -> Result<&DynImageStore, ApiError> {
        self.image_store
            .as_ref()
            .ok_or_else(|| ApiError::upstream("Image storage is not configured"))
    }
}
