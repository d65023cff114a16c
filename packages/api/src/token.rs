//! Auth token signing and verification.
//!
//! Tokens are HS256 JWTs carrying the authenticated identity
//! `{sub, role, name}` plus standard time claims, valid for 7 days. The
//! signing secret is part of [`crate::config::Config`] and is injected at
//! deploy time so all API instances agree on it.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::TOKEN_TTL_SECONDS;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::user;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: UserRole,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue(secret: &str, user: &user::Model) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        role: user.role,
        name: user.name.clone(),
        iat,
        exp: iat + TOKEN_TTL_SECONDS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the embedded identity claims.
pub fn verify(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::sea_orm_active_enums::UserRole;

    fn test_user(role: UserRole) -> user::Model {
        let now = chrono::Utc::now().naive_utc();
        user::Model {
            id: "user-1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: String::new(),
            role,
            store_name: None,
            phone: None,
            reset_otp_hash: None,
            reset_otp_expires_at: None,
            address_line1: None,
            address_line2: None,
            address_city: None,
            address_state: None,
            address_postal_code: None,
            address_country: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_roundtrip_preserves_identity() {
        let user = test_user(UserRole::Seller);
        let token = issue("test-secret", &user).expect("Failed to sign");
        let claims = verify("test-secret", &token).expect("Failed to verify");

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, UserRole::Seller);
        assert_eq!(claims.name, "Asha");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECONDS);
    }

    #[test]
    fn wrong_secret_rejected() {
        let user = test_user(UserRole::Customer);
        let token = issue("test-secret", &user).expect("Failed to sign");
        assert!(verify("other-secret", &token).is_err());
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(verify("test-secret", "not.a.token").is_err());
    }
}
