//! HS256 access tokens

use crate::auth::models::JwtClaims;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use py3ready_core::models::User;
use py3ready_core::AppError;
use uuid::Uuid;

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AppError::InternalWithSource {
                message: "Failed to sign access token".to_string(),
                source: anyhow::Error::new(e),
            }
        })
    }

    /// Signature, algorithm and expiry are all checked.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AppError::Unauthorized("Could not validate credentials".to_string())
            })
    }

    /// Verify and return the user id carried in `sub`.
    pub fn verify_user_id(&self, token: &str) -> Result<Uuid, AppError> {
        let claims = self.verify(token)?;
        Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Could not validate credentials".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "dev@example.com".into(),
            username: "dev".into(),
            hashed_password: String::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let service = JwtService::new(SECRET, 24);
        let user = user();
        let token = service.issue(&user).unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "dev@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(service.verify_user_id(&token).unwrap(), user.id);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = JwtService::new(SECRET, 24).issue(&user()).unwrap();
        let other = JwtService::new("another-secret-that-is-32-characters-long", 24);
        assert!(matches!(other.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let service = JwtService::new(SECRET, -2);
        let token = service.issue(&user()).unwrap();
        assert!(matches!(service.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let service = JwtService::new(SECRET, 24);
        assert!(service.verify("not.a.jwt").is_err());
    }
}
