use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::errors::AppError;

/// Signing configuration for session tokens. Built once at startup and shared
/// read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Arc<Vec<u8>>,
    pub exp_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<Vec<u8>>, exp_hours: i64) -> Self {
        Self {
            secret: Arc::new(secret.into()),
            exp_hours,
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| AppError::configuration("JWT_SECRET not set"))?;
        if secret.is_empty() {
            return Err(AppError::configuration("JWT_SECRET must not be empty"));
        }

        let exp_hours = std::env::var("JWT_EXP_HOURS")
            .map(|val| val.parse::<i64>())
            .unwrap_or(Ok(24))
            .map_err(|_| AppError::configuration("JWT_EXP_HOURS must be a valid integer"))?;

        if exp_hours <= 0 {
            return Err(AppError::configuration("JWT_EXP_HOURS must be positive"));
        }

        Ok(Self::new(secret.into_bytes(), exp_hours))
    }

    pub fn encode(&self, user_id: Uuid) -> Result<String, AppError> {
        self.encode_with_ttl(user_id, Duration::hours(self.exp_hours))
    }

    pub fn encode_with_ttl(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: user_id,
            exp: exp.timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|err| AppError::internal(format!("failed to sign token: {err}")))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|err| AppError::invalid_token(err.to_string()))
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig::new("unit-test-secret", 1)
    }

    #[test]
    fn issued_token_round_trips_subject() {
        let jwt = config();
        let id = Uuid::new_v4();
        let token = jwt.encode(id).unwrap();
        let claims = jwt.decode(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = config();
        let token = jwt.encode_with_ttl(Uuid::new_v4(), Duration::seconds(-30)).unwrap();
        let err = jwt.decode(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken(_)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = JwtConfig::new("other-secret", 1).encode(Uuid::new_v4()).unwrap();
        assert!(matches!(config().decode(&token), Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(config().decode("not.a.jwt"), Err(AppError::InvalidToken(_))));
        assert!(matches!(config().decode(""), Err(AppError::InvalidToken(_))));
    }
}
