use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::JwtConfig,
    error::{AppError, Result},
};

/// The wire shape is exactly `{id, salt}` (§6) — no `exp`, no `jti`. Token lifetime is
/// unbounded in wall-clock terms; revocation is by rotating `users.key_salt`, which
/// invalidates every token issued against the old salt in O(1) (used for logout and for
/// moderator bans).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub id: i64,
    pub salt: String,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(jwt_config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(jwt_config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_config.secret.as_bytes()),
            validation,
        }
    }

    pub fn create_token(&self, user_id: i64, salt: &str) -> Result<String> {
        let claims = JwtClaims {
            id: user_id,
            salt: salt.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    pub fn decode_token(&self, token: &str) -> Result<JwtClaims> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AppError::InvalidToken)?;
        Ok(data.claims)
    }
}
