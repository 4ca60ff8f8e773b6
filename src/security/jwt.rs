/// Session token generation and validation (HS256).
/// Tokens live in an HTTP-only cookie with a fixed 1-day expiry.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Keys derived from the configured secret, shared through app data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn generate_token(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let keys = JwtKeys::new("test-secret", 86400);
        let user_id = Uuid::new_v4();

        let token = keys.generate_token(user_id).unwrap();
        let data = keys.validate_token(&token).unwrap();

        assert_eq!(data.claims.sub, user_id.to_string());
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let keys = JwtKeys::new("test-secret", 86400);
        let other = JwtKeys::new("other-secret", 86400);

        let token = keys.generate_token(Uuid::new_v4()).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = JwtKeys::new("test-secret", 86400);
        assert!(keys.validate_token("not.a.token").is_err());
    }
}
