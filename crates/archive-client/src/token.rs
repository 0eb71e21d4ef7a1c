//! Short-lived HS256 bearer tokens.

use std::time::Duration;

use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

/// Default token lifetime: 100 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(100 * 60);

/// Claims of an issued token. Only the expiry is asserted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// Signs bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a JWT expiring `ttl` from now.
    pub fn token(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = chrono::Utc::now().timestamp() + self.ttl.as_secs() as i64;
        encode(&Header::default(), &Claims { exp }, &self.key)
    }

    /// Issues a token formatted as an `Authorization` header value.
    pub fn bearer(&self) -> Result<String, jsonwebtoken::errors::Error> {
        Ok(format!("Bearer {}", self.token()?))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

    #[test]
    fn token_verifies_with_secret() {
        let issuer = TokenIssuer::new("s3cret", DEFAULT_TTL);
        let token = issuer.token().unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"s3cret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.header.alg, Algorithm::HS256);

        let now = chrono::Utc::now().timestamp();
        let ttl = DEFAULT_TTL.as_secs() as i64;
        assert!(data.claims.exp > now + ttl - 60);
        assert!(data.claims.exp <= now + ttl);
    }

    #[test]
    fn token_rejected_with_other_secret() {
        let token = TokenIssuer::new("s3cret", DEFAULT_TTL).token().unwrap();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }

    #[test]
    fn bearer_prefix() {
        let bearer = TokenIssuer::new("k", Duration::from_secs(60))
            .bearer()
            .unwrap();
        assert!(bearer.starts_with("Bearer "));
        assert_eq!(bearer.split('.').count(), 3);
    }

    #[test]
    fn debug_hides_key() {
        let issuer = TokenIssuer::new("s3cret", DEFAULT_TTL);
        assert!(!format!("{issuer:?}").contains("s3cret"));
    }
}
