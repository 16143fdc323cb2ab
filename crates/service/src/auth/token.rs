//! HMAC-signed bearer tokens. The secret, algorithm and lifetime are
//! injected from configuration.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use configs::AuthConfig;
use models::user;

use super::domain::Claims;
use super::errors::AuthError;

#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager").field("algorithm", &self.algorithm).field("ttl", &self.ttl).finish()
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, AuthError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(AuthError::TokenError(format!("unsupported algorithm {other}"))),
    }
}

impl TokenManager {
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl: Duration) -> Self {
        Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Result<Self, AuthError> {
        let algorithm = parse_algorithm(&cfg.algorithm)?;
        Ok(Self::new(cfg.jwt_secret.as_bytes(), algorithm, Duration::minutes(cfg.token_ttl_minutes)))
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, user: &user::Model) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    pub(crate) fn issue_at(&self, user: &user::Model, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.username.clone(),
            uid: user.id,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature, algorithm and expiry. Any failure is `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("token_expired"),
                other => tracing::debug!(reason = ?other, "token_rejected"),
            }
            AuthError::Unauthorized
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> user::Model {
        user::Model { id: 7, username: "alice".into(), password_hash: String::new(), is_admin: false }
    }

    fn manager(secret: &str) -> TokenManager {
        TokenManager::new(secret.as_bytes(), Algorithm::HS256, Duration::minutes(30))
    }

    #[test]
    fn issued_token_verifies() {
        let tm = manager("0123456789abcdef");
        let claims = tm.verify(&tm.issue(&user()).unwrap()).unwrap();
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = manager("0123456789abcdef").issue(&user()).unwrap();
        assert!(matches!(manager("fedcba9876543210").verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tm = manager("0123456789abcdef");
        let token = tm.issue_at(&user(), Utc::now() - Duration::hours(2)).unwrap();
        assert!(matches!(tm.verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn algorithm_mismatch_is_rejected() {
        let hs512 = TokenManager::new(b"0123456789abcdef", Algorithm::HS512, Duration::minutes(5));
        let token = hs512.issue(&user()).unwrap();
        assert!(manager("0123456789abcdef").verify(&token).is_err());
    }

    #[test]
    fn from_config_reads_algorithm_and_ttl() {
        let cfg = AuthConfig { jwt_secret: "0123456789abcdef".into(), algorithm: "hs384".into(), token_ttl_minutes: 5 };
        let tm = TokenManager::from_config(&cfg).unwrap();
        assert_eq!(tm.ttl_secs(), 300);
        let bad = AuthConfig { algorithm: "RS256".into(), ..cfg };
        assert!(TokenManager::from_config(&bad).is_err());
    }
}
