use serde::{Deserialize, Serialize};

use models::user;

/// Username and plaintext password as submitted by a caller.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// JWT claims. `sub` carries the username for readability, `uid` is what
/// resolution relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub uid: i32,
    pub iat: i64,
    pub exp: i64,
}

/// Login result
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: user::Model,
    pub token: String,
    pub expires_in: i64,
}
