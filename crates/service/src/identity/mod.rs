//! Identity store: mechanics and administrators.

pub mod repository;
pub mod service;

pub use repository::IdentityRepository;
pub use service::IdentityService;

/// A user ready to persist. The credential arrives already hashed; the
/// store never sees a plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Admin-editable fields.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub is_admin: bool,
}
