//! Auth collaborators: password hashing, bearer tokens and the service
//! that turns credentials into a [`Principal`](crate::access::Principal).

pub mod domain;
pub mod errors;
pub mod password;
pub mod service;
pub mod token;

pub use errors::AuthError;
pub use service::AuthService;
pub use token::TokenManager;
