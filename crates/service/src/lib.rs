//! Service layer for the garage ledger.
//! - Access control predicates and the parameterized query layer.
//! - Catalog (companies, cars), identity (users) and the service ledger.
//! - Repository traits with an in-memory and a SeaORM implementation.

pub mod errors;
pub mod access;
pub mod query;
pub mod auth;
pub mod catalog;
pub mod identity;
pub mod ledger;
pub mod repo;
pub mod services;
#[cfg(test)]
pub mod test_support;

pub use access::Principal;
pub use errors::ServiceError;
pub use repo::{MemoryStore, SeaOrmStore};
pub use services::Services;
