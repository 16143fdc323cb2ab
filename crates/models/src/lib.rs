//! SeaORM entities for the service ledger plus the field validators the
//! HTTP layer runs before handing input to the core.

pub mod errors;
pub mod db;
pub mod user;
pub mod company;
pub mod car;
pub mod service;
pub mod service_item;

pub use rust_decimal::Decimal;
