//! Service ledger: services, their line items and the derived total.
//!
//! Invariant: after any item mutation commits,
//! `service.total_price == sum(item.price)` over the service's items.
//! Repositories uphold it by applying the mutation and the recomputation
//! as one unit (see [`repository::LedgerRepository::apply_item_mutation`]).

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{
    total_of, ItemMutation, ItemMutationOutcome, NewService, NewServiceItem, ServiceChanges, ServiceDetail,
    ServiceItemChanges,
};
pub use repository::LedgerRepository;
pub use service::LedgerService;
