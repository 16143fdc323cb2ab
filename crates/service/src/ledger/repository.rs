use async_trait::async_trait;

use models::{service, service_item};

use super::domain::{ItemMutation, ItemMutationOutcome, NewService, ServiceChanges};
use crate::errors::ServiceError;
use crate::query::ServiceFilter;

/// Persistence for services and their items.
///
/// Implementations must serialize item mutations per service and commit
/// each [`ItemMutation`] together with the recomputed total, re-reading
/// the full item set rather than adjusting a running sum.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Insert a service for `mechanic_id` with a zero total.
    async fn insert_service(&self, mechanic_id: i32, input: &NewService) -> Result<service::Model, ServiceError>;
    async fn find_service(&self, id: i32) -> Result<Option<service::Model>, ServiceError>;
    async fn update_service(&self, id: i32, changes: &ServiceChanges) -> Result<service::Model, ServiceError>;
    /// Remove a service together with all of its items.
    async fn delete_service(&self, id: i32) -> Result<(), ServiceError>;
    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<service::Model>, ServiceError>;
    async fn count_services_for_cars(&self, car_ids: &[i32]) -> Result<u64, ServiceError>;
    async fn count_services_for_mechanic(&self, mechanic_id: i32) -> Result<u64, ServiceError>;

    async fn find_item(&self, id: i32) -> Result<Option<service_item::Model>, ServiceError>;
    async fn list_items(&self, service_id: i32) -> Result<Vec<service_item::Model>, ServiceError>;
    /// Apply one item write and recompute the parent total atomically.
    async fn apply_item_mutation(&self, mutation: ItemMutation) -> Result<ItemMutationOutcome, ServiceError>;
    /// Re-derive `total_price` from the current item set.
    async fn recompute_total(&self, service_id: i32) -> Result<service::Model, ServiceError>;
}
