use std::sync::Arc;

use tracing::{info, instrument};

use models::{service, service_item};

use super::domain::{
    ItemMutation, ItemMutationOutcome, NewService, NewServiceItem, ServiceChanges, ServiceDetail, ServiceItemChanges,
};
use super::repository::LedgerRepository;
use crate::access::{require_admin, require_owner_or_admin, scope_for, Principal, View};
use crate::catalog::CatalogRepository;
use crate::errors::ServiceError;
use crate::query::{ServiceFilter, ServiceQuery};

/// Authorization-gated access to services and their items.
///
/// Every item operation authorizes against the parent service's mechanic
/// and hands the write to [`LedgerRepository::apply_item_mutation`], which
/// recomputes the total in the same unit of work.
pub struct LedgerService {
    ledger: Arc<dyn LedgerRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl LedgerService {
    pub fn new(ledger: Arc<dyn LedgerRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { ledger, catalog }
    }

    async fn ensure_car(&self, car_id: i32) -> Result<(), ServiceError> {
        match self.catalog.find_car(car_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("car")),
        }
    }

    async fn load_authorized(&self, principal: &Principal, id: i32) -> Result<service::Model, ServiceError> {
        let service = self.ledger.find_service(id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
        require_owner_or_admin(principal, &service)?;
        Ok(service)
    }

    async fn load_item_authorized(
        &self,
        principal: &Principal,
        item_id: i32,
    ) -> Result<service_item::Model, ServiceError> {
        let item = self.ledger.find_item(item_id).await?.ok_or_else(|| ServiceError::not_found("item"))?;
        self.load_authorized(principal, item.service_id).await?;
        Ok(item)
    }

    /// Open a service owned by the calling mechanic with a zero total.
    #[instrument(skip(self, principal, input), fields(user_id = principal.user_id, car_id = input.car_id))]
    pub async fn create_service(&self, principal: &Principal, input: NewService) -> Result<service::Model, ServiceError> {
        self.ensure_car(input.car_id).await?;
        let created = self.ledger.insert_service(principal.user_id, &input).await?;
        info!(service_id = created.id, "service_created");
        Ok(created)
    }

    pub async fn get_service(&self, principal: &Principal, id: i32) -> Result<ServiceDetail, ServiceError> {
        let service = self.load_authorized(principal, id).await?;
        let items = self.ledger.list_items(id).await?;
        Ok(ServiceDetail { service, items })
    }

    /// Replace customer, date and car. The mechanic and the total stay.
    #[instrument(skip(self, principal, changes), fields(user_id = principal.user_id))]
    pub async fn update_service(
        &self,
        principal: &Principal,
        id: i32,
        changes: ServiceChanges,
    ) -> Result<service::Model, ServiceError> {
        self.load_authorized(principal, id).await?;
        self.ensure_car(changes.car_id).await?;
        let updated = self.ledger.update_service(id, &changes).await?;
        info!(service_id = id, "service_updated");
        Ok(updated)
    }

    /// Remove a service and all of its items.
    #[instrument(skip(self, principal), fields(user_id = principal.user_id))]
    pub async fn delete_service(&self, principal: &Principal, id: i32) -> Result<service::Model, ServiceError> {
        let service = self.load_authorized(principal, id).await?;
        self.ledger.delete_service(id).await?;
        info!(service_id = id, "service_deleted");
        Ok(service)
    }

    /// One listing for both surfaces; `view` decides the scope and with it
    /// the date bound semantics.
    #[instrument(skip(self, principal, query), fields(user_id = principal.user_id, view = ?view))]
    pub async fn list_services(
        &self,
        principal: &Principal,
        view: View,
        query: ServiceQuery,
    ) -> Result<Vec<service::Model>, ServiceError> {
        let scope = scope_for(principal, view)?;
        self.ledger.list_services(&ServiceFilter::new(scope, query)).await
    }

    #[instrument(skip(self, principal, input), fields(user_id = principal.user_id, service_id = input.service_id))]
    pub async fn create_item(
        &self,
        principal: &Principal,
        input: NewServiceItem,
    ) -> Result<ItemMutationOutcome, ServiceError> {
        self.load_authorized(principal, input.service_id).await?;
        self.mutate(ItemMutation::Create(input)).await
    }

    #[instrument(skip(self, principal, changes), fields(user_id = principal.user_id))]
    pub async fn update_item(
        &self,
        principal: &Principal,
        item_id: i32,
        changes: ServiceItemChanges,
    ) -> Result<ItemMutationOutcome, ServiceError> {
        self.load_item_authorized(principal, item_id).await?;
        self.mutate(ItemMutation::Update { item_id, changes }).await
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id))]
    pub async fn delete_item(&self, principal: &Principal, item_id: i32) -> Result<ItemMutationOutcome, ServiceError> {
        self.load_item_authorized(principal, item_id).await?;
        self.mutate(ItemMutation::Delete { item_id }).await
    }

    async fn mutate(&self, mutation: ItemMutation) -> Result<ItemMutationOutcome, ServiceError> {
        let kind = mutation.kind();
        let outcome = self.ledger.apply_item_mutation(mutation).await?;
        info!(
            kind,
            item_id = outcome.item.id,
            service_id = outcome.service.id,
            total = %outcome.service.total_price,
            "item_mutated"
        );
        Ok(outcome)
    }

    /// Re-derive a service total from its items. Administrative repair.
    #[instrument(skip(self, principal), fields(user_id = principal.user_id))]
    pub async fn reconcile_total(&self, principal: &Principal, service_id: i32) -> Result<service::Model, ServiceError> {
        require_admin(principal)?;
        let service = self.ledger.recompute_total(service_id).await?;
        info!(service_id, total = %service.total_price, "total_recomputed");
        Ok(service)
    }
}
