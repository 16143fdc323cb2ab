use std::sync::Arc;

use tracing::{info, instrument};

use models::{car, company};

use super::repository::CatalogRepository;
use super::{CarChanges, CarDetail, CompanyDetail, NewCar};
use crate::access::{require_admin, Principal};
use crate::errors::ServiceError;
use crate::ledger::LedgerRepository;
use crate::query::{CarFilter, CompanyFilter};

/// Catalog business rules. Reads are open to any authenticated caller;
/// every mutation requires an administrator.
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepository>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { catalog, ledger }
    }

    pub async fn list_companies(&self, filter: &CompanyFilter) -> Result<Vec<company::Model>, ServiceError> {
        self.catalog.list_companies(filter).await
    }

    pub async fn get_company(&self, id: i32) -> Result<CompanyDetail, ServiceError> {
        let company = self.catalog.find_company(id).await?.ok_or_else(|| ServiceError::not_found("company"))?;
        let cars = self.catalog.list_cars(&CarFilter { name: None, company_id: Some(id) }).await?;
        Ok(CompanyDetail { company, cars })
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id))]
    pub async fn create_company(&self, principal: &Principal, name: &str) -> Result<company::Model, ServiceError> {
        require_admin(principal)?;
        if self.catalog.find_company_by_name(name).await?.is_some() {
            return Err(ServiceError::conflict("company with this name exists"));
        }
        let created = self.catalog.insert_company(name).await?;
        info!(company_id = created.id, "company_created");
        Ok(created)
    }

    #[instrument(skip(self, principal), fields(user_id = principal.user_id))]
    pub async fn rename_company(&self, principal: &Principal, id: i32, name: &str) -> Result<company::Model, ServiceError> {
        require_admin(principal)?;
        self.catalog.find_company(id).await?.ok_or_else(|| ServiceError::not_found("company"))?;
        if let Some(existing) = self.catalog.find_company_by_name(name).await? {
            if existing.id != id {
                return Err(ServiceError::conflict("company with this name exists"));
            }
        }
        let updated = self.catalog.rename_company(id, name).await?;
        info!(company_id = id, "company_renamed");
        Ok(updated)
    }

    /// Delete a company and its cars. Refused while any of those cars is
    /// referenced by a service.
    #[instrument(skip(self, principal), fields(user_id = principal.user_id))]
    pub async fn delete_company(&self, principal: &Principal, id: i32) -> Result<company::Model, ServiceError> {
        require_admin(principal)?;
        let company = self.catalog.find_company(id).await?.ok_or_else(|| ServiceError::not_found("company"))?;
        let car_ids: Vec<i32> = self
            .catalog
            .list_cars(&CarFilter { name: None, company_id: Some(id) })
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        let referencing = self.ledger.count_services_for_cars(&car_ids).await?;
        if referencing > 0 {
            return Err(ServiceError::conflict(format!("{referencing} services reference cars of this company")));
        }
        self.catalog.delete_company(id).await?;
        info!(company_id = id, cars = car_ids.len(), "company_deleted");
        Ok(company)
    }

    pub async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<car::Model>, ServiceError> {
        self.catalog.list_cars(filter).await
    }

    pub async fn get_car(&self, id: i32) -> Result<CarDetail, ServiceError> {
        let car = self.catalog.find_car(id).await?.ok_or_else(|| ServiceError::not_found("car"))?;
        let company = self
            .catalog
            .find_company(car.company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("company"))?;
        Ok(CarDetail { car, company })
    }

    #[instrument(skip(self, principal, input), fields(user_id = principal.user_id, company_id = input.company_id))]
    pub async fn create_car(&self, principal: &Principal, input: &NewCar) -> Result<car::Model, ServiceError> {
        require_admin(principal)?;
        self.catalog
            .find_company(input.company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("company"))?;
        if self.catalog.find_car_by_name(input.company_id, &input.name).await?.is_some() {
            return Err(ServiceError::conflict("company has car with same name"));
        }
        let created = self.catalog.insert_car(input).await?;
        info!(car_id = created.id, "car_created");
        Ok(created)
    }

    #[instrument(skip(self, principal, changes), fields(user_id = principal.user_id))]
    pub async fn update_car(&self, principal: &Principal, id: i32, changes: &CarChanges) -> Result<car::Model, ServiceError> {
        require_admin(principal)?;
        self.catalog.find_car(id).await?.ok_or_else(|| ServiceError::not_found("car"))?;
        self.catalog
            .find_company(changes.company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("company"))?;
        if let Some(existing) = self.catalog.find_car_by_name(changes.company_id, &changes.name).await? {
            if existing.id != id {
                return Err(ServiceError::conflict("company has car with same name"));
            }
        }
        let updated = self.catalog.update_car(id, changes).await?;
        info!(car_id = id, "car_updated");
        Ok(updated)
    }

    /// Delete a car no service references.
    #[instrument(skip(self, principal), fields(user_id = principal.user_id))]
    pub async fn delete_car(&self, principal: &Principal, id: i32) -> Result<car::Model, ServiceError> {
        require_admin(principal)?;
        let car = self.catalog.find_car(id).await?.ok_or_else(|| ServiceError::not_found("car"))?;
        let referencing = self.ledger.count_services_for_cars(&[id]).await?;
        if referencing > 0 {
            return Err(ServiceError::conflict(format!("{referencing} services reference this car")));
        }
        self.catalog.delete_car(id).await?;
        info!(car_id = id, "car_deleted");
        Ok(car)
    }
}
