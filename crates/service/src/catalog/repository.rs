use async_trait::async_trait;

use models::{car, company};

use super::{CarChanges, NewCar};
use crate::errors::ServiceError;
use crate::query::{CarFilter, CompanyFilter};

/// Persistence for companies and cars. Company names and
/// `(car name, company)` pairs are unique at this layer; violations
/// surface as [`ServiceError::Conflict`].
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_companies(&self, filter: &CompanyFilter) -> Result<Vec<company::Model>, ServiceError>;
    async fn find_company(&self, id: i32) -> Result<Option<company::Model>, ServiceError>;
    async fn find_company_by_name(&self, name: &str) -> Result<Option<company::Model>, ServiceError>;
    async fn insert_company(&self, name: &str) -> Result<company::Model, ServiceError>;
    async fn rename_company(&self, id: i32, name: &str) -> Result<company::Model, ServiceError>;
    /// Remove a company and every car it owns.
    async fn delete_company(&self, id: i32) -> Result<(), ServiceError>;

    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<car::Model>, ServiceError>;
    async fn find_car(&self, id: i32) -> Result<Option<car::Model>, ServiceError>;
    async fn find_car_by_name(&self, company_id: i32, name: &str) -> Result<Option<car::Model>, ServiceError>;
    async fn insert_car(&self, input: &NewCar) -> Result<car::Model, ServiceError>;
    async fn update_car(&self, id: i32, changes: &CarChanges) -> Result<car::Model, ServiceError>;
    async fn delete_car(&self, id: i32) -> Result<(), ServiceError>;
}
