//! Catalog store: companies and the cars they make.

pub mod repository;
pub mod service;

use serde::Deserialize;

use models::{car, company};

pub use repository::CatalogRepository;
pub use service::CatalogService;

#[derive(Debug, Clone, Deserialize)]
pub struct NewCar {
    pub name: String,
    pub company_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarChanges {
    pub name: String,
    pub company_id: i32,
}

#[derive(Debug, Clone)]
pub struct CompanyDetail {
    pub company: company::Model,
    pub cars: Vec<car::Model>,
}

#[derive(Debug, Clone)]
pub struct CarDetail {
    pub car: car::Model,
    pub company: company::Model,
}
