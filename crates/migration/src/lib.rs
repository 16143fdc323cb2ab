//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_company;
mod m20240101_000003_create_car;
mod m20240101_000004_create_service;
mod m20240101_000005_create_service_item;
mod m20240101_000006_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_company::Migration),
            Box::new(m20240101_000003_create_car::Migration),
            Box::new(m20240101_000004_create_service::Migration),
            Box::new(m20240101_000005_create_service_item::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000006_add_indexes::Migration),
        ]
    }
}
