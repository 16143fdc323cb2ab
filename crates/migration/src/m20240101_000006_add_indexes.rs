use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Car: lookups by company (cascade + company detail)
        manager
            .create_index(
                Index::create()
                    .name("idx_car_company")
                    .table(Car::Table)
                    .col(Car::CompanyId)
                    .to_owned(),
            )
            .await?;

        // Service: owner-scoped listings and date-range filters
        manager
            .create_index(
                Index::create()
                    .name("idx_service_mechanic_date")
                    .table(Service::Table)
                    .col(Service::MechanicId)
                    .col(Service::Date)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_car")
                    .table(Service::Table)
                    .col(Service::CarId)
                    .to_owned(),
            )
            .await?;

        // ServiceItem: total recomputation reads every item of one service
        manager
            .create_index(
                Index::create()
                    .name("idx_service_item_service")
                    .table(ServiceItem::Table)
                    .col(ServiceItem::ServiceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_service_item_service").table(ServiceItem::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_service_car").table(Service::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_service_mechanic_date").table(Service::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_car_company").table(Car::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Car { Table, CompanyId }

#[derive(DeriveIden)]
enum Service { Table, MechanicId, Date, CarId }

#[derive(DeriveIden)]
enum ServiceItem { Table, ServiceId }
