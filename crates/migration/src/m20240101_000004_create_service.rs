//! Create `service` table with FKs to `users` (mechanic) and `car`.
//!
//! Both references are RESTRICT: a car or mechanic still referenced by a
//! service cannot be removed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(pk_auto(Service::Id))
                    .col(integer(Service::MechanicId).not_null())
                    .col(string_len(Service::Customer, 255).not_null())
                    .col(date(Service::Date).not_null())
                    .col(decimal_len(Service::TotalPrice, 20, 2).default(0).not_null())
                    .col(integer(Service::CarId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_mechanic")
                            .from(Service::Table, Service::MechanicId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_car")
                            .from(Service::Table, Service::CarId)
                            .to(Car::Table, Car::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service { Table, Id, MechanicId, Customer, Date, TotalPrice, CarId }

#[derive(DeriveIden)]
enum Users { Table, Id }

#[derive(DeriveIden)]
enum Car { Table, Id }
