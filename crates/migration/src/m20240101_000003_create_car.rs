//! Create `car` table with FK to `company`.
//!
//! A company cannot list two cars under the same name; removing a
//! company removes its cars.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Car::Table)
                    .if_not_exists()
                    .col(pk_auto(Car::Id))
                    .col(string_len(Car::Name, 128).not_null())
                    .col(integer(Car::CompanyId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_car_company")
                            .from(Car::Table, Car::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_car_name_company")
                    .table(Car::Table)
                    .col(Car::Name)
                    .col(Car::CompanyId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Car::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Car { Table, Id, Name, CompanyId }

#[derive(DeriveIden)]
enum Company { Table, Id }
