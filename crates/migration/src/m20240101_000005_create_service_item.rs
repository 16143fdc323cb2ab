//! Create `service_item` table with FK to `service` (cascade).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceItem::Table)
                    .if_not_exists()
                    .col(pk_auto(ServiceItem::Id))
                    .col(integer(ServiceItem::ServiceId).not_null())
                    .col(string_len(ServiceItem::Title, 255).not_null())
                    .col(decimal_len(ServiceItem::Price, 12, 2).not_null())
                    .check(Expr::col(ServiceItem::Price).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_item_service")
                            .from(ServiceItem::Table, ServiceItem::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceItem { Table, Id, ServiceId, Title, Price }

#[derive(DeriveIden)]
enum Service { Table, Id }
