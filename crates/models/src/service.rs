use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::{car, service_item, user};

/// A unit of billable work. `total_price` is derived from the items and
/// is only ever written by the ledger's recomputation step.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub mechanic_id: i32,
    pub customer: String,
    pub date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub total_price: Decimal,
    pub car_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Mechanic, Car, Item }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Mechanic => Entity::belongs_to(user::Entity)
                .from(Column::MechanicId)
                .to(user::Column::Id)
                .into(),
            Relation::Car => Entity::belongs_to(car::Entity)
                .from(Column::CarId)
                .to(car::Column::Id)
                .into(),
            Relation::Item => Entity::has_many(service_item::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Mechanic.def() }
}

impl Related<car::Entity> for Entity {
    fn to() -> RelationDef { Relation::Car.def() }
}

impl Related<service_item::Entity> for Entity {
    fn to() -> RelationDef { Relation::Item.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_customer(customer: &str) -> Result<(), ModelError> {
    errors::require_text("customer", customer, 255)
}
