use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::service;

/// Largest value a `DECIMAL(12, 2)` column holds.
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Service }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    errors::require_text("title", title, 255)
}

/// Prices are non-negative with at most two fractional digits.
pub fn validate_price(price: Decimal) -> Result<(), ModelError> {
    if price < Decimal::ZERO {
        return Err(ModelError::Validation("price must be >= 0".into()));
    }
    if price.normalize().scale() > 2 {
        return Err(ModelError::Validation("price has more than 2 decimal places".into()));
    }
    if price > PRICE_LIMIT {
        return Err(ModelError::Validation(format!("price must be <= {PRICE_LIMIT}")));
    }
    Ok(())
}
