use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use models::{service, service_item};

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub customer: String,
    pub date: NaiveDate,
    pub car_id: i32,
}

/// Replacement values for the mutable service fields. The total and the
/// mechanic are not among them.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceChanges {
    pub customer: String,
    pub date: NaiveDate,
    pub car_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceItem {
    pub service_id: i32,
    pub title: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceItemChanges {
    pub title: String,
    pub price: Decimal,
}

/// One line-item write. Each variant is followed by a recomputation of
/// the parent service's total inside the same unit of work.
#[derive(Debug, Clone)]
pub enum ItemMutation {
    Create(NewServiceItem),
    Update { item_id: i32, changes: ServiceItemChanges },
    Delete { item_id: i32 },
}

impl ItemMutation {
    pub fn kind(&self) -> &'static str {
        match self {
            ItemMutation::Create(_) => "create",
            ItemMutation::Update { .. } => "update",
            ItemMutation::Delete { .. } => "delete",
        }
    }
}

/// The item as written (or as it was before removal) and its parent with
/// the recomputed total.
#[derive(Debug, Clone)]
pub struct ItemMutationOutcome {
    pub item: service_item::Model,
    pub service: service::Model,
}

#[derive(Debug, Clone)]
pub struct ServiceDetail {
    pub service: service::Model,
    pub items: Vec<service_item::Model>,
}

/// Sum of item prices; zero for a service without items.
pub fn total_of<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a service_item::Model>,
{
    items.into_iter().fold(Decimal::ZERO, |acc, item| acc + item.price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, price: Decimal) -> service_item::Model {
        service_item::Model { id, service_id: 1, title: format!("item {id}"), price }
    }

    #[test]
    fn total_of_empty_is_zero() {
        assert_eq!(total_of(&Vec::<service_item::Model>::new()), Decimal::ZERO);
    }

    #[test]
    fn total_of_keeps_cents_exact() {
        let items = vec![item(1, Decimal::new(1999, 2)), item(2, Decimal::new(1, 2)), item(3, Decimal::new(40, 0))];
        assert_eq!(total_of(&items), Decimal::new(6000, 2));
    }
}
