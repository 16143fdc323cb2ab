//! In-process store for tests and `memory://` deployments.
//!
//! All tables sit behind one `RwLock`, so every write (an item mutation
//! plus its total recomputation included) is atomic with respect to
//! every other operation. Constraint checks mirror the PostgreSQL schema.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use models::{car, company, service, service_item, user};

use crate::catalog::{CarChanges, CatalogRepository, NewCar};
use crate::errors::ServiceError;
use crate::identity::{IdentityRepository, NewUser, UserChanges};
use crate::ledger::{total_of, ItemMutation, ItemMutationOutcome, LedgerRepository, NewService, ServiceChanges};
use crate::query::{CarFilter, CompanyFilter, ServiceFilter, UserFilter};

#[derive(Default)]
struct Sequence(i32);

impl Sequence {
    fn next(&mut self) -> i32 {
        self.0 += 1;
        self.0
    }
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, user::Model>,
    companies: BTreeMap<i32, company::Model>,
    cars: BTreeMap<i32, car::Model>,
    services: BTreeMap<i32, service::Model>,
    items: BTreeMap<i32, service_item::Model>,
    user_seq: Sequence,
    company_seq: Sequence,
    car_seq: Sequence,
    service_seq: Sequence,
    item_seq: Sequence,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<i32>) -> bool {
        self.users.values().any(|u| u.username == username && Some(u.id) != except)
    }

    fn company_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.companies.values().any(|c| c.name == name && Some(c.id) != except)
    }

    fn car_name_taken(&self, company_id: i32, name: &str, except: Option<i32>) -> bool {
        self.cars
            .values()
            .any(|c| c.company_id == company_id && c.name == name && Some(c.id) != except)
    }

    fn car_referenced(&self, car_id: i32) -> bool {
        self.services.values().any(|s| s.car_id == car_id)
    }

    /// Re-read the full item set of a service and store the sum.
    fn recompute(&mut self, service_id: i32) -> Result<service::Model, ServiceError> {
        let total = total_of(self.items.values().filter(|i| i.service_id == service_id));
        let service = self.services.get_mut(&service_id).ok_or_else(|| ServiceError::not_found("service"))?;
        service.total_price = total;
        Ok(service.clone())
    }
}

fn fk_violation(what: &str) -> ServiceError {
    ServiceError::conflict(format!("{what} is still referenced"))
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<user::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.users.values().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn find_user(&self, id: i32) -> Result<Option<user::Model>, ServiceError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<user::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, input: &NewUser) -> Result<user::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if t.username_taken(&input.username, None) {
            return Err(ServiceError::conflict("username already taken"));
        }
        let id = t.user_seq.next();
        let model = user::Model {
            id,
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            is_admin: input.is_admin,
        };
        t.users.insert(id, model.clone());
        Ok(model)
    }

    async fn update_user(&self, id: i32, changes: &UserChanges) -> Result<user::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if t.username_taken(&changes.username, Some(id)) {
            return Err(ServiceError::conflict("username already taken"));
        }
        let u = t.users.get_mut(&id).ok_or_else(|| ServiceError::not_found("user"))?;
        u.username = changes.username.clone();
        u.is_admin = changes.is_admin;
        Ok(u.clone())
    }

    async fn delete_user(&self, id: i32) -> Result<(), ServiceError> {
        let mut t = self.tables.write().await;
        if t.services.values().any(|s| s.mechanic_id == id) {
            return Err(fk_violation("user"));
        }
        t.users.remove(&id).map(|_| ()).ok_or_else(|| ServiceError::not_found("user"))
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_companies(&self, filter: &CompanyFilter) -> Result<Vec<company::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.companies.values().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn find_company(&self, id: i32) -> Result<Option<company::Model>, ServiceError> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn find_company_by_name(&self, name: &str) -> Result<Option<company::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.companies.values().find(|c| c.name == name).cloned())
    }

    async fn insert_company(&self, name: &str) -> Result<company::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if t.company_name_taken(name, None) {
            return Err(ServiceError::conflict("company with this name exists"));
        }
        let id = t.company_seq.next();
        let model = company::Model { id, name: name.to_string() };
        t.companies.insert(id, model.clone());
        Ok(model)
    }

    async fn rename_company(&self, id: i32, name: &str) -> Result<company::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if t.company_name_taken(name, Some(id)) {
            return Err(ServiceError::conflict("company with this name exists"));
        }
        let c = t.companies.get_mut(&id).ok_or_else(|| ServiceError::not_found("company"))?;
        c.name = name.to_string();
        Ok(c.clone())
    }

    async fn delete_company(&self, id: i32) -> Result<(), ServiceError> {
        let mut t = self.tables.write().await;
        if !t.companies.contains_key(&id) {
            return Err(ServiceError::not_found("company"));
        }
        let car_ids: Vec<i32> = t.cars.values().filter(|c| c.company_id == id).map(|c| c.id).collect();
        if car_ids.iter().any(|car_id| t.car_referenced(*car_id)) {
            return Err(fk_violation("car"));
        }
        for car_id in car_ids {
            t.cars.remove(&car_id);
        }
        t.companies.remove(&id);
        Ok(())
    }

    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<car::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.cars.values().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn find_car(&self, id: i32) -> Result<Option<car::Model>, ServiceError> {
        Ok(self.tables.read().await.cars.get(&id).cloned())
    }

    async fn find_car_by_name(&self, company_id: i32, name: &str) -> Result<Option<car::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.cars.values().find(|c| c.company_id == company_id && c.name == name).cloned())
    }

    async fn insert_car(&self, input: &NewCar) -> Result<car::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if !t.companies.contains_key(&input.company_id) {
            return Err(ServiceError::not_found("company"));
        }
        if t.car_name_taken(input.company_id, &input.name, None) {
            return Err(ServiceError::conflict("company has car with same name"));
        }
        let id = t.car_seq.next();
        let model = car::Model { id, name: input.name.clone(), company_id: input.company_id };
        t.cars.insert(id, model.clone());
        Ok(model)
    }

    async fn update_car(&self, id: i32, changes: &CarChanges) -> Result<car::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if !t.companies.contains_key(&changes.company_id) {
            return Err(ServiceError::not_found("company"));
        }
        if t.car_name_taken(changes.company_id, &changes.name, Some(id)) {
            return Err(ServiceError::conflict("company has car with same name"));
        }
        let c = t.cars.get_mut(&id).ok_or_else(|| ServiceError::not_found("car"))?;
        c.name = changes.name.clone();
        c.company_id = changes.company_id;
        Ok(c.clone())
    }

    async fn delete_car(&self, id: i32) -> Result<(), ServiceError> {
        let mut t = self.tables.write().await;
        if t.car_referenced(id) {
            return Err(fk_violation("car"));
        }
        t.cars.remove(&id).map(|_| ()).ok_or_else(|| ServiceError::not_found("car"))
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn insert_service(&self, mechanic_id: i32, input: &NewService) -> Result<service::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if !t.cars.contains_key(&input.car_id) {
            return Err(ServiceError::not_found("car"));
        }
        if !t.users.contains_key(&mechanic_id) {
            return Err(ServiceError::not_found("user"));
        }
        let id = t.service_seq.next();
        let model = service::Model {
            id,
            mechanic_id,
            customer: input.customer.clone(),
            date: input.date,
            total_price: rust_decimal::Decimal::ZERO,
            car_id: input.car_id,
        };
        t.services.insert(id, model.clone());
        Ok(model)
    }

    async fn find_service(&self, id: i32) -> Result<Option<service::Model>, ServiceError> {
        Ok(self.tables.read().await.services.get(&id).cloned())
    }

    async fn update_service(&self, id: i32, changes: &ServiceChanges) -> Result<service::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if !t.cars.contains_key(&changes.car_id) {
            return Err(ServiceError::not_found("car"));
        }
        let s = t.services.get_mut(&id).ok_or_else(|| ServiceError::not_found("service"))?;
        s.customer = changes.customer.clone();
        s.date = changes.date;
        s.car_id = changes.car_id;
        Ok(s.clone())
    }

    async fn delete_service(&self, id: i32) -> Result<(), ServiceError> {
        let mut t = self.tables.write().await;
        t.services.remove(&id).ok_or_else(|| ServiceError::not_found("service"))?;
        t.items.retain(|_, item| item.service_id != id);
        Ok(())
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<service::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.services.values().filter(|s| filter.matches(s)).cloned().collect())
    }

    async fn count_services_for_cars(&self, car_ids: &[i32]) -> Result<u64, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.services.values().filter(|s| car_ids.contains(&s.car_id)).count() as u64)
    }

    async fn count_services_for_mechanic(&self, mechanic_id: i32) -> Result<u64, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.services.values().filter(|s| s.mechanic_id == mechanic_id).count() as u64)
    }

    async fn find_item(&self, id: i32) -> Result<Option<service_item::Model>, ServiceError> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn list_items(&self, service_id: i32) -> Result<Vec<service_item::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(t.items.values().filter(|i| i.service_id == service_id).cloned().collect())
    }

    async fn apply_item_mutation(&self, mutation: ItemMutation) -> Result<ItemMutationOutcome, ServiceError> {
        let mut t = self.tables.write().await;
        let item = match mutation {
            ItemMutation::Create(input) => {
                if !t.services.contains_key(&input.service_id) {
                    return Err(ServiceError::not_found("service"));
                }
                let id = t.item_seq.next();
                let model = service_item::Model { id, service_id: input.service_id, title: input.title, price: input.price };
                t.items.insert(id, model.clone());
                model
            }
            ItemMutation::Update { item_id, changes } => {
                let item = t.items.get_mut(&item_id).ok_or_else(|| ServiceError::not_found("item"))?;
                item.title = changes.title;
                item.price = changes.price;
                item.clone()
            }
            ItemMutation::Delete { item_id } => t.items.remove(&item_id).ok_or_else(|| ServiceError::not_found("item"))?,
        };
        let service = t.recompute(item.service_id)?;
        Ok(ItemMutationOutcome { item, service })
    }

    async fn recompute_total(&self, service_id: i32) -> Result<service::Model, ServiceError> {
        self.tables.write().await.recompute(service_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{NewServiceItem, ServiceItemChanges};
    use crate::query::{Scope, ServiceQuery};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    async fn seeded() -> (MemoryStore, i32, i32) {
        let store = MemoryStore::new();
        let mech = store
            .insert_user(&NewUser { username: "mech".into(), password_hash: "h".into(), is_admin: false })
            .await
            .unwrap();
        let acme = store.insert_company("Acme").await.unwrap();
        let car = store.insert_car(&NewCar { name: "Sedan".into(), company_id: acme.id }).await.unwrap();
        (store, mech.id, car.id)
    }

    fn new_service(car_id: i32) -> NewService {
        NewService { customer: "Eve".into(), date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), car_id }
    }

    #[tokio::test]
    async fn ids_are_sequential_per_table() {
        let store = MemoryStore::new();
        let a = store.insert_company("A").await.unwrap();
        let b = store.insert_company("B").await.unwrap();
        let car = store.insert_car(&NewCar { name: "X".into(), company_id: a.id }).await.unwrap();
        assert_eq!((a.id, b.id, car.id), (1, 2, 1));
    }

    #[tokio::test]
    async fn constraints_mirror_schema() {
        let (store, mech, car) = seeded().await;
        assert!(matches!(store.insert_company("Acme").await, Err(ServiceError::Conflict(_))));
        assert!(matches!(
            store.insert_user(&NewUser { username: "mech".into(), password_hash: "h".into(), is_admin: true }).await,
            Err(ServiceError::Conflict(_))
        ));

        store.insert_service(mech, &new_service(car)).await.unwrap();
        assert!(matches!(store.delete_car(car).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(store.delete_user(mech).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(store.insert_service(mech, &new_service(999)).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn item_mutations_rewrite_total() {
        let (store, mech, car) = seeded().await;
        let svc = store.insert_service(mech, &new_service(car)).await.unwrap();

        let out = store
            .apply_item_mutation(ItemMutation::Create(NewServiceItem {
                service_id: svc.id,
                title: "Oil".into(),
                price: Decimal::new(4050, 2),
            }))
            .await
            .unwrap();
        assert_eq!(out.service.total_price, Decimal::new(4050, 2));

        let out = store
            .apply_item_mutation(ItemMutation::Update {
                item_id: out.item.id,
                changes: ServiceItemChanges { title: "Oil".into(), price: Decimal::new(10, 0) },
            })
            .await
            .unwrap();
        assert_eq!(out.service.total_price, Decimal::new(10, 0));

        let out = store.apply_item_mutation(ItemMutation::Delete { item_id: out.item.id }).await.unwrap();
        assert_eq!(out.service.total_price, Decimal::ZERO);
        assert!(store.list_items(svc.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recompute_repairs_drifted_total() {
        let (store, mech, car) = seeded().await;
        let svc = store.insert_service(mech, &new_service(car)).await.unwrap();
        store
            .apply_item_mutation(ItemMutation::Create(NewServiceItem { service_id: svc.id, title: "A".into(), price: Decimal::from(7) }))
            .await
            .unwrap();
        store.tables.write().await.services.get_mut(&svc.id).unwrap().total_price = Decimal::from(1000);

        assert_eq!(store.recompute_total(svc.id).await.unwrap().total_price, Decimal::from(7));
    }

    #[tokio::test]
    async fn listing_applies_filter_in_id_order() {
        let (store, mech, car) = seeded().await;
        for _ in 0..3 {
            store.insert_service(mech, &new_service(car)).await.unwrap();
        }
        let all = store.list_services(&ServiceFilter::new(Scope::All, ServiceQuery::default())).await.unwrap();
        assert_eq!(all.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        let none = store.list_services(&ServiceFilter::new(Scope::Mechanic(mech + 1), ServiceQuery::default())).await.unwrap();
        assert!(none.is_empty());
    }
}
