//! PostgreSQL store. Uniqueness and referential rules are enforced by the
//! schema; violations come back as `DbErr` and map to `Conflict`.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use models::{car, company, service, service_item, user, Decimal};

use crate::catalog::{CarChanges, CatalogRepository, NewCar};
use crate::errors::ServiceError;
use crate::identity::{IdentityRepository, NewUser, UserChanges};
use crate::ledger::{total_of, ItemMutation, ItemMutationOutcome, LedgerRepository, NewService, ServiceChanges};
use crate::query::{like_pattern, Bound, CarFilter, CompanyFilter, ServiceFilter, UserFilter};

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `LIKE` with the exact (case-sensitive) needle.
fn contains<C: ColumnTrait>(col: C, needle: &str) -> SimpleExpr {
    Expr::col(col).like(LikeExpr::new(like_pattern(needle)).escape('\\'))
}

/// `lower(col) LIKE lower(needle)`.
fn contains_ignore_case<C: ColumnTrait>(col: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(like_pattern(&needle.to_lowercase())).escape('\\'))
}

fn user_condition(filter: &UserFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(needle) = &filter.username {
        cond = cond.add(contains(user::Column::Username, needle));
    }
    if let Some(flag) = filter.is_admin {
        cond = cond.add(user::Column::IsAdmin.eq(flag));
    }
    cond
}

fn car_condition(filter: &CarFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(needle) = &filter.name {
        cond = cond.add(contains_ignore_case(car::Column::Name, needle));
    }
    if let Some(company_id) = filter.company_id {
        cond = cond.add(car::Column::CompanyId.eq(company_id));
    }
    cond
}

fn service_condition(filter: &ServiceFilter) -> Condition {
    let mut cond = Condition::all();
    for mechanic_id in filter.mechanic_constraints() {
        cond = cond.add(service::Column::MechanicId.eq(mechanic_id));
    }
    if let Some(needle) = &filter.query.customer {
        cond = cond.add(contains_ignore_case(service::Column::Customer, needle));
    }
    let range = filter.date_range();
    if let Some(start) = range.start {
        cond = cond.add(match range.bound {
            Bound::Inclusive => service::Column::Date.gte(start),
            Bound::Exclusive => service::Column::Date.gt(start),
        });
    }
    if let Some(end) = range.end {
        cond = cond.add(match range.bound {
            Bound::Inclusive => service::Column::Date.lte(end),
            Bound::Exclusive => service::Column::Date.lt(end),
        });
    }
    cond
}

/// Sum every item of the service as seen by `conn` and store it.
async fn write_total<C: ConnectionTrait>(conn: &C, parent: service::Model) -> Result<service::Model, ServiceError> {
    let items = service_item::Entity::find()
        .filter(service_item::Column::ServiceId.eq(parent.id))
        .all(conn)
        .await?;
    let mut am: service::ActiveModel = parent.into();
    am.total_price = Set(total_of(&items));
    Ok(am.update(conn).await?)
}

/// `SELECT ... FOR UPDATE` on the parent row; serializes item writes per
/// service for the rest of the transaction.
async fn lock_service<C: ConnectionTrait>(conn: &C, id: i32) -> Result<service::Model, ServiceError> {
    service::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))
}

#[async_trait]
impl IdentityRepository for SeaOrmStore {
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user_condition(filter))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_user(&self, id: i32) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find().filter(user::Column::Username.eq(username)).one(&self.db).await?)
    }

    async fn insert_user(&self, input: &NewUser) -> Result<user::Model, ServiceError> {
        let am = user::ActiveModel {
            username: Set(input.username.clone()),
            password_hash: Set(input.password_hash.clone()),
            is_admin: Set(input.is_admin),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn update_user(&self, id: i32, changes: &UserChanges) -> Result<user::Model, ServiceError> {
        let existing = self.find_user(id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        let mut am: user::ActiveModel = existing.into();
        am.username = Set(changes.username.clone());
        am.is_admin = Set(changes.is_admin);
        Ok(am.update(&self.db).await?)
    }

    async fn delete_user(&self, id: i32) -> Result<(), ServiceError> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("user"));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmStore {
    async fn list_companies(&self, filter: &CompanyFilter) -> Result<Vec<company::Model>, ServiceError> {
        let mut query = company::Entity::find();
        if let Some(needle) = &filter.name {
            query = query.filter(contains_ignore_case(company::Column::Name, needle));
        }
        Ok(query.order_by_asc(company::Column::Id).all(&self.db).await?)
    }

    async fn find_company(&self, id: i32) -> Result<Option<company::Model>, ServiceError> {
        Ok(company::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_company_by_name(&self, name: &str) -> Result<Option<company::Model>, ServiceError> {
        Ok(company::Entity::find().filter(company::Column::Name.eq(name)).one(&self.db).await?)
    }

    async fn insert_company(&self, name: &str) -> Result<company::Model, ServiceError> {
        let am = company::ActiveModel { name: Set(name.to_string()), ..Default::default() };
        Ok(am.insert(&self.db).await?)
    }

    async fn rename_company(&self, id: i32, name: &str) -> Result<company::Model, ServiceError> {
        let existing = self.find_company(id).await?.ok_or_else(|| ServiceError::not_found("company"))?;
        let mut am: company::ActiveModel = existing.into();
        am.name = Set(name.to_string());
        Ok(am.update(&self.db).await?)
    }

    async fn delete_company(&self, id: i32) -> Result<(), ServiceError> {
        // cars go with it (ON DELETE CASCADE); referenced cars abort the delete
        let res = company::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("company"));
        }
        Ok(())
    }

    async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<car::Model>, ServiceError> {
        Ok(car::Entity::find()
            .filter(car_condition(filter))
            .order_by_asc(car::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_car(&self, id: i32) -> Result<Option<car::Model>, ServiceError> {
        Ok(car::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_car_by_name(&self, company_id: i32, name: &str) -> Result<Option<car::Model>, ServiceError> {
        Ok(car::Entity::find()
            .filter(car::Column::CompanyId.eq(company_id))
            .filter(car::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    async fn insert_car(&self, input: &NewCar) -> Result<car::Model, ServiceError> {
        let am = car::ActiveModel {
            name: Set(input.name.clone()),
            company_id: Set(input.company_id),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn update_car(&self, id: i32, changes: &CarChanges) -> Result<car::Model, ServiceError> {
        let existing = self.find_car(id).await?.ok_or_else(|| ServiceError::not_found("car"))?;
        let mut am: car::ActiveModel = existing.into();
        am.name = Set(changes.name.clone());
        am.company_id = Set(changes.company_id);
        Ok(am.update(&self.db).await?)
    }

    async fn delete_car(&self, id: i32) -> Result<(), ServiceError> {
        let res = car::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("car"));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for SeaOrmStore {
    async fn insert_service(&self, mechanic_id: i32, input: &NewService) -> Result<service::Model, ServiceError> {
        let am = service::ActiveModel {
            mechanic_id: Set(mechanic_id),
            customer: Set(input.customer.clone()),
            date: Set(input.date),
            total_price: Set(Decimal::ZERO),
            car_id: Set(input.car_id),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn find_service(&self, id: i32) -> Result<Option<service::Model>, ServiceError> {
        Ok(service::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn update_service(&self, id: i32, changes: &ServiceChanges) -> Result<service::Model, ServiceError> {
        let existing = self.find_service(id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
        let mut am: service::ActiveModel = existing.into();
        am.customer = Set(changes.customer.clone());
        am.date = Set(changes.date);
        am.car_id = Set(changes.car_id);
        Ok(am.update(&self.db).await?)
    }

    async fn delete_service(&self, id: i32) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        lock_service(&txn, id).await?;
        service_item::Entity::delete_many()
            .filter(service_item::Column::ServiceId.eq(id))
            .exec(&txn)
            .await?;
        service::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<service::Model>, ServiceError> {
        Ok(service::Entity::find()
            .filter(service_condition(filter))
            .order_by_asc(service::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn count_services_for_cars(&self, car_ids: &[i32]) -> Result<u64, ServiceError> {
        if car_ids.is_empty() {
            return Ok(0);
        }
        Ok(service::Entity::find()
            .filter(service::Column::CarId.is_in(car_ids.iter().copied()))
            .count(&self.db)
            .await?)
    }

    async fn count_services_for_mechanic(&self, mechanic_id: i32) -> Result<u64, ServiceError> {
        Ok(service::Entity::find()
            .filter(service::Column::MechanicId.eq(mechanic_id))
            .count(&self.db)
            .await?)
    }

    async fn find_item(&self, id: i32) -> Result<Option<service_item::Model>, ServiceError> {
        Ok(service_item::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_items(&self, service_id: i32) -> Result<Vec<service_item::Model>, ServiceError> {
        Ok(service_item::Entity::find()
            .filter(service_item::Column::ServiceId.eq(service_id))
            .order_by_asc(service_item::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn apply_item_mutation(&self, mutation: ItemMutation) -> Result<ItemMutationOutcome, ServiceError> {
        let txn = self.db.begin().await?;
        let item = match mutation {
            ItemMutation::Create(input) => {
                lock_service(&txn, input.service_id).await?;
                let am = service_item::ActiveModel {
                    service_id: Set(input.service_id),
                    title: Set(input.title),
                    price: Set(input.price),
                    ..Default::default()
                };
                am.insert(&txn).await?
            }
            ItemMutation::Update { item_id, changes } => {
                let current = find_item_in(&txn, item_id).await?;
                lock_service(&txn, current.service_id).await?;
                let mut am: service_item::ActiveModel = current.into();
                am.title = Set(changes.title);
                am.price = Set(changes.price);
                am.update(&txn).await?
            }
            ItemMutation::Delete { item_id } => {
                let current = find_item_in(&txn, item_id).await?;
                lock_service(&txn, current.service_id).await?;
                let res = service_item::Entity::delete_by_id(item_id).exec(&txn).await?;
                if res.rows_affected == 0 {
                    return Err(ServiceError::not_found("item"));
                }
                current
            }
        };
        // already locked by this transaction; re-read for the current row
        let parent = lock_service(&txn, item.service_id).await?;
        let service = write_total(&txn, parent).await?;
        txn.commit().await?;
        Ok(ItemMutationOutcome { item, service })
    }

    async fn recompute_total(&self, service_id: i32) -> Result<service::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let parent = lock_service(&txn, service_id).await?;
        let service = write_total(&txn, parent).await?;
        txn.commit().await?;
        Ok(service)
    }
}

async fn find_item_in<C: ConnectionTrait>(conn: &C, id: i32) -> Result<service_item::Model, ServiceError> {
    service_item::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("item"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Scope, ServiceQuery};
    use chrono::NaiveDate;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(filter: &ServiceFilter) -> String {
        service::Entity::find().filter(service_condition(filter)).build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn admin_scope_uses_strict_date_bounds() {
        let filter = ServiceFilter::new(
            Scope::All,
            ServiceQuery {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                end_date: NaiveDate::from_ymd_opt(2024, 2, 1),
                ..Default::default()
            },
        );
        let q = sql(&filter);
        assert!(q.contains(r#""date" > '2024-01-01'"#), "{q}");
        assert!(q.contains(r#""date" < '2024-02-01'"#), "{q}");
    }

    #[test]
    fn mechanic_scope_is_inclusive_and_pinned() {
        let filter = ServiceFilter::new(
            Scope::Mechanic(3),
            ServiceQuery { start_date: NaiveDate::from_ymd_opt(2024, 1, 1), mechanic: Some(4), ..Default::default() },
        );
        let q = sql(&filter);
        assert!(q.contains(r#""date" >= '2024-01-01'"#), "{q}");
        assert!(q.contains(r#""mechanic_id" = 3"#), "{q}");
        assert!(q.contains(r#""mechanic_id" = 4"#), "{q}");
    }

    #[test]
    fn customer_filter_lowercases_both_sides() {
        let filter = ServiceFilter::new(Scope::All, ServiceQuery { customer: Some("Bo_b".into()), ..Default::default() });
        let q = sql(&filter);
        assert!(q.contains("LOWER("), "{q}");
        assert!(q.contains(r"'%bo\\_b%'") || q.contains(r"'%bo\_b%'"), "{q}");
    }

    #[test]
    fn username_filter_keeps_case() {
        let q = user::Entity::find()
            .filter(user_condition(&UserFilter { username: Some("Al".into()), is_admin: Some(true) }))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(q.contains("'%Al%'"), "{q}");
        assert!(!q.contains("LOWER("), "{q}");
        assert!(q.contains(r#""is_admin" = TRUE"#), "{q}");
    }
}
