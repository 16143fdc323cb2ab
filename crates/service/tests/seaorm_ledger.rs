//! Runs the core against PostgreSQL. Skipped unless `DATABASE_URL` is set
//! and `SKIP_DB_TESTS` is not.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use jsonwebtoken::Algorithm;
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::Database;
use uuid::Uuid;

use service::access::View;
use service::auth::TokenManager;
use service::catalog::{CatalogRepository, NewCar};
use service::identity::{IdentityRepository, NewUser};
use service::ledger::{LedgerRepository, NewService, NewServiceItem};
use service::query::ServiceQuery;
use service::{Principal, SeaOrmStore, ServiceError, Services};

struct Db {
    store: Arc<SeaOrmStore>,
    services: Services,
}

async fn setup() -> Result<Option<Db>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return Ok(None);
    };
    let db = Database::connect(url).await?;
    migration::Migrator::up(&db, None).await?;
    let store = Arc::new(SeaOrmStore::new(db));
    let tokens = TokenManager::new(b"db-test-secret-0123456789", Algorithm::HS256, Duration::minutes(5));
    let services = Services::from_store(store.clone(), tokens);
    Ok(Some(Db { store, services }))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn mechanic(db: &Db, is_admin: bool) -> Result<Principal> {
    let u = db
        .store
        .insert_user(&NewUser { username: unique("mech"), password_hash: "x".into(), is_admin })
        .await?;
    Ok(Principal { user_id: u.id, username: u.username, is_admin })
}

async fn car(db: &Db) -> Result<i32> {
    let company = db.store.insert_company(&unique("co")).await?;
    Ok(db.store.insert_car(&NewCar { name: "Sedan".into(), company_id: company.id }).await?.id)
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 7, d).unwrap()
}

#[tokio::test]
async fn total_tracks_items_in_postgres() -> Result<()> {
    let Some(db) = setup().await? else { return Ok(()) };
    let me = mechanic(&db, false).await?;
    let car_id = car(&db).await?;
    let ledger = &db.services.ledger;

    let svc = ledger.create_service(&me, NewService { customer: "Eve".into(), date: date(1), car_id }).await?;
    assert_eq!(svc.total_price, Decimal::ZERO);

    let oil = ledger
        .create_item(&me, NewServiceItem { service_id: svc.id, title: "Oil change".into(), price: Decimal::from(40) })
        .await?;
    ledger
        .create_item(&me, NewServiceItem { service_id: svc.id, title: "Filter".into(), price: Decimal::from(15) })
        .await?;
    let out = ledger.delete_item(&me, oil.item.id).await?;
    assert_eq!(out.service.total_price, Decimal::from(15));

    ledger.delete_service(&me, svc.id).await?;
    assert!(db.store.list_items(svc.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn total_column_holds_sums_of_max_priced_items() -> Result<()> {
    let Some(db) = setup().await? else { return Ok(()) };
    let me = mechanic(&db, false).await?;
    let car_id = car(&db).await?;
    let ledger = &db.services.ledger;
    let svc = ledger.create_service(&me, NewService { customer: "Fleet".into(), date: date(4), car_id }).await?;

    let max = models::service_item::PRICE_LIMIT;
    for title in ["Engine", "Gearbox", "Body"] {
        ledger.create_item(&me, NewServiceItem { service_id: svc.id, title: title.into(), price: max }).await?;
    }
    let detail = ledger.get_service(&me, svc.id).await?;
    assert_eq!(detail.service.total_price, max * Decimal::from(3));

    ledger.delete_service(&me, svc.id).await?;
    Ok(())
}

#[tokio::test]
async fn concurrent_item_writes_serialize_per_service() -> Result<()> {
    let Some(db) = setup().await? else { return Ok(()) };
    let me = mechanic(&db, false).await?;
    let car_id = car(&db).await?;
    let svc = db
        .services
        .ledger
        .create_service(&me, NewService { customer: "Race".into(), date: date(2), car_id })
        .await?;

    let mut tasks = Vec::new();
    for n in 1..=10i64 {
        let ledger = db.services.ledger.clone();
        let who = me.clone();
        let service_id = svc.id;
        tasks.push(tokio::spawn(async move {
            ledger
                .create_item(&who, NewServiceItem { service_id, title: format!("part {n}"), price: Decimal::from(n) })
                .await
        }));
    }
    for t in tasks {
        t.await??;
    }

    let detail = db.services.ledger.get_service(&me, svc.id).await?;
    assert_eq!(detail.items.len(), 10);
    assert_eq!(detail.service.total_price, Decimal::from(55));
    db.services.ledger.delete_service(&me, svc.id).await?;
    Ok(())
}

#[tokio::test]
async fn schema_constraints_surface_as_conflict() -> Result<()> {
    let Some(db) = setup().await? else { return Ok(()) };
    let name = unique("dup");
    db.store.insert_company(&name).await?;
    assert!(matches!(db.store.insert_company(&name).await, Err(ServiceError::Conflict(_))));

    let me = mechanic(&db, false).await?;
    let car_id = car(&db).await?;
    let svc = db
        .services
        .ledger
        .create_service(&me, NewService { customer: "Ref".into(), date: date(3), car_id })
        .await?;
    assert!(matches!(db.store.delete_car(car_id).await, Err(ServiceError::Conflict(_))));
    db.services.ledger.delete_service(&me, svc.id).await?;
    db.store.delete_car(car_id).await?;
    Ok(())
}

#[tokio::test]
async fn listing_bounds_match_surface() -> Result<()> {
    let Some(db) = setup().await? else { return Ok(()) };
    let me = mechanic(&db, false).await?;
    let admin = mechanic(&db, true).await?;
    let car_id = car(&db).await?;
    for d in [10, 15, 20] {
        db.services
            .ledger
            .create_service(&me, NewService { customer: format!("day {d}"), date: date(d), car_id })
            .await?;
    }

    let range = || ServiceQuery { start_date: Some(date(10)), end_date: Some(date(20)), ..Default::default() };
    let own = db.services.ledger.list_services(&me, View::Own, range()).await?;
    assert_eq!(own.len(), 3);
    let scoped = ServiceQuery { mechanic: Some(me.user_id), ..range() };
    let admin_view = db.services.ledger.list_services(&admin, View::Admin, scoped).await?;
    assert_eq!(admin_view.iter().map(|s| s.date).collect::<Vec<_>>(), vec![date(15)]);

    for s in own {
        db.services.ledger.delete_service(&admin, s.id).await?;
    }
    Ok(())
}
