//! Drives the router end to end over the in-memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use configs::AuthConfig;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::build_router;
use server::state::AppState;
use service::auth::domain::Credentials;
use service::auth::TokenManager;
use service::{MemoryStore, Services};

struct TestApp {
    router: Router,
    services: Services,
}

impl TestApp {
    async fn new() -> Self {
        let cfg = AuthConfig {
            jwt_secret: "api-flow-secret-0123456789".into(),
            algorithm: "HS256".into(),
            token_ttl_minutes: 5,
        };
        let tokens = TokenManager::from_config(&cfg).unwrap();
        let services = Services::from_store(Arc::new(MemoryStore::new()), tokens);
        let router = build_router(AppState::new(services.clone()));
        Self { router, services }
    }

    async fn admin_token(&self) -> String {
        let creds = Credentials { username: "root".into(), password: "root-password".into() };
        self.services.auth.bootstrap_admin(&creds).await.unwrap();
        self.login("root", "root-password").await
    }

    async fn mechanic_token(&self, name: &str) -> String {
        let (status, _) = self
            .send(Method::POST, "/user/signup", None, Some(json!({ "username": name, "password": "mech-password" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(name, "mech-password").await
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .send(Method::POST, "/user/login", None, Some(json!({ "username": username, "password": password })))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }
}

fn money(v: &Value) -> Decimal {
    v.as_str().unwrap().parse().unwrap()
}

/// Admin sets up one company with one car; returns the car id.
async fn seed_car(app: &TestApp, admin: &str) -> i64 {
    let (status, company) = app.send(Method::POST, "/admin/company", Some(admin), Some(json!({ "name": "Toyota" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, car) = app
        .send(Method::POST, "/admin/car", Some(admin), Some(json!({ "name": "Corolla", "company_id": company["id"] })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    car["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/service", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    let (status, _) = app.send(Method::GET, "/user/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mechanics_are_kept_out_of_admin_routes() {
    let app = TestApp::new().await;
    let token = app.mechanic_token("mech1").await;
    let (status, body) = app.send(Method::GET, "/admin/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn item_writes_keep_total_in_step() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let car_id = seed_car(&app, &admin).await;
    let mech = app.mechanic_token("mech1").await;

    let (status, svc) = app
        .send(
            Method::POST,
            "/service",
            Some(&mech),
            Some(json!({ "customer": "Eve", "date": "2024-03-01", "car_id": car_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&svc["total_price"]), Decimal::new(0, 0));
    let service_id = svc["id"].clone();

    let (status, oil) = app
        .send(
            Method::POST,
            "/service/item",
            Some(&mech),
            Some(json!({ "service_id": service_id, "title": "Oil", "price": "40.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&oil["service"]["total_price"]), Decimal::new(4000, 2));

    let (_, filter) = app
        .send(
            Method::POST,
            "/service/item",
            Some(&mech),
            Some(json!({ "service_id": service_id, "title": "Filter", "price": "15.00" })),
        )
        .await;
    assert_eq!(money(&filter["service"]["total_price"]), Decimal::new(5500, 2));

    let oil_id = oil["item"]["id"].as_i64().unwrap();
    let (status, out) = app
        .send(Method::PUT, &format!("/service/item/{oil_id}"), Some(&mech), Some(json!({ "title": "Oil", "price": "45.50" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&out["service"]["total_price"]), Decimal::new(6050, 2));

    let (status, out) = app.send(Method::DELETE, &format!("/service/item/{oil_id}"), Some(&mech), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&out["service"]["total_price"]), Decimal::new(1500, 2));

    let (status, detail) = app.send(Method::GET, &format!("/service/{service_id}"), Some(&mech), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&detail["total_price"]), Decimal::new(1500, 2));
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn other_mechanics_services_look_missing() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let car_id = seed_car(&app, &admin).await;
    let alice = app.mechanic_token("alice").await;
    let bob = app.mechanic_token("bob").await;

    let (_, svc) = app
        .send(
            Method::POST,
            "/service",
            Some(&alice),
            Some(json!({ "customer": "Eve", "date": "2024-03-01", "car_id": car_id })),
        )
        .await;
    let uri = format!("/service/{}", svc["id"]);

    let (status, _) = app.send(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listed) = app.send(Method::GET, "/service", Some(&bob), None).await;
    assert_eq!(listed, json!([]));

    let (status, _) = app.send(Method::GET, &format!("/admin/service/{}", svc["id"]), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_input_is_unprocessable() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let car_id = seed_car(&app, &admin).await;
    let mech = app.mechanic_token("mech1").await;

    let (status, body) = app
        .send(Method::POST, "/service", Some(&mech), Some(json!({ "customer": "  ", "date": "2024-03-01", "car_id": car_id })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");

    let (_, svc) = app
        .send(Method::POST, "/service", Some(&mech), Some(json!({ "customer": "Eve", "date": "2024-03-01", "car_id": car_id })))
        .await;
    let (status, _) = app
        .send(
            Method::POST,
            "/service/item",
            Some(&mech),
            Some(json!({ "service_id": svc["id"], "title": "Oil", "price": "-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn catalog_conflicts_surface_as_409() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let car_id = seed_car(&app, &admin).await;
    let mech = app.mechanic_token("mech1").await;

    let (status, _) = app.send(Method::POST, "/admin/company", Some(&admin), Some(json!({ "name": "Toyota" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.send(Method::POST, "/service", Some(&mech), Some(json!({ "customer": "Eve", "date": "2024-03-01", "car_id": car_id })))
        .await;
    let (status, body) = app.send(Method::DELETE, &format!("/admin/car/{car_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn admin_listing_uses_exclusive_bounds() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let car_id = seed_car(&app, &admin).await;
    let mech = app.mechanic_token("mech1").await;
    for date in ["2024-01-10", "2024-01-15", "2024-01-20"] {
        app.send(Method::POST, "/service", Some(&mech), Some(json!({ "customer": "Eve", "date": date, "car_id": car_id })))
            .await;
    }

    let query = "start_date=2024-01-10&end_date=2024-01-20";
    let (_, admin_view) = app.send(Method::GET, &format!("/admin/service?{query}"), Some(&admin), None).await;
    assert_eq!(admin_view.as_array().unwrap().len(), 1);
    let (_, own_view) = app.send(Method::GET, &format!("/service?{query}"), Some(&mech), None).await;
    assert_eq!(own_view.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn me_reports_the_caller() {
    let app = TestApp::new().await;
    let token = app.mechanic_token("mech1").await;
    let (status, body) = app.send(Method::GET, "/user/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "mech1");
    assert_eq!(body["is_admin"], false);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/service/item/{id}").is_some());
}
