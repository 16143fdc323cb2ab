use axum::middleware;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::extract::admin_only;
use crate::metrics;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod services;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public, authenticated and admin routes.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics::encode_metrics))
        .route("/user/signup", post(auth::signup))
        .route("/user/login", post(auth::login));

    // Handlers authenticate through the CurrentUser extractor
    let user = Router::new()
        .route("/user/me", get(auth::me))
        .route("/service", get(services::list_own).post(services::create))
        .route("/service/:id", get(services::get_one).put(services::update).delete(services::delete))
        .route("/service/item", post(services::create_item))
        .route("/service/item/:id", put(services::update_item).delete(services::delete_item))
        .route("/service/company", get(catalog::list_companies))
        .route("/service/company/:id", get(catalog::get_company))
        .route("/service/car", get(catalog::list_cars))
        .route("/service/car/:id", get(catalog::get_car));

    let admin_routes = Router::new()
        .route("/admin/user", get(admin::list_users).post(admin::create_user))
        .route("/admin/user/:id", get(admin::get_user).put(admin::update_user).delete(admin::delete_user))
        .route("/admin/company", get(catalog::list_companies).post(catalog::create_company))
        .route(
            "/admin/company/:id",
            get(catalog::get_company).put(catalog::rename_company).delete(catalog::delete_company),
        )
        .route("/admin/car", get(catalog::list_cars).post(catalog::create_car))
        .route("/admin/car/:id", get(catalog::get_car).put(catalog::update_car).delete(catalog::delete_car))
        .route("/admin/service", get(admin::list_services))
        .route(
            "/admin/service/:id",
            get(admin::get_service).put(admin::update_service).delete(admin::delete_service),
        )
        .route("/admin/service/:id/recompute", post(admin::recompute_total))
        .route("/admin/item/:id", put(admin::update_item).delete(admin::delete_item))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_only));

    public
        .merge(user)
        .merge(admin_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(middleware::from_fn(metrics::track))
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx is logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
