//! Self-service routes: a mechanic's own services and items, plus catalog
//! browsing. Ownership is enforced by the core.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use service::access::View;

use crate::dto::{
    ItemCreateRequest, ItemMutationView, ItemUpdateRequest, ServiceDetailView, ServiceListParams, ServiceRequest,
    ServiceView,
};
use crate::errors::JsonApiError;
use crate::extract::CurrentUser;
use crate::metrics::record_item_mutation;
use crate::state::AppState;

#[utoipa::path(get, path = "/service", tag = "service", params(ServiceListParams), security(("bearer" = [])),
    responses((status = 200, description = "OK", body = [ServiceView])))]
pub async fn list_own(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Query(params): Query<ServiceListParams>,
) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    let list = state.services.ledger.list_services(&me, View::Own, params.into()).await?;
    Ok(Json(list.into_iter().map(ServiceView::from).collect()))
}

#[utoipa::path(post, path = "/service", tag = "service", request_body = ServiceRequest, security(("bearer" = [])),
    responses((status = 201, description = "Created", body = ServiceView), (status = 404, description = "Car not found")))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Json(input): Json<ServiceRequest>,
) -> Result<(StatusCode, Json<ServiceView>), JsonApiError> {
    let created = state.services.ledger.create_service(&me, input.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(get, path = "/service/{id}", tag = "service", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ServiceDetailView), (status = 404, description = "Not found or not owned")))]
pub async fn get_one(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ServiceDetailView>, JsonApiError> {
    Ok(Json(state.services.ledger.get_service(&me, id).await?.into()))
}

#[utoipa::path(put, path = "/service/{id}", tag = "service", request_body = ServiceRequest, security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ServiceView), (status = 404, description = "Not found or not owned")))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<ServiceRequest>,
) -> Result<Json<ServiceView>, JsonApiError> {
    let updated = state.services.ledger.update_service(&me, id, input.into_changes()?).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(delete, path = "/service/{id}", tag = "service", security(("bearer" = [])),
    responses((status = 204, description = "No Content"), (status = 404, description = "Not found or not owned")))]
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    state.services.ledger.delete_service(&me, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/service/item", tag = "service", request_body = ItemCreateRequest, security(("bearer" = [])),
    responses((status = 201, description = "Created", body = ItemMutationView), (status = 404, description = "Service not found or not owned")))]
pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Json(input): Json<ItemCreateRequest>,
) -> Result<(StatusCode, Json<ItemMutationView>), JsonApiError> {
    let outcome = state.services.ledger.create_item(&me, input.into_new()?).await?;
    record_item_mutation("create");
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

#[utoipa::path(put, path = "/service/item/{id}", tag = "service", request_body = ItemUpdateRequest, security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ItemMutationView), (status = 404, description = "Item not found or not owned")))]
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<ItemUpdateRequest>,
) -> Result<Json<ItemMutationView>, JsonApiError> {
    let outcome = state.services.ledger.update_item(&me, id, input.into_changes()?).await?;
    record_item_mutation("update");
    Ok(Json(outcome.into()))
}

#[utoipa::path(delete, path = "/service/item/{id}", tag = "service", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ItemMutationView), (status = 404, description = "Item not found or not owned")))]
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ItemMutationView>, JsonApiError> {
    let outcome = state.services.ledger.delete_item(&me, id).await?;
    record_item_mutation("delete");
    Ok(Json(outcome.into()))
}
