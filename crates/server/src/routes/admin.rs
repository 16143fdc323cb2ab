//! Administrative surface. Every route here sits behind
//! [`crate::extract::admin_only`]; the core re-checks the role anyway.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use service::access::View;
use service::auth::domain::Credentials;

use crate::dto::{
    CreateUserRequest, ItemMutationView, ItemUpdateRequest, ServiceDetailView, ServiceListParams, ServiceRequest,
    ServiceView, UpdateUserRequest, UserListParams, UserView,
};
use crate::errors::JsonApiError;
use crate::extract::CurrentUser;
use crate::metrics::record_item_mutation;
use crate::state::AppState;

#[utoipa::path(get, path = "/admin/user", tag = "admin", params(UserListParams), security(("bearer" = [])),
    responses((status = 200, description = "OK", body = [UserView]), (status = 403, description = "Forbidden")))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Query(params): Query<UserListParams>,
) -> Result<Json<Vec<UserView>>, JsonApiError> {
    let users = state.services.identity.list_users(&me, &params.into()).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

#[utoipa::path(post, path = "/admin/user", tag = "admin", request_body = CreateUserRequest, security(("bearer" = [])),
    responses((status = 201, description = "Created", body = UserView), (status = 409, description = "Username taken")))]
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Json(input): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), JsonApiError> {
    let credentials = Credentials { username: input.username, password: input.password };
    let created = state.services.auth.create_user(&me, &credentials, input.is_admin).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(get, path = "/admin/user/{id}", tag = "admin", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = UserView), (status = 404, description = "Not Found")))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<UserView>, JsonApiError> {
    Ok(Json(state.services.identity.get_user(&me, id).await?.into()))
}

#[utoipa::path(put, path = "/admin/user/{id}", tag = "admin", request_body = UpdateUserRequest, security(("bearer" = [])),
    responses((status = 200, description = "OK", body = UserView), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, JsonApiError> {
    let updated = state.services.identity.update_user(&me, id, &input.into_changes()?).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(delete, path = "/admin/user/{id}", tag = "admin", security(("bearer" = [])),
    responses((status = 204, description = "No Content"), (status = 404, description = "Not Found"), (status = 409, description = "User still owns services")))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    state.services.identity.delete_user(&me, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Date bounds on this listing are exclusive.
#[utoipa::path(get, path = "/admin/service", tag = "admin", params(ServiceListParams), security(("bearer" = [])),
    responses((status = 200, description = "OK", body = [ServiceView])))]
pub async fn list_services(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Query(params): Query<ServiceListParams>,
) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    let list = state.services.ledger.list_services(&me, View::Admin, params.into()).await?;
    Ok(Json(list.into_iter().map(ServiceView::from).collect()))
}

#[utoipa::path(get, path = "/admin/service/{id}", tag = "admin", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ServiceDetailView), (status = 404, description = "Not Found")))]
pub async fn get_service(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ServiceDetailView>, JsonApiError> {
    Ok(Json(state.services.ledger.get_service(&me, id).await?.into()))
}

#[utoipa::path(put, path = "/admin/service/{id}", tag = "admin", request_body = ServiceRequest, security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ServiceView), (status = 404, description = "Not Found")))]
pub async fn update_service(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<ServiceRequest>,
) -> Result<Json<ServiceView>, JsonApiError> {
    let updated = state.services.ledger.update_service(&me, id, input.into_changes()?).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(delete, path = "/admin/service/{id}", tag = "admin", security(("bearer" = [])),
    responses((status = 204, description = "No Content"), (status = 404, description = "Not Found")))]
pub async fn delete_service(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    state.services.ledger.delete_service(&me, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/admin/service/{id}/recompute", tag = "admin", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ServiceView), (status = 404, description = "Not Found")))]
pub async fn recompute_total(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(state.services.ledger.reconcile_total(&me, id).await?.into()))
}

#[utoipa::path(put, path = "/admin/item/{id}", tag = "admin", request_body = ItemUpdateRequest, security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ItemMutationView), (status = 404, description = "Not Found")))]
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

#[utoipa::path(delete, path = "/admin/item/{id}", tag = "admin", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = ItemMutationView), (status = 404, description = "Not Found")))]
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ItemMutationView>, JsonApiError> {
    let outcome = state.services.ledger.delete_item(&me, id).await?;
    record_item_mutation("delete");
    Ok(Json(outcome.into()))
}
