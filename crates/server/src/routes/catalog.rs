//! Company and car catalog. Browsing needs any authenticated user; writes
//! are mounted under `/admin` behind the admin layer.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{
    CarDetailView, CarListParams, CarRequest, CarView, CompanyDetailView, CompanyListParams, CompanyRequest,
    CompanyView,
};
use crate::errors::JsonApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

#[utoipa::path(get, path = "/service/company", tag = "catalog", params(CompanyListParams), security(("bearer" = [])),
    responses((status = 200, description = "OK", body = [CompanyView])))]
pub async fn list_companies(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<CompanyListParams>,
) -> Result<Json<Vec<CompanyView>>, JsonApiError> {
    let list = state.services.catalog.list_companies(&params.into()).await?;
    Ok(Json(list.into_iter().map(CompanyView::from).collect()))
}

#[utoipa::path(get, path = "/service/company/{id}", tag = "catalog", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = CompanyDetailView), (status = 404, description = "Company not found")))]
pub async fn get_company(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<CompanyDetailView>, JsonApiError> {
    Ok(Json(state.services.catalog.get_company(id).await?.into()))
}

#[utoipa::path(get, path = "/service/car", tag = "catalog", params(CarListParams), security(("bearer" = [])),
    responses((status = 200, description = "OK", body = [CarView])))]
pub async fn list_cars(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<CarListParams>,
) -> Result<Json<Vec<CarView>>, JsonApiError> {
    let list = state.services.catalog.list_cars(&params.into()).await?;
    Ok(Json(list.into_iter().map(CarView::from).collect()))
}

#[utoipa::path(get, path = "/service/car/{id}", tag = "catalog", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = CarDetailView), (status = 404, description = "Car not found")))]
pub async fn get_car(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<CarDetailView>, JsonApiError> {
    Ok(Json(state.services.catalog.get_car(id).await?.into()))
}

#[utoipa::path(post, path = "/admin/company", tag = "admin", request_body = CompanyRequest, security(("bearer" = [])),
    responses((status = 201, description = "Created", body = CompanyView), (status = 409, description = "Name taken")))]
pub async fn create_company(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Json(input): Json<CompanyRequest>,
) -> Result<(StatusCode, Json<CompanyView>), JsonApiError> {
    let created = state.services.catalog.create_company(&me, &input.into_name()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(put, path = "/admin/company/{id}", tag = "admin", request_body = CompanyRequest, security(("bearer" = [])),
    responses((status = 200, description = "OK", body = CompanyView), (status = 404, description = "Not Found"), (status = 409, description = "Name taken")))]
pub async fn rename_company(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<CompanyRequest>,
) -> Result<Json<CompanyView>, JsonApiError> {
    let renamed = state.services.catalog.rename_company(&me, id, &input.into_name()?).await?;
    Ok(Json(renamed.into()))
}

#[utoipa::path(delete, path = "/admin/company/{id}", tag = "admin", security(("bearer" = [])),
    responses((status = 204, description = "No Content"), (status = 404, description = "Not Found"), (status = 409, description = "A car of this company is still serviced")))]
pub async fn delete_company(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    state.services.catalog.delete_company(&me, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/admin/car", tag = "admin", request_body = CarRequest, security(("bearer" = [])),
    responses((status = 201, description = "Created", body = CarView), (status = 404, description = "Company not found"), (status = 409, description = "Conflict")))]
pub async fn create_car(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Json(input): Json<CarRequest>,
) -> Result<(StatusCode, Json<CarView>), JsonApiError> {
    let created = state.services.catalog.create_car(&me, &input.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(put, path = "/admin/car/{id}", tag = "admin", request_body = CarRequest, security(("bearer" = [])),
    responses((status = 200, description = "OK", body = CarView), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update_car(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<CarRequest>,
) -> Result<Json<CarView>, JsonApiError> {
    let updated = state.services.catalog.update_car(&me, id, &input.into_changes()?).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(delete, path = "/admin/car/{id}", tag = "admin", security(("bearer" = [])),
    responses((status = 204, description = "No Content"), (status = 404, description = "Not Found"), (status = 409, description = "Car is referenced by a service")))]
pub async fn delete_car(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    state.services.catalog.delete_car(&me, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
