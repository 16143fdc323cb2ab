use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{CredentialsRequest, TokenResponse, UserView};
use crate::errors::JsonApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

#[utoipa::path(post, path = "/user/signup", tag = "user", request_body = CredentialsRequest,
    responses((status = 201, description = "Created", body = UserView), (status = 409, description = "Username taken"), (status = 422, description = "Invalid input")))]
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserView>), JsonApiError> {
    let user = state.services.auth.signup(&input.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(post, path = "/user/login", tag = "user", request_body = CredentialsRequest,
    responses((status = 200, description = "OK", body = TokenResponse), (status = 401, description = "Invalid credentials")))]
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, JsonApiError> {
    let session = state.services.auth.login(&input.into()).await?;
    Ok(Json(session.into()))
}

#[utoipa::path(get, path = "/user/me", tag = "user", security(("bearer" = [])),
    responses((status = 200, description = "OK", body = UserView), (status = 401, description = "Missing or invalid token")))]
pub async fn me(CurrentUser(principal): CurrentUser) -> Json<UserView> {
    Json(UserView { id: principal.user_id, username: principal.username, is_admin: principal.is_admin })
}
