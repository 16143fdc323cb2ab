//! Bearer-token authentication for handlers and the admin route layer.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use service::access::require_admin;
use service::Principal;

use crate::errors::JsonApiError;
use crate::state::AppState;

/// The caller resolved from `Authorization: Bearer <jwt>`. Resolution runs
/// once per request; later extractions reuse the cached principal.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

fn bearer_token(headers: &HeaderMap) -> Result<&str, JsonApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| JsonApiError::unauthorized("missing bearer token"))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(JsonApiError::unauthorized("malformed authorization header")),
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(CurrentUser(principal.clone()));
        }
        let token = bearer_token(&parts.headers)?;
        let principal = state.services.auth.resolve_principal(token).await?;
        parts.extensions.insert(principal.clone());
        Ok(CurrentUser(principal))
    }
}

/// Route layer for `/admin/*`: authenticate, then demand admin rights.
pub async fn admin_only(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    let (mut parts, body) = req.into_parts();
    let CurrentUser(principal) = CurrentUser::from_request_parts(&mut parts, &state).await?;
    require_admin(&principal)?;
    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn parses_bearer_scheme_case_insensitively() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn rejects_other_schemes_and_blanks() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
        assert!(bearer_token(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(bearer_token(&headers("Bearer ")).is_err());
    }
}
