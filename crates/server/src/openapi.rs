use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::dto::*;
use crate::routes::{admin, auth, catalog, services};

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme("bearer", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        auth::signup,
        auth::login,
        auth::me,
        services::list_own,
        services::create,
        services::get_one,
        services::update,
        services::delete,
        services::create_item,
        services::update_item,
        services::delete_item,
        catalog::list_companies,
        catalog::get_company,
        catalog::list_cars,
        catalog::get_car,
        catalog::create_company,
        catalog::rename_company,
        catalog::delete_company,
        catalog::create_car,
        catalog::update_car,
        catalog::delete_car,
        admin::list_users,
        admin::create_user,
        admin::get_user,
        admin::update_user,
        admin::delete_user,
        admin::list_services,
        admin::get_service,
        admin::update_service,
        admin::delete_service,
        admin::recompute_total,
        admin::update_item,
        admin::delete_item,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            CredentialsRequest,
            CreateUserRequest,
            UpdateUserRequest,
            CompanyRequest,
            CarRequest,
            ServiceRequest,
            ItemCreateRequest,
            ItemUpdateRequest,
            UserView,
            TokenResponse,
            CompanyView,
            CarView,
            CompanyDetailView,
            CarDetailView,
            ServiceView,
            ItemView,
            ServiceDetailView,
            ItemMutationView,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "user"),
        (name = "service"),
        (name = "catalog"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
