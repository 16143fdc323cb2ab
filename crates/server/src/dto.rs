//! Wire schemas. Requests validate through the `models` field rules before
//! reaching the core; responses never carry credential hashes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use models::errors::ModelError;
use models::{car, company, service as service_model, service_item, user};
use service::auth::domain::{AuthSession, Credentials};
use service::catalog::{CarChanges, CarDetail, CompanyDetail, NewCar};
use service::identity::UserChanges;
use service::ledger::{
    ItemMutationOutcome, NewService, NewServiceItem, ServiceChanges, ServiceDetail, ServiceItemChanges,
};
use service::query::{CarFilter, CompanyFilter, ServiceQuery, UserFilter};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl From<CredentialsRequest> for Credentials {
    fn from(r: CredentialsRequest) -> Self {
        Credentials { username: r.username, password: r.password }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: String,
    pub is_admin: bool,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> Result<UserChanges, ModelError> {
        user::validate_username(&self.username)?;
        Ok(UserChanges { username: self.username, is_admin: self.is_admin })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompanyRequest {
    pub name: String,
}

impl CompanyRequest {
    pub fn into_name(self) -> Result<String, ModelError> {
        company::validate_name(&self.name)?;
        Ok(self.name.trim().to_string())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CarRequest {
    pub name: String,
    pub company_id: i32,
}

impl CarRequest {
    pub fn into_new(self) -> Result<NewCar, ModelError> {
        car::validate_name(&self.name)?;
        Ok(NewCar { name: self.name.trim().to_string(), company_id: self.company_id })
    }

    pub fn into_changes(self) -> Result<CarChanges, ModelError> {
        let NewCar { name, company_id } = self.into_new()?;
        Ok(CarChanges { name, company_id })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ServiceRequest {
    pub customer: String,
    pub date: NaiveDate,
    pub car_id: i32,
}

impl ServiceRequest {
    pub fn into_new(self) -> Result<NewService, ModelError> {
        service_model::validate_customer(&self.customer)?;
        Ok(NewService { customer: self.customer.trim().to_string(), date: self.date, car_id: self.car_id })
    }

    pub fn into_changes(self) -> Result<ServiceChanges, ModelError> {
        let NewService { customer, date, car_id } = self.into_new()?;
        Ok(ServiceChanges { customer, date, car_id })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemCreateRequest {
    pub service_id: i32,
    pub title: String,
    pub price: Decimal,
}

impl ItemCreateRequest {
    pub fn into_new(self) -> Result<NewServiceItem, ModelError> {
        service_item::validate_title(&self.title)?;
        service_item::validate_price(self.price)?;
        Ok(NewServiceItem { service_id: self.service_id, title: self.title.trim().to_string(), price: self.price })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemUpdateRequest {
    pub title: String,
    pub price: Decimal,
}

impl ItemUpdateRequest {
    pub fn into_changes(self) -> Result<ServiceItemChanges, ModelError> {
        service_item::validate_title(&self.title)?;
        service_item::validate_price(self.price)?;
        Ok(ServiceItemChanges { title: self.title.trim().to_string(), price: self.price })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    /// Case-sensitive substring of the username.
    pub username: Option<String>,
    pub is_admin: Option<bool>,
}

impl From<UserListParams> for UserFilter {
    fn from(p: UserListParams) -> Self {
        UserFilter { username: p.username, is_admin: p.is_admin }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompanyListParams {
    /// Case-insensitive substring of the company name.
    pub name: Option<String>,
}

impl From<CompanyListParams> for CompanyFilter {
    fn from(p: CompanyListParams) -> Self {
        CompanyFilter { name: p.name }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarListParams {
    /// Case-insensitive substring of the car name.
    pub name: Option<String>,
    pub company_id: Option<i32>,
}

impl From<CarListParams> for CarFilter {
    fn from(p: CarListParams) -> Self {
        CarFilter { name: p.name, company_id: p.company_id }
    }
}

/// Service listing filters. On `/admin/service` the date bounds are
/// exclusive; on `/service` they are inclusive.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ServiceListParams {
    /// Case-insensitive substring of the customer name.
    pub customer: Option<String>,
    /// Owning mechanic id.
    pub mechanic: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<ServiceListParams> for ServiceQuery {
    fn from(p: ServiceListParams) -> Self {
        ServiceQuery { customer: p.customer, mechanic: p.mechanic, start_date: p.start_date, end_date: p.end_date }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

impl From<user::Model> for UserView {
    fn from(u: user::Model) -> Self {
        UserView { id: u.id, username: u.username, is_admin: u.is_admin }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub user: UserView,
}

impl From<AuthSession> for TokenResponse {
    fn from(s: AuthSession) -> Self {
        TokenResponse {
            access_token: s.token,
            token_type: "bearer".into(),
            expires_in: s.expires_in,
            user: s.user.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyView {
    pub id: i32,
    pub name: String,
}

impl From<company::Model> for CompanyView {
    fn from(c: company::Model) -> Self {
        CompanyView { id: c.id, name: c.name }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CarView {
    pub id: i32,
    pub name: String,
    pub company_id: i32,
}

impl From<car::Model> for CarView {
    fn from(c: car::Model) -> Self {
        CarView { id: c.id, name: c.name, company_id: c.company_id }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyDetailView {
    pub id: i32,
    pub name: String,
    pub cars: Vec<CarView>,
}

impl From<CompanyDetail> for CompanyDetailView {
    fn from(d: CompanyDetail) -> Self {
        CompanyDetailView {
            id: d.company.id,
            name: d.company.name,
            cars: d.cars.into_iter().map(CarView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CarDetailView {
    pub id: i32,
    pub name: String,
    pub company: CompanyView,
}

impl From<CarDetail> for CarDetailView {
    fn from(d: CarDetail) -> Self {
        CarDetailView { id: d.car.id, name: d.car.name, company: d.company.into() }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceView {
    pub id: i32,
    pub mechanic_id: i32,
    pub customer: String,
    pub date: NaiveDate,
    pub total_price: Decimal,
    pub car_id: i32,
}

impl From<service_model::Model> for ServiceView {
    fn from(s: service_model::Model) -> Self {
        ServiceView {
            id: s.id,
            mechanic_id: s.mechanic_id,
            customer: s.customer,
            date: s.date,
            total_price: s.total_price,
            car_id: s.car_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemView {
    pub id: i32,
    pub service_id: i32,
    pub title: String,
    pub price: Decimal,
}

impl From<service_item::Model> for ItemView {
    fn from(i: service_item::Model) -> Self {
        ItemView { id: i.id, service_id: i.service_id, title: i.title, price: i.price }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceDetailView {
    #[serde(flatten)]
    pub service: ServiceView,
    pub items: Vec<ItemView>,
}

impl From<ServiceDetail> for ServiceDetailView {
    fn from(d: ServiceDetail) -> Self {
        ServiceDetailView { service: d.service.into(), items: d.items.into_iter().map(ItemView::from).collect() }
    }
}

/// An item write together with its parent's recomputed total.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemMutationView {
    pub item: ItemView,
    pub service: ServiceView,
}

impl From<ItemMutationOutcome> for ItemMutationView {
    fn from(o: ItemMutationOutcome) -> Self {
        ItemMutationView { item: o.item.into(), service: o.service.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_fractional_cent_prices_are_rejected() {
        let req = |price| ItemCreateRequest { service_id: 1, title: "Oil".into(), price };
        assert!(req(Decimal::new(-1, 0)).into_new().is_err());
        assert!(req(Decimal::new(1001, 3)).into_new().is_err());
        assert!(req(Decimal::new(1000, 3)).into_new().is_ok());
        assert!(req(Decimal::ZERO).into_new().is_ok());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(CompanyRequest { name: "  ".into() }.into_name().is_err());
        assert!(CarRequest { name: String::new(), company_id: 1 }.into_new().is_err());
        let svc = ServiceRequest { customer: " ".into(), date: NaiveDate::MIN, car_id: 1 };
        assert!(svc.into_new().is_err());
    }

    #[test]
    fn user_view_has_no_hash() {
        let view = UserView::from(user::Model { id: 1, username: "a".into(), password_hash: "secret".into(), is_admin: false });
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn service_detail_nests_items_beside_service_fields() {
        let detail = ServiceDetail {
            service: service_model::Model {
                id: 1,
                mechanic_id: 2,
                customer: "Eve".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                total_price: Decimal::new(4000, 2),
                car_id: 3,
            },
            items: vec![service_item::Model { id: 9, service_id: 1, title: "Oil".into(), price: Decimal::new(4000, 2) }],
        };
        let json = serde_json::to_value(ServiceDetailView::from(detail)).unwrap();
        assert_eq!(json["customer"], "Eve");
        assert_eq!(json["total_price"], "40.00");
        assert_eq!(json["items"][0]["id"], 9);
    }
}
