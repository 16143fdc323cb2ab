//! Authorization predicates.
//!
//! Ownership of a service item is always decided through its parent
//! service: items carry no mechanic of their own. Callers that fail the
//! ownership check get the same `NotFound` a missing record would produce,
//! so a mechanic cannot probe which ids belong to someone else.

use tracing::warn;

use models::service;

use crate::errors::ServiceError;
use crate::query::Scope;

/// The authenticated caller, resolved from a bearer token before any core
/// operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
    pub is_admin: bool,
}

impl Principal {
    pub fn owns(&self, service: &service::Model) -> bool {
        service.mechanic_id == self.user_id
    }
}

/// Which listing surface a request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Admin,
    Own,
}

pub fn require_admin(principal: &Principal) -> Result<(), ServiceError> {
    if principal.is_admin {
        return Ok(());
    }
    warn!(user_id = principal.user_id, "admin_required");
    Err(ServiceError::Forbidden("administrator rights required".into()))
}

pub fn require_owner_or_admin(principal: &Principal, service: &service::Model) -> Result<(), ServiceError> {
    if principal.is_admin || principal.owns(service) {
        return Ok(());
    }
    warn!(user_id = principal.user_id, service_id = service.id, "foreign_service_access");
    Err(ServiceError::not_found("service"))
}

/// Resolve the listing scope for a surface: the admin view needs admin
/// rights, the self-service view is pinned to the caller.
pub fn scope_for(principal: &Principal, view: View) -> Result<Scope, ServiceError> {
    match view {
        View::Admin => {
            require_admin(principal)?;
            Ok(Scope::All)
        }
        View::Own => Ok(Scope::Mechanic(principal.user_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn principal(id: i32, is_admin: bool) -> Principal {
        Principal { user_id: id, username: format!("user{id}"), is_admin }
    }

    fn owned_by(mechanic_id: i32) -> service::Model {
        service::Model {
            id: 7,
            mechanic_id,
            customer: "Dana".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            total_price: Decimal::ZERO,
            car_id: 1,
        }
    }

    #[test]
    fn admin_gate() {
        assert!(require_admin(&principal(1, true)).is_ok());
        assert!(matches!(require_admin(&principal(2, false)), Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn owner_gate_hides_foreign_records() {
        let s = owned_by(2);
        assert!(require_owner_or_admin(&principal(2, false), &s).is_ok());
        assert!(require_owner_or_admin(&principal(9, true), &s).is_ok());
        assert!(matches!(require_owner_or_admin(&principal(1, false), &s), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn scope_resolution() {
        assert_eq!(scope_for(&principal(4, false), View::Own).unwrap(), Scope::Mechanic(4));
        assert_eq!(scope_for(&principal(4, true), View::Own).unwrap(), Scope::Mechanic(4));
        assert_eq!(scope_for(&principal(4, true), View::Admin).unwrap(), Scope::All);
        assert!(scope_for(&principal(4, false), View::Admin).is_err());
    }
}
