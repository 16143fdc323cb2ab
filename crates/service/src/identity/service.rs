use std::sync::Arc;

use tracing::{info, instrument};

use models::user;

use super::repository::IdentityRepository;
use super::{NewUser, UserChanges};
use crate::access::{require_admin, Principal};
use crate::errors::ServiceError;
use crate::ledger::LedgerRepository;
use crate::query::UserFilter;

pub struct IdentityService {
    users: Arc<dyn IdentityRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn IdentityRepository>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { users, ledger }
    }

    /// Store a user without a calling principal. Used by signup and by
    /// administrator bootstrap.
    #[instrument(skip(self, input), fields(username = %input.username, is_admin = input.is_admin))]
    pub async fn register(&self, input: &NewUser) -> Result<user::Model, ServiceError> {
        if self.users.find_user_by_username(&input.username).await?.is_some() {
            return Err(ServiceError::conflict("username already taken"));
        }
        let created = self.users.insert_user(input).await?;
        info!(user_id = created.id, "user_registered");
        Ok(created)
    }

    pub async fn find(&self, id: i32) -> Result<Option<user::Model>, ServiceError> {
        self.users.find_user(id).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, ServiceError> {
        self.users.find_user_by_username(username).await
    }

    pub async fn list_users(&self, principal: &Principal, filter: &UserFilter) -> Result<Vec<user::Model>, ServiceError> {
        require_admin(principal)?;
        self.users.list_users(filter).await
    }

    pub async fn get_user(&self, principal: &Principal, id: i32) -> Result<user::Model, ServiceError> {
        require_admin(principal)?;
        self.users.find_user(id).await?.ok_or_else(|| ServiceError::not_found("user"))
    }

    pub async fn create_user(&self, principal: &Principal, input: &NewUser) -> Result<user::Model, ServiceError> {
        require_admin(principal)?;
        self.register(input).await
    }

    #[instrument(skip(self, principal, changes), fields(user_id = principal.user_id))]
    pub async fn update_user(&self, principal: &Principal, id: i32, changes: &UserChanges) -> Result<user::Model, ServiceError> {
        require_admin(principal)?;
        self.users.find_user(id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        if let Some(existing) = self.users.find_user_by_username(&changes.username).await? {
            if existing.id != id {
                return Err(ServiceError::conflict("username already taken"));
            }
        }
        let updated = self.users.update_user(id, changes).await?;
        info!(target_id = id, is_admin = updated.is_admin, "user_updated");
        Ok(updated)
    }

    /// Delete a user that owns no services.
    #[instrument(skip(self, principal), fields(user_id = principal.user_id))]
    pub async fn delete_user(&self, principal: &Principal, id: i32) -> Result<user::Model, ServiceError> {
        require_admin(principal)?;
        let target = self.users.find_user(id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        let owned = self.ledger.count_services_for_mechanic(id).await?;
        if owned > 0 {
            return Err(ServiceError::conflict(format!("user owns {owned} services")));
        }
        self.users.delete_user(id).await?;
        info!(target_id = id, "user_deleted");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NewService;
    use crate::test_support::{day, Fixture};

    fn new_user(name: &str, is_admin: bool) -> NewUser {
        NewUser { username: name.into(), password_hash: "hash".into(), is_admin }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_regardless_of_admin_flag() -> Result<(), ServiceError> {
        let fx = Fixture::new().await;
        let identity = &fx.services.identity;
        identity.create_user(&fx.admin, &new_user("carol", false)).await?;

        let dup = identity.create_user(&fx.admin, &new_user("carol", true)).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        let dup = identity.register(&new_user("carol", false)).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn administration_requires_admin() {
        let fx = Fixture::new().await;
        let res = fx.services.identity.list_users(&fx.alice, &UserFilter::default()).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));
        let res = fx.services.identity.delete_user(&fx.alice, fx.bob.user_id).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn update_keeps_own_username_and_rejects_taken_one() -> Result<(), ServiceError> {
        let fx = Fixture::new().await;
        let identity = &fx.services.identity;

        let promoted = identity
            .update_user(&fx.admin, fx.alice.user_id, &UserChanges { username: fx.alice.username.clone(), is_admin: true })
            .await?;
        assert!(promoted.is_admin);

        let clash = identity
            .update_user(&fx.admin, fx.alice.user_id, &UserChanges { username: fx.bob.username.clone(), is_admin: false })
            .await;
        assert!(matches!(clash, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn user_owning_services_cannot_be_deleted() -> Result<(), ServiceError> {
        let fx = Fixture::new().await;
        let car = fx.car("Acme", "Sedan").await;
        fx.services
            .ledger
            .create_service(&fx.alice, NewService { customer: "Eve".into(), date: day(2024, 1, 1), car_id: car.id })
            .await?;

        let res = fx.services.identity.delete_user(&fx.admin, fx.alice.user_id).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));

        let removed = fx.services.identity.delete_user(&fx.admin, fx.bob.user_id).await?;
        assert_eq!(removed.id, fx.bob.user_id);
        assert!(fx.services.identity.find(fx.bob.user_id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_compose() -> Result<(), ServiceError> {
        let fx = Fixture::new().await;
        let identity = &fx.services.identity;
        identity.create_user(&fx.admin, &new_user("mech-dave", false)).await?;
        identity.create_user(&fx.admin, &new_user("mech-erin", true)).await?;

        let mechs = identity
            .list_users(&fx.admin, &UserFilter { username: Some("mech-".into()), is_admin: Some(false) })
            .await?;
        let names: Vec<&str> = mechs.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["mech-dave"]);

        let none = identity.list_users(&fx.admin, &UserFilter { username: Some("MECH".into()), is_admin: None }).await?;
        assert!(none.is_empty());
        Ok(())
    }
}
