use std::sync::Arc;

use tracing::{info, instrument, warn};

use models::user;

use super::domain::{AuthSession, Credentials};
use super::errors::AuthError;
use super::password::{hash_password, verify_password};
use super::token::TokenManager;
use crate::access::Principal;
use crate::identity::{IdentityService, NewUser};

/// Auth business service independent of web framework
pub struct AuthService {
    identity: Arc<IdentityService>,
    tokens: TokenManager,
}

impl AuthService {
    pub fn new(identity: Arc<IdentityService>, tokens: TokenManager) -> Self {
        Self { identity, tokens }
    }

    fn prepare(credentials: &Credentials, is_admin: bool) -> Result<NewUser, AuthError> {
        user::validate_username(&credentials.username)?;
        user::validate_password(&credentials.password)?;
        Ok(NewUser {
            username: credentials.username.trim().to_string(),
            password_hash: hash_password(&credentials.password)?,
            is_admin,
        })
    }

    /// Register a mechanic account.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn signup(&self, credentials: &Credentials) -> Result<user::Model, AuthError> {
        let input = Self::prepare(credentials, false)?;
        Ok(self.identity.register(&input).await?)
    }

    /// Create an administrator without an existing principal. Used by the
    /// `create-admin` binary on an empty installation.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn bootstrap_admin(&self, credentials: &Credentials) -> Result<user::Model, AuthError> {
        let input = Self::prepare(credentials, true)?;
        let created = self.identity.register(&input).await?;
        info!(user_id = created.id, "admin_bootstrapped");
        Ok(created)
    }

    /// Admin-initiated account creation with a chosen role.
    pub async fn create_user(
        &self,
        principal: &Principal,
        credentials: &Credentials,
        is_admin: bool,
    ) -> Result<user::Model, AuthError> {
        crate::access::require_admin(principal)?;
        let input = Self::prepare(credentials, is_admin)?;
        Ok(self.identity.create_user(principal, &input).await?)
    }

    /// Unknown usernames and wrong passwords are indistinguishable.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let user = self
            .identity
            .find_by_username(credentials.username.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !verify_password(&credentials.password, &user.password_hash)? {
            warn!(user_id = user.id, "login_rejected");
            return Err(AuthError::Unauthorized);
        }
        let token = self.tokens.issue(&user)?;
        info!(user_id = user.id, "login_succeeded");
        Ok(AuthSession { user, token, expires_in: self.tokens.ttl_secs() })
    }

    /// Resolve a bearer token to the caller. The admin flag comes from the
    /// store, not the token, so demotions apply immediately.
    pub async fn resolve_principal(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.tokens.verify(token)?;
        let user = self.identity.find(claims.uid).await?.ok_or(AuthError::Unauthorized)?;
        Ok(Principal { user_id: user.id, username: user.username, is_admin: user.is_admin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserChanges;
    use crate::test_support::Fixture;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials { username: username.into(), password: password.into() }
    }

    #[tokio::test]
    async fn signup_login_resolve() -> Result<(), AuthError> {
        let fx = Fixture::new().await;
        let auth = &fx.services.auth;

        let user = auth.signup(&creds("mech1", "s3cret-pass")).await?;
        assert!(!user.is_admin);
        assert_ne!(user.password_hash, "s3cret-pass");

        let session = auth.login(&creds("mech1", "s3cret-pass")).await?;
        assert_eq!(session.user.id, user.id);
        let principal = auth.resolve_principal(&session.token).await?;
        assert_eq!(principal, Principal { user_id: user.id, username: "mech1".into(), is_admin: false });
        Ok(())
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() -> Result<(), AuthError> {
        let fx = Fixture::new().await;
        let auth = &fx.services.auth;
        auth.signup(&creds("mech1", "s3cret-pass")).await?;

        assert!(matches!(auth.login(&creds("mech1", "wrong-pass")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(auth.login(&creds("nobody", "s3cret-pass")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(auth.resolve_principal("not.a.token").await, Err(AuthError::Unauthorized)));
        Ok(())
    }

    #[tokio::test]
    async fn signup_rejects_duplicates_and_short_passwords() -> Result<(), AuthError> {
        let fx = Fixture::new().await;
        let auth = &fx.services.auth;
        auth.signup(&creds("mech1", "s3cret-pass")).await?;

        assert!(matches!(auth.signup(&creds("mech1", "other-pass")).await, Err(AuthError::Conflict)));
        assert!(matches!(auth.signup(&creds("mech2", "short")).await, Err(AuthError::Validation(_))));
        assert!(matches!(auth.signup(&creds("  ", "long-enough")).await, Err(AuthError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn deleted_user_token_stops_resolving() -> Result<(), AuthError> {
        let fx = Fixture::new().await;
        let auth = &fx.services.auth;
        let user = auth.signup(&creds("mech1", "s3cret-pass")).await?;
        let session = auth.login(&creds("mech1", "s3cret-pass")).await?;

        fx.services.identity.delete_user(&fx.admin, user.id).await?;
        assert!(matches!(auth.resolve_principal(&session.token).await, Err(AuthError::Unauthorized)));
        Ok(())
    }

    #[tokio::test]
    async fn role_changes_apply_to_live_tokens() -> Result<(), AuthError> {
        let fx = Fixture::new().await;
        let auth = &fx.services.auth;
        let user = auth.signup(&creds("mech1", "s3cret-pass")).await?;
        let session = auth.login(&creds("mech1", "s3cret-pass")).await?;

        fx.services
            .identity
            .update_user(&fx.admin, user.id, &UserChanges { username: "mech1".into(), is_admin: true })
            .await?;
        assert!(auth.resolve_principal(&session.token).await?.is_admin);
        Ok(())
    }

    #[tokio::test]
    async fn bootstrap_and_admin_creation() -> Result<(), AuthError> {
        let fx = Fixture::new().await;
        let auth = &fx.services.auth;
        let root = auth.bootstrap_admin(&creds("root", "root-password")).await?;
        assert!(root.is_admin);

        let denied = auth.create_user(&fx.alice, &creds("mech9", "password9"), true).await;
        assert!(matches!(denied, Err(AuthError::Service(crate::ServiceError::Forbidden(_)))));
        let made = auth.create_user(&fx.admin, &creds("mech9", "password9"), true).await?;
        assert!(made.is_admin);
        Ok(())
    }
}
