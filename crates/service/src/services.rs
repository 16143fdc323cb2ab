//! Wiring of the core services over one storage backend.

use std::sync::Arc;

use crate::auth::{AuthService, TokenManager};
use crate::catalog::{CatalogRepository, CatalogService};
use crate::identity::{IdentityRepository, IdentityService};
use crate::ledger::{LedgerRepository, LedgerService};

#[derive(Clone)]
pub struct Services {
    pub identity: Arc<IdentityService>,
    pub catalog: Arc<CatalogService>,
    pub ledger: Arc<LedgerService>,
    pub auth: Arc<AuthService>,
}

impl Services {
    /// Build every service over a store implementing all three repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{domain::Credentials, TokenManager};
    /// use service::{repo::MemoryStore, Services};
    ///
    /// let tokens = TokenManager::new(b"doc-secret-0123456789", jsonwebtoken::Algorithm::HS256, chrono::Duration::minutes(5));
    /// let services = Services::from_store(Arc::new(MemoryStore::new()), tokens);
    /// let creds = Credentials { username: "mech".into(), password: "Passw0rd!".into() };
    /// tokio_test::block_on(services.auth.signup(&creds)).unwrap();
    /// let session = tokio_test::block_on(services.auth.login(&creds)).unwrap();
    /// let me = tokio_test::block_on(services.auth.resolve_principal(&session.token)).unwrap();
    /// assert_eq!(me.username, "mech");
    /// assert!(!me.is_admin);
    /// ```
    pub fn from_store<S>(store: Arc<S>, tokens: TokenManager) -> Self
    where
        S: CatalogRepository + IdentityRepository + LedgerRepository + 'static,
    {
        let users: Arc<dyn IdentityRepository> = store.clone();
        let cars: Arc<dyn CatalogRepository> = store.clone();
        let ledger: Arc<dyn LedgerRepository> = store;

        let identity = Arc::new(IdentityService::new(users, ledger.clone()));
        Self {
            catalog: Arc::new(CatalogService::new(cars.clone(), ledger.clone())),
            ledger: Arc::new(LedgerService::new(ledger, cars)),
            auth: Arc::new(AuthService::new(identity.clone(), tokens)),
            identity,
        }
    }
}
