use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use jsonwebtoken::Algorithm;

use models::car;

use crate::access::Principal;
use crate::auth::TokenManager;
use crate::catalog::{CatalogRepository, NewCar};
use crate::identity::{IdentityRepository, NewUser};
use crate::repo::MemoryStore;
use crate::services::Services;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn test_tokens() -> TokenManager {
    TokenManager::new(b"test-secret-0123456789", Algorithm::HS256, Duration::minutes(30))
}

/// Memory-backed services with one admin and two mechanics.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub services: Services,
    pub admin: Principal,
    pub alice: Principal,
    pub bob: Principal,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let services = Services::from_store(store.clone(), test_tokens());
        let admin = Self::principal(&store, "admin", true).await;
        let alice = Self::principal(&store, "alice", false).await;
        let bob = Self::principal(&store, "bob", false).await;
        Self { store, services, admin, alice, bob }
    }

    async fn principal(store: &MemoryStore, username: &str, is_admin: bool) -> Principal {
        let user = store
            .insert_user(&NewUser { username: username.into(), password_hash: "unused".into(), is_admin })
            .await
            .expect("seed user");
        Principal { user_id: user.id, username: user.username, is_admin }
    }

    /// The named car under the named company, creating either as needed.
    pub async fn car(&self, company: &str, name: &str) -> car::Model {
        let company = match self.store.find_company_by_name(company).await.expect("lookup company") {
            Some(c) => c,
            None => self.store.insert_company(company).await.expect("seed company"),
        };
        self.store
            .insert_car(&NewCar { name: name.into(), company_id: company.id })
            .await
            .expect("seed car")
    }
}
