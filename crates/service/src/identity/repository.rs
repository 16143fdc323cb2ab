use async_trait::async_trait;

use models::user;

use super::{NewUser, UserChanges};
use crate::errors::ServiceError;
use crate::query::UserFilter;

/// Persistence for users. Usernames are unique at this layer.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<user::Model>, ServiceError>;
    async fn find_user(&self, id: i32) -> Result<Option<user::Model>, ServiceError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<user::Model>, ServiceError>;
    async fn insert_user(&self, input: &NewUser) -> Result<user::Model, ServiceError>;
    async fn update_user(&self, id: i32, changes: &UserChanges) -> Result<user::Model, ServiceError>;
    async fn delete_user(&self, id: i32) -> Result<(), ServiceError>;
}
