use sea_orm::entity::prelude::*;

use crate::errors::{self, ModelError};

pub const USERNAME_MAX_LEN: usize = 64;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;

/// Mechanic or administrator. Never serialized directly: the credential
/// hash stays inside the process.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::has_many(crate::service::Entity).into(),
        }
    }
}

impl Related<crate::service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    errors::require_text("username", username, USERNAME_MAX_LEN)?;
    if username.trim() != username {
        return Err(ModelError::Validation("username must not start or end with whitespace".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(ModelError::Validation(format!("password too short (>={PASSWORD_MIN_LEN})")));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(ModelError::Validation(format!("password too long (<={PASSWORD_MAX_LEN})")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("mech_1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username(" padded").is_err());
        assert!(validate_username(&"x".repeat(USERNAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Passw0rd").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(PASSWORD_MAX_LEN + 1)).is_err());
    }
}
