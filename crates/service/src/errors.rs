use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) | ServiceError::Model(_) => 2001,
            ServiceError::NotFound(_) => 2002,
            ServiceError::Conflict(_) => 2003,
            ServiceError::Forbidden(_) => 2004,
            ServiceError::Db(_) => 2100,
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ServiceError::Conflict(msg),
            _ => match e {
                DbErr::RecordNotFound(what) => ServiceError::NotFound(what),
                other => ServiceError::Db(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_per_kind() {
        let errs = [
            ServiceError::Validation("x".into()),
            ServiceError::not_found("car"),
            ServiceError::conflict("dup"),
            ServiceError::Forbidden("no".into()),
            ServiceError::Db("boom".into()),
        ];
        let mut codes: Vec<u16> = errs.iter().map(ServiceError::code).collect();
        codes.dedup();
        assert_eq!(codes.len(), errs.len());
    }

    #[test]
    fn record_not_found_maps_to_not_found() {
        let e: ServiceError = DbErr::RecordNotFound("service".into()).into();
        assert!(matches!(e, ServiceError::NotFound(_)));
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(ServiceError::not_found("car").to_string(), "not found: car not found");
    }
}
