use thiserror::Error;

use crate::auth::PasswordError;
use crate::database::DatabaseError;
use crate::storage::StorageError;
use crate::validation::ValidationError;

/// Failure taxonomy shared by every service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Client-safe message; the specific clash is only logged
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Forbidden(String),

    /// Absent and cross-tenant records alike
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn invalid_credentials() -> Self {
        ServiceError::Authentication("Invalid email or password".to_string())
    }

    pub fn unauthorized() -> Self {
        ServiceError::Authentication("Unauthorized".to_string())
    }
}
