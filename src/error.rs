//! Service-level error taxonomy.
//!
//! Every service returns [`ServiceError`]; the gateway maps each variant to
//! exactly one HTTP status (see `gateway::error`).

use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::repository::RepoError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl std::fmt::Display) -> Self {
        Self::Internal(msg.to_string())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Generic mapping. Services translate constraint violations that carry
/// domain meaning (duplicate email, referenced rows) before falling back here.
/// Constraint names stay in the log.
impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::UniqueViolation(c) => {
                tracing::warn!(constraint = %c, "unique constraint violated");
                Self::Conflict("resource already exists".to_string())
            }
            RepoError::ForeignKeyViolation(c) => {
                tracing::warn!(constraint = %c, "foreign key constraint violated");
                Self::Conflict("resource is referenced by other records".to_string())
            }
            RepoError::CheckViolation(c) => {
                tracing::warn!(constraint = %c, "check constraint violated");
                Self::Validation("value violates a constraint".to_string())
            }
            RepoError::Timeout => Self::Unavailable("database is busy, try again".to_string()),
            RepoError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InvalidToken => Self::InvalidToken,
            TokenError::Signing(e) => Self::Internal(format!("token signing failed: {}", e)),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        Self::Unavailable(format!("image storage failed: {}", e))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_mapping() {
        assert!(matches!(
            ServiceError::from(RepoError::UniqueViolation("x".into())),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(RepoError::CheckViolation("reviews_rating_check".into())),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            ServiceError::from(RepoError::Timeout),
            ServiceError::Unavailable(_)
        ));
    }

    #[test]
    fn test_constraint_names_are_not_exposed() {
        let errors = [
            RepoError::UniqueViolation("stores_name_key".into()),
            RepoError::ForeignKeyViolation("menu_items_store_id_fkey".into()),
            RepoError::CheckViolation("reviews_rating_check".into()),
        ];
        let messages: Vec<String> = errors
            .into_iter()
            .map(|e| ServiceError::from(e).to_string())
            .collect();
        assert_eq!(
            messages,
            vec![
                "resource already exists",
                "resource is referenced by other records",
                "validation failed: value violates a constraint",
            ]
        );
    }

    #[test]
    fn test_token_errors_collapse() {
        assert!(matches!(
            ServiceError::from(TokenError::InvalidToken),
            ServiceError::InvalidToken
        ));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ServiceError::NotFound("review").to_string(), "review not found");
    }
}
