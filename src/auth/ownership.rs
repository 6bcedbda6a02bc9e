//! Ownership checks for user-owned resources.
//!
//! Order matters: a missing resource is `NotFound`, a resource owned by
//! someone else is `Forbidden`, and only then may the caller mutate it.
//! Callers run this before validating the mutation payload.

use crate::auth::AuthUser;
use crate::error::ServiceError;
use crate::models::{Review, ReviewComment};

pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for Review {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for ReviewComment {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

pub fn ensure_owner<T: Owned>(
    resource: Option<T>,
    user: &AuthUser,
    kind: &'static str,
) -> Result<T, ServiceError> {
    let resource = resource.ok_or(ServiceError::NotFound(kind))?;
    if resource.owner_id() != user.user_id {
        tracing::warn!(
            user_id = user.user_id,
            owner_id = resource.owner_id(),
            kind,
            "ownership check failed"
        );
        return Err(ServiceError::Forbidden);
    }
    Ok(resource)
}
