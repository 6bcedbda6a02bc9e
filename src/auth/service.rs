use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::middleware::AuthUser;
use super::password::PasswordHashing;
use super::token::{TokenPair, TokenService};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{NewUser, User};
use crate::repository::{RepoError, UserRepository};

/// User Registration Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    #[schema(example = "alice@example.com")]
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[schema(example = "password123")]
    #[validate(length(min = 8, max = 128, message = "must be 8 to 128 characters"))]
    pub password: String,
    #[schema(example = "Alice")]
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
}

/// User Login Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[schema(example = "alice@example.com")]
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
    #[schema(example = "password123")]
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
}

/// Auth Response (user + token pair)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: TokenPair,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    hashing: Arc<PasswordHashing>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        hashing: Arc<PasswordHashing>,
    ) -> Self {
        Self {
            users,
            tokens,
            hashing,
        }
    }

    /// Register a new user and sign them in.
    pub async fn sign_up(&self, mut req: SignUpRequest) -> ServiceResult<AuthResponse> {
        req.email = normalize_email(&req.email);
        req.validate()?;
        let email = req.email;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(ServiceError::DuplicateEmail);
        }

        let password_hash = self.hash_blocking(req.password).await?;

        // The unique constraint settles concurrent sign-ups for one email
        let user = self
            .users
            .create(NewUser {
                email,
                name: req.name.trim().to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepoError::UniqueViolation(_) => ServiceError::DuplicateEmail,
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, "user registered");
        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(AuthResponse { user, token })
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// Unknown email and wrong password produce the same error and cost.
    pub async fn sign_in(&self, mut req: SignInRequest) -> ServiceResult<AuthResponse> {
        req.email = normalize_email(&req.email);
        req.validate()?;
        let user = self.users.get_by_email(&req.email).await?;

        let hashing = self.hashing.clone();
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let password = req.password;
        let verified = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hashing.verify(&password, &hash),
            None => Ok(hashing.verify_dummy(&password)),
        })
        .await
        .map_err(ServiceError::internal)?
        .map_err(ServiceError::internal)?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::warn!("sign-in failed");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        tracing::info!(user_id = user.id, "user signed in");
        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(AuthResponse { user, token })
    }

    /// Exchange a refresh token for a new pair. The user must still exist.
    pub async fn refresh(&self, req: RefreshRequest) -> ServiceResult<AuthResponse> {
        req.validate()?;
        let identity = self.tokens.validate_refresh(&req.refresh_token)?;
        let user = self
            .users
            .get_by_id(identity.user_id)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(AuthResponse { user, token })
    }

    pub async fn current_user(&self, auth: &AuthUser) -> ServiceResult<User> {
        self.users
            .get_by_id(auth.user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))
    }

    async fn hash_blocking(&self, password: String) -> ServiceResult<String> {
        let hashing = self.hashing.clone();
        tokio::task::spawn_blocking(move || hashing.hash(&password))
            .await
            .map_err(ServiceError::internal)?
            .map_err(ServiceError::internal)
    }
}
