//! Authentication and authorization.
//!
//! - [`token`]: HS256 access/refresh tokens
//! - [`password`]: Argon2id hashing
//! - [`service`]: sign-up, sign-in, refresh
//! - [`middleware`]: bearer middleware and the [`AuthUser`] extractor
//! - [`ownership`]: owner checks before mutation

pub mod middleware;
pub mod ownership;
pub mod password;
pub mod service;
pub mod token;

pub use middleware::{AuthUser, jwt_auth_middleware};
pub use ownership::{Owned, ensure_owner};
pub use password::PasswordHashing;
pub use service::{AuthResponse, AuthService, RefreshRequest, SignInRequest, SignUpRequest};
pub use token::{Claims, TokenIdentity, TokenPair, TokenService, TokenType, decode_unverified};
