//! Authentication for the task tracker
//!
//! Registration and login with argon2-hashed passwords, HS256 bearer tokens,
//! and the middleware other routers use to resolve a token to the acting
//! user.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod validation;

use sqlx::SqlitePool;

pub use error::{AuthError, AuthResult};
pub use jwt::{JwtConfig, JwtService};
pub use middleware::{AuthUser, require_bearer};
pub use routes::create_router;

use crate::{
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
};

/// State shared across the authentication handlers
#[derive(Clone)]
pub struct AuthState {
    pub user_repository: UserRepository,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
}

impl AuthState {
    /// Build the state with the default login rate limit
    pub fn new(pool: SqlitePool, jwt_service: JwtService) -> Self {
        Self {
            user_repository: UserRepository::new(pool),
            jwt_service,
            rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        }
    }
}
