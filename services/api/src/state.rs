//! Application state shared across handlers

use auth::{AuthState, JwtService};
use sqlx::SqlitePool;

use crate::repositories::TaskRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub task_repository: TaskRepository,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt_service: JwtService) -> Self {
        Self {
            task_repository: TaskRepository::new(pool.clone()),
            auth: AuthState::new(pool.clone(), jwt_service),
            db_pool: pool,
        }
    }
}
