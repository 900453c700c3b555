//! Task API service
//!
//! Serves the authentication endpoints from the `auth` crate next to the
//! ownership-scoped task CRUD endpoints.

pub mod config;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::{create_app, create_router};
pub use state::AppState;
