//! Terminal dashboard for the task tracker
//!
//! [`SessionContext`] holds the signed-in user and their tasks and talks to
//! the API through [`ApiClient`]. [`app::App`] turns key presses into
//! commands and [`ui::draw`] renders the result.

pub mod app;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod notifications;
pub mod session;
pub mod storage;
pub mod ui;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::SessionContext;
pub use storage::{SessionStorage, StoredSession};
