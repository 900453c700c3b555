//! Payloads shared by the API and its clients

pub mod task;
pub mod user;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use task::{NewTask, Task, TaskPriority, TaskStatus, UpdateTask};
pub use user::{AuthResponse, DEFAULT_USER_NAME, LoginRequest, RegisterRequest, UserProfile};

/// Generic `{ "message": ... }` body used for confirmations and errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error returned when parsing a status or priority name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseEnumError {
    #[error("unknown task status: {0}")]
    Status(String),

    #[error("unknown task priority: {0}")]
    Priority(String),
}
