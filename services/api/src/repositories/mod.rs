//! Repositories for database operations

pub mod task;

pub use task::TaskRepository;
