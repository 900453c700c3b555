//! Common library for the task tracker
//!
//! This crate provides the types shared by the server and the client: the
//! task and user payloads that travel over HTTP. With the `database` feature
//! enabled it also provides SQLite connectivity, schema synchronisation and
//! the database error type used by the services.

#[cfg(feature = "database")]
pub mod database;
#[cfg(feature = "database")]
pub mod error;
pub mod models;
