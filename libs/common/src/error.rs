//! Error type for the database layer

use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Bad URL or pool setting
    #[error("Invalid database configuration: {0}")]
    Configuration(String),

    #[error("Could not open database {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: SqlxError,
    },

    #[error("Database query failed: {0}")]
    Query(#[source] SqlxError),

    /// A start-up `CREATE ... IF NOT EXISTS` statement failed
    #[error("Schema synchronisation failed: {0}")]
    Schema(#[source] SqlxError),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
