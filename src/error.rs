//! Error taxonomy for seeding sessions.
//!
//! Fallible operations return `anyhow::Result`; the variants here are the
//! conditions callers are expected to tell apart (via `downcast_ref`).

use thiserror::Error;

/// Session-level failures surfaced by the engine and the orchestrator.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Parent name entered at a prompt does not exist
    #[error("Parent '{0}' is invalid")]
    InvalidParent(String),

    /// Table name entered at a prompt does not exist
    #[error("Table name '{0}' is invalid")]
    InvalidTable(String),

    /// Row count was not an integer greater than zero
    #[error("Invalid number of rows: {0}. Must be an integer greater than zero")]
    InvalidRowCount(String),

    /// Edit targeted a column the table does not declare
    #[error("Column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Configuration file is malformed or inconsistent
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The next key would not fit in the key column
    #[error("No keys left in '{table}.{column}' after {last}")]
    KeyExhausted {
        table: String,
        column: String,
        last: i64,
    },

    /// The database rejected the insert; no rows were written
    #[error("Failed to insert rows into '{table}': {message}")]
    Persistence { table: String, message: String },

    /// User chose to abort the session
    #[error("Session aborted")]
    Aborted,
}
