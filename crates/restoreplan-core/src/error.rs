//! Core error types

/// Errors raised by the core domain model and configuration loading
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid table identifier '{0}': expected exactly two non-empty dot-separated segments (schema.table)")]
    InvalidTableId(String),

    #[error("Invalid schema name '{0}': must be a valid SQL identifier")]
    InvalidSchemaName(String),

    #[error("Schema set is empty: at least one schema must be configured")]
    EmptySchemaSet,

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
