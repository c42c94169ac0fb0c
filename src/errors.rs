use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the projection engine and its storage layer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(Uuid),
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(Uuid),
    #[error("Ghost transactions cannot be persisted")]
    GhostWrite,
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
