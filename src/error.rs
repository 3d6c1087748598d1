use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanboardError>;

#[derive(Debug, Error)]
pub enum KanboardError {
    #[error("Index {index} out of range for list of length {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("Entity not found in source group: {0}")]
    UnknownEntity(String),

    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("Invalid gesture: {0}")]
    InvalidGesture(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Board has not been loaded yet")]
    BoardNotLoaded,

    #[error("Persistence call {step}/{total} for {entity} failed: {source}")]
    PersistenceCallFailed {
        entity: String,
        step: usize,
        total: usize,
        #[source]
        source: Box<KanboardError>,
    },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl KanboardError {
    /// True for errors caused by inconsistent gesture input rather than
    /// by the persistence collaborator. These are never retried.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidIndex { .. } | Self::UnknownEntity(_) | Self::InvalidGesture(_)
        )
    }
}
