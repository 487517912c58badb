use circ_types::TitleId;

/// Errors from record store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// An insert collided with an existing record id.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    /// A conditional decrement found no copy left to reserve.
    #[error("no available copy of title {0}")]
    CopiesExhausted(TitleId),

    /// The backing store could not be reached.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// Encoding or decoding a record failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
