use circ_store::StoreError;

/// Errors produced by ledger operations.
///
/// Validation failures (`InvalidArgument`, `NotFound`, `LimitExceeded`) are
/// detected before any mutation; `Conflict` reports a concurrent update that
/// won a conditional write; `Upstream` wraps collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("loan limit reached: at most {limit} active loans per reader")]
    LimitExceeded { limit: u32 },

    #[error("conflicting update: {0}")]
    Conflict(String),

    #[error("record store failure: {0}")]
    Upstream(StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            // A failed conditional decrement means another writer took the
            // last copy between our read and our write.
            StoreError::CopiesExhausted(id) => {
                Self::Conflict(format!("no available copy of title {id}"))
            }
            // A duplicate-id insert means another writer created the record
            // first (e.g. two borrows auto-registering the same reader).
            StoreError::DuplicateId(id) => {
                Self::Conflict(format!("record {id} was created concurrently"))
            }
            other => Self::Upstream(other),
        }
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
