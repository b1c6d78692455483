//! Error types for the record store.
//!
//! Every backend reports failures through [`StoreError`]. The two business
//! outcomes the engine must distinguish (`DuplicateHash` and
//! `TargetNotEliminable`) are their own variants; everything that means
//! "the store could not be reached or did not answer" collapses into
//! [`StoreError::Unavailable`].

/// Errors that can occur in the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with this hash already exists.
    #[error("duplicate hash: {0}")]
    DuplicateHash(String),

    /// The atomic eliminate found no active virus with the target hash.
    /// Nothing was written.
    #[error("target not eliminable: {0}")]
    TargetNotEliminable(String),

    /// The backing store is unreachable or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded into a record.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether retrying the same call later could succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::DuplicateHash(db.constraint().unwrap_or("unknown").to_owned())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::Corrupt(err.to_string())
            }
            _ => Self::Unavailable(err.to_string()),
        }
    }
}
