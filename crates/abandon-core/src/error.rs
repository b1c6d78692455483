//! Engine error types.
//!
//! Every failure a submission or query can produce is one [`GameError`]
//! variant. Store and validator errors are mapped here so nothing below the
//! engine leaks to the API uncategorised.

use abandon_db::StoreError;
use abandon_pow::PowError;

/// Errors returned by the game engine and query façade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The request was malformed or failed a guard.
    #[error("{0}")]
    Validation(String),

    /// The digest did not meet the required difficulty.
    #[error("{0}")]
    ProofOfWork(PowError),

    /// A record with the same hash already exists.
    #[error("{kind} with this hash already exists")]
    DuplicateHash {
        /// `"Virus"` or `"Vaccine"`.
        kind: &'static str,
        /// The conflicting hash.
        hash: String,
    },

    /// The vaccine's target does not exist.
    #[error("Target virus not found")]
    TargetNotFound(String),

    /// The vaccine's target was already eliminated (possibly by a racing
    /// vaccine).
    #[error("Target virus already eliminated")]
    TargetAlreadyEliminated(String),

    /// The record store failed or could not be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A submission task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// Map a store error raised while writing a record of `kind`.
    pub fn from_store(err: StoreError, kind: &'static str) -> Self {
        match err {
            StoreError::DuplicateHash(hash) => Self::DuplicateHash { kind, hash },
            StoreError::TargetNotEliminable(hash) => Self::TargetAlreadyEliminated(hash),
            StoreError::Unavailable(_)
            | StoreError::Corrupt(_)
            | StoreError::Migration(_)
            | StoreError::Config(_) => Self::StorageUnavailable(err.to_string()),
        }
    }

    /// Whether the caller, not the server, is at fault.
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::StorageUnavailable(_) | Self::Internal(_))
    }
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        Self::from_store(err, "Record")
    }
}

impl From<PowError> for GameError {
    fn from(err: PowError) -> Self {
        if err.is_input_error() {
            Self::Validation(err.to_string())
        } else {
            Self::ProofOfWork(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_categorised() {
        assert_eq!(
            GameError::from_store(StoreError::DuplicateHash("000a".into()), "Virus").to_string(),
            "Virus with this hash already exists"
        );
        assert!(matches!(
            GameError::from(StoreError::TargetNotEliminable("000a".into())),
            GameError::TargetAlreadyEliminated(_)
        ));
        let err = GameError::from(StoreError::Corrupt("bad row".into()));
        assert!(matches!(err, GameError::StorageUnavailable(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn pow_input_errors_become_validation() {
        let err = GameError::from(PowError::DifficultyOutOfRange { difficulty: 11 });
        assert!(matches!(err, GameError::Validation(_)));
        let err = GameError::from(PowError::InsufficientWork { required: 4 });
        assert_eq!(err.to_string(), "PoW verification failed. Required difficulty: 4");
        assert!(err.is_client_error());
    }
}
