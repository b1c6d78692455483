//! Proof-of-work validation errors.
//!
//! Each variant carries a human-readable message that is returned to the
//! submitter verbatim.

/// Reasons a submission fails proof-of-work validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PowError {
    /// Virus difficulty outside `[3, 10]`.
    #[error("difficulty out of range: must be between 3 and 10 (got {difficulty})")]
    DifficultyOutOfRange {
        /// The rejected difficulty.
        difficulty: u32,
    },

    /// Memo contains non-hex characters.
    #[error("invalid memo encoding: memo must be a valid hexadecimal string")]
    InvalidMemoEncoding,

    /// Memo longer than 1024 hex characters.
    #[error("memo too long: exceeds maximum length (1024 hex characters, got {len})")]
    MemoTooLong {
        /// Length of the rejected memo.
        len: usize,
    },

    /// Digest does not have enough leading zeros.
    #[error("PoW verification failed. Required difficulty: {required}")]
    InsufficientWork {
        /// Leading zeros that were required.
        required: u32,
    },
}

impl PowError {
    /// Whether the failure is about input shape rather than work.
    pub const fn is_input_error(&self) -> bool {
        !matches!(self, Self::InsufficientWork { .. })
    }
}
