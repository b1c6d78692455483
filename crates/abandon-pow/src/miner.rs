//! Bounded nonce search.
//!
//! Used by client tooling and tests to produce valid submissions. Expected
//! work is `16^difficulty` hashes, so callers always pass an attempt cap.

use crate::validate::{digest_hex, meets_difficulty, vaccine_message, virus_message};

/// A nonce together with the digest it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mined {
    /// The satisfying nonce.
    pub nonce: u64,
    /// Lowercase hex digest for that nonce.
    pub hash: String,
}

/// Search `[start_nonce, start_nonce + max_attempts)` for a virus nonce.
pub fn mine_virus(
    creator: &str,
    timestamp: i64,
    difficulty: u32,
    memo: Option<&str>,
    start_nonce: u64,
    max_attempts: u64,
) -> Option<Mined> {
    let memo = memo.filter(|m| !m.is_empty());
    search(start_nonce, max_attempts, difficulty, |nonce| {
        virus_message(creator, timestamp, nonce, difficulty, memo)
    })
}

/// Search `[start_nonce, start_nonce + max_attempts)` for a vaccine nonce
/// against `target` at the target's difficulty.
pub fn mine_vaccine(
    creator: &str,
    target: &str,
    timestamp: i64,
    difficulty: u32,
    start_nonce: u64,
    max_attempts: u64,
) -> Option<Mined> {
    search(start_nonce, max_attempts, difficulty, |nonce| {
        vaccine_message(creator, target, timestamp, nonce)
    })
}

fn search(
    start_nonce: u64,
    max_attempts: u64,
    difficulty: u32,
    message: impl Fn(u64) -> String,
) -> Option<Mined> {
    let end = start_nonce.saturating_add(max_attempts);
    (start_nonce..end).find_map(|nonce| {
        let hash = digest_hex(&message(nonce));
        meets_difficulty(&hash, difficulty).then_some(Mined { nonce, hash })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_attempts_finds_nothing() {
        assert_eq!(mine_virus("0xa", 1, 3, None, 0, 0), None);
    }

    #[test]
    fn search_starts_at_start_nonce() {
        let first = mine_vaccine("0xa", "000f", 1, 3, 0, 1_000_000);
        let Some(first) = first else {
            return;
        };
        let next = mine_vaccine("0xa", "000f", 1, 3, first.nonce.saturating_add(1), 1_000_000);
        if let Some(next) = next {
            assert!(next.nonce > first.nonce);
            assert_ne!(next.hash, first.hash);
        }
    }
}
