//! Canonical messages, digests, and submission validation.
//!
//! Message templates:
//!
//! ```text
//! virus:{creator}:{timestamp}:{nonce}:{difficulty}:{memo}
//! vaccine:{creator}:{target}:{timestamp}:{nonce}
//! ```
//!
//! A digest is the lowercase hex SHA-256 of the message bytes. Difficulty
//! `N` means the digest starts with `N` literal `'0'` characters.

use sha2::{Digest, Sha256};

use crate::error::PowError;

/// Lowest difficulty a virus may be created with.
pub const MIN_DIFFICULTY: u32 = 3;

/// Highest difficulty a virus may be created with.
pub const MAX_DIFFICULTY: u32 = 10;

/// Maximum memo length in hex characters (512 bytes).
pub const MAX_MEMO_LEN: usize = 1024;

/// Build the canonical virus message. An absent memo hashes as `""`.
pub fn virus_message(
    creator: &str,
    timestamp: i64,
    nonce: u64,
    difficulty: u32,
    memo: Option<&str>,
) -> String {
    let memo = memo.unwrap_or_default();
    format!("virus:{creator}:{timestamp}:{nonce}:{difficulty}:{memo}")
}

/// Build the canonical vaccine message.
pub fn vaccine_message(creator: &str, target: &str, timestamp: i64, nonce: u64) -> String {
    format!("vaccine:{creator}:{target}:{timestamp}:{nonce}")
}

/// Lowercase hex SHA-256 of `message`.
pub fn digest_hex(message: &str) -> String {
    hex::encode(Sha256::digest(message.as_bytes()))
}

/// Whether `hash` starts with at least `difficulty` `'0'` characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let Ok(required) = usize::try_from(difficulty) else {
        return false;
    };
    hash.len() >= required && hash.bytes().take(required).all(|b| b == b'0')
}

/// Validate a virus submission and return its digest.
///
/// Checks, in order: difficulty range, memo encoding, memo length, and
/// finally the digest prefix. An empty memo is treated as absent.
pub fn validate_virus(
    creator: &str,
    timestamp: i64,
    nonce: u64,
    difficulty: u32,
    memo: Option<&str>,
) -> Result<String, PowError> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(PowError::DifficultyOutOfRange { difficulty });
    }

    let memo = memo.filter(|m| !m.is_empty());
    if let Some(m) = memo {
        if !m.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PowError::InvalidMemoEncoding);
        }
        if m.len() > MAX_MEMO_LEN {
            return Err(PowError::MemoTooLong { len: m.len() });
        }
    }

    let hash = digest_hex(&virus_message(creator, timestamp, nonce, difficulty, memo));
    if !meets_difficulty(&hash, difficulty) {
        return Err(PowError::InsufficientWork {
            required: difficulty,
        });
    }
    Ok(hash)
}

/// Validate a vaccine submission against its target's difficulty.
///
/// The difficulty is inherited from the target virus; the submitter never
/// chooses it.
pub fn validate_vaccine(
    creator: &str,
    target: &str,
    timestamp: i64,
    nonce: u64,
    target_difficulty: u32,
) -> Result<String, PowError> {
    let hash = digest_hex(&vaccine_message(creator, target, timestamp, nonce));
    if !meets_difficulty(&hash, target_difficulty) {
        return Err(PowError::InsufficientWork {
            required: target_difficulty,
        });
    }
    Ok(hash)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::miner::{mine_vaccine, mine_virus};

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb";
    const TS: i64 = 1_738_454_400;

    #[test]
    fn digest_matches_known_sha256() {
        assert_eq!(
            digest_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn messages_follow_templates() {
        assert_eq!(
            virus_message("0xa", 10, 7, 3, None),
            "virus:0xa:10:7:3:"
        );
        assert_eq!(
            virus_message("0xa", 10, 7, 3, Some("beef")),
            "virus:0xa:10:7:3:beef"
        );
        assert_eq!(
            vaccine_message("0xa", "000f", 10, 7),
            "vaccine:0xa:000f:10:7"
        );
    }

    #[test]
    fn memo_changes_the_digest() {
        let plain = digest_hex(&virus_message(ADDR, TS, 12_345, 5, None));
        let with_memo = digest_hex(&virus_message(ADDR, TS, 12_345, 5, Some("abc123")));
        assert_eq!(plain.len(), 64);
        assert_ne!(plain, with_memo);
    }

    #[test]
    fn prefix_check() {
        assert!(meets_difficulty("00000abc123", 5));
        assert!(meets_difficulty("000abc123", 3));
        assert!(!meets_difficulty("0000abc123", 5));
        assert!(!meets_difficulty("00abc123", 3));
        assert!(meets_difficulty("0000000000", 10));
        assert!(!meets_difficulty("0000000000", 11));
        assert!(meets_difficulty("", 0));
    }

    #[test]
    fn difficulty_outside_range_is_rejected() {
        for difficulty in [0, 2, 11, 64] {
            let err = validate_virus(ADDR, TS, 1, difficulty, None).unwrap_err();
            assert_eq!(err, PowError::DifficultyOutOfRange { difficulty });
            assert!(err.to_string().contains("between 3 and 10"));
        }
    }

    #[test]
    fn memo_must_be_bounded_hex() {
        let err = validate_virus(ADDR, TS, 1, 5, Some("invalid-hex!")).unwrap_err();
        assert_eq!(err, PowError::InvalidMemoEncoding);

        let long = "a".repeat(MAX_MEMO_LEN + 1);
        let err = validate_virus(ADDR, TS, 1, 5, Some(&long)).unwrap_err();
        assert_eq!(err, PowError::MemoTooLong { len: MAX_MEMO_LEN + 1 });
    }

    #[test]
    fn mined_virus_validates_to_independent_digest() {
        let mined = mine_virus(ADDR, TS, 3, Some("abc123"), 0, 1_000_000).unwrap();
        let hash = validate_virus(ADDR, TS, mined.nonce, 3, Some("abc123")).unwrap();
        assert_eq!(hash, mined.hash);
        assert_eq!(
            hash,
            digest_hex(&virus_message(ADDR, TS, mined.nonce, 3, Some("abc123")))
        );
        assert!(hash.starts_with("000"));
    }

    #[test]
    fn wrong_nonce_fails_with_required_difficulty() {
        let mined = mine_virus(ADDR, TS, 3, None, 0, 1_000_000).unwrap();
        // Find a neighbouring nonce that does not satisfy difficulty 3.
        let bad = (mined.nonce + 1..)
            .find(|n| !meets_difficulty(&digest_hex(&virus_message(ADDR, TS, *n, 3, None)), 3))
            .unwrap();
        let err = validate_virus(ADDR, TS, bad, 3, None).unwrap_err();
        assert_eq!(err, PowError::InsufficientWork { required: 3 });
        assert_eq!(
            err.to_string(),
            "PoW verification failed. Required difficulty: 3"
        );
    }

    #[test]
    fn vaccine_uses_inherited_difficulty() {
        let target = "000abc";
        let mined = mine_vaccine(ADDR, target, TS, 3, 0, 1_000_000).unwrap();
        assert_eq!(
            validate_vaccine(ADDR, target, TS, mined.nonce, 3).unwrap(),
            mined.hash
        );
        // The same nonce is judged against whatever the target demands.
        if !meets_difficulty(&mined.hash, 10) {
            assert_eq!(
                validate_vaccine(ADDR, target, TS, mined.nonce, 10).unwrap_err(),
                PowError::InsufficientWork { required: 10 }
            );
        }
    }
}
