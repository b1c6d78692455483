//! Proof-of-work for the abandon.ai virus vs vaccine game.
//!
//! Viruses are minted by finding a nonce whose SHA-256 digest starts with
//! `difficulty` zero hex digits. Vaccines must meet the *target virus's*
//! difficulty, which makes eliminating an expensive virus as costly as
//! creating it.
//!
//! Everything here is pure and stateless; validation is safe to run from
//! any number of tasks at once.
//!
//! # Modules
//!
//! - [`validate`] -- Canonical messages, digest checks, submission validation
//! - [`miner`] -- Bounded nonce search
//! - [`error`] -- Validation failure reasons

pub mod error;
pub mod miner;
pub mod validate;

pub use error::PowError;
pub use miner::{mine_vaccine, mine_virus, Mined};
pub use validate::{
    digest_hex, meets_difficulty, vaccine_message, validate_vaccine, validate_virus,
    virus_message, MAX_DIFFICULTY, MAX_MEMO_LEN, MIN_DIFFICULTY,
};
