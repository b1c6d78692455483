//! The record store capability contract.
//!
//! [`RecordStore`] is the only way the rest of the workspace reads or
//! writes virus and vaccine records. Backends must make
//! [`RecordStore::insert_vaccine_and_eliminate`] a single atomic step: it
//! is the one serialization point for "a virus is eliminated by at most
//! one vaccine".

use std::cmp::Ordering;
use std::collections::HashSet;

use abandon_types::{AgentStats, GameStats, Page, Vaccine, Virus};
use async_trait::async_trait;

use crate::error::StoreError;

/// Durable keyed storage for virus and vaccine records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new virus.
    ///
    /// Fails with [`StoreError::DuplicateHash`] if the hash already exists.
    async fn insert_virus(&self, virus: &Virus) -> Result<(), StoreError>;

    /// Atomically insert `vaccine` and transition the virus with
    /// `target_hash` from active to eliminated.
    ///
    /// The eliminator identity and time are taken from the vaccine's
    /// `created_by` and `created_at`. If no *active* virus has the target
    /// hash the call fails with [`StoreError::TargetNotEliminable`] and
    /// nothing is written. Returns the updated virus.
    async fn insert_vaccine_and_eliminate(
        &self,
        vaccine: &Vaccine,
        target_hash: &str,
    ) -> Result<Virus, StoreError>;

    /// Look up a virus by its hash.
    async fn get_virus_by_hash(&self, hash: &str) -> Result<Option<Virus>, StoreError>;

    /// All active viruses, newest first.
    async fn list_active_viruses(&self) -> Result<Vec<Virus>, StoreError>;

    /// One page of active viruses, newest first.
    async fn list_viruses_paginated(&self, page: u64, limit: u64)
    -> Result<Page<Virus>, StoreError>;

    /// One page of vaccines, newest first.
    async fn list_vaccines_paginated(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<Page<Vaccine>, StoreError>;

    /// The `limit` most recent viruses of any status.
    async fn recent_viruses(&self, limit: u64) -> Result<Vec<Virus>, StoreError>;

    /// The `limit` most recent vaccines.
    async fn recent_vaccines(&self, limit: u64) -> Result<Vec<Vaccine>, StoreError>;

    /// Viruses whose hash or creator equals `query` exactly, newest first.
    async fn search_viruses(&self, query: &str) -> Result<Vec<Virus>, StoreError>;

    /// Aggregate statistics over the current record sets.
    async fn compute_stats(&self) -> Result<GameStats, StoreError>;

    /// Every distinct identity that created or eliminated anything.
    async fn participants(&self) -> Result<HashSet<String>, StoreError>;

    /// Participation summary for one identity. Unknown identities get zeros.
    async fn agent_stats(&self, address: &str) -> Result<AgentStats, StoreError>;
}

/// Newest-first ordering for viruses: `created_at DESC, id DESC`.
pub fn newest_virus_first(a: &Virus, b: &Virus) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

/// Newest-first ordering for vaccines: `created_at DESC, id DESC`.
pub fn newest_vaccine_first(a: &Vaccine, b: &Vaccine) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}
