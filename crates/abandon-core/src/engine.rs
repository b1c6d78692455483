//! The game state engine.
//!
//! Owns the read-through cache of active viruses and aggregate stats, runs
//! every submission through guard, validator and store, and publishes a
//! [`GameEvent`] for each committed mutation.
//!
//! # Consistency
//!
//! The record store is the source of truth; the atomic
//! `insert_vaccine_and_eliminate` is the only serialization point for
//! eliminations. The cache lock is never held across store I/O. After a
//! store write commits, the engine takes the cache write guard, applies the
//! delta, computes the stats snapshot and publishes the event before
//! releasing it, so observers see events in the same order as the stats
//! they carry.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use abandon_db::RecordStore;
use abandon_db::store::newest_virus_first;
use abandon_pow::{validate_vaccine, validate_virus};
use abandon_types::{
    AgentStats, CreateVaccineRequest, CreateVirusRequest, GameEvent, GameStats, History,
    StatusSnapshot, Vaccine, VaccineId, Virus, VirusCreated, VirusEliminated, VirusId,
    VirusStatus,
};
use tokio::sync::RwLock;

use crate::broadcast::EventHub;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::guard::{AcceptAll, Submission, SubmissionGuard, TimestampWindow};
use crate::query::Queries;

// =============================================================================
// Submissions
// =============================================================================

/// A request to create a virus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirusSubmission {
    /// Submitter identity.
    pub creator: String,
    /// Client timestamp that was hashed.
    pub timestamp: i64,
    /// Nonce found by the client.
    pub nonce: u64,
    /// Chosen difficulty.
    pub difficulty: u32,
    /// Optional hex memo. Empty is treated as absent.
    pub memo: Option<String>,
    /// Optional signature for guards that check one.
    pub signature: Option<String>,
}

impl From<CreateVirusRequest> for VirusSubmission {
    fn from(req: CreateVirusRequest) -> Self {
        Self {
            creator: req.creator,
            timestamp: req.timestamp,
            nonce: req.nonce,
            difficulty: req.difficulty,
            memo: req.memo,
            signature: req.signature,
        }
    }
}

/// A request to eliminate a virus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccineSubmission {
    /// Submitter identity.
    pub creator: String,
    /// Hash of the target virus.
    pub target: String,
    /// Client timestamp that was hashed.
    pub timestamp: i64,
    /// Nonce found by the client.
    pub nonce: u64,
    /// Optional signature for guards that check one.
    pub signature: Option<String>,
}

impl From<CreateVaccineRequest> for VaccineSubmission {
    fn from(req: CreateVaccineRequest) -> Self {
        Self {
            creator: req.creator,
            target: req.target,
            timestamp: req.timestamp,
            nonce: req.nonce,
            signature: req.signature,
        }
    }
}

// =============================================================================
// Cache
// =============================================================================

#[derive(Debug, Default)]
struct Cache {
    active: HashMap<String, Virus>,
    /// Eliminations applied before their creation delta landed.
    early_eliminations: HashSet<String>,
    participants: HashSet<String>,
    total_viruses: u64,
    total_vaccines: u64,
    successful_vaccines: u64,
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

impl Cache {
    fn seed(stats: GameStats, active: Vec<Virus>, participants: HashSet<String>) -> Self {
        Self {
            active: active.into_iter().map(|v| (v.hash.clone(), v)).collect(),
            early_eliminations: HashSet::new(),
            participants,
            total_viruses: stats.total_viruses_created,
            total_vaccines: stats.total_vaccines_created,
            successful_vaccines: stats.successful_vaccines,
        }
    }

    fn stats(&self) -> GameStats {
        let active = count(self.active.len());
        GameStats {
            total_viruses_created: self.total_viruses,
            active_viruses: active,
            eliminated_viruses: self.total_viruses.saturating_sub(active),
            total_vaccines_created: self.total_vaccines,
            successful_vaccines: self.successful_vaccines,
            failed_vaccines: self.total_vaccines.saturating_sub(self.successful_vaccines),
            unique_addresses: count(self.participants.len()),
        }
    }

    fn record_virus(&mut self, virus: &Virus) {
        self.total_viruses = self.total_viruses.saturating_add(1);
        self.participants.insert(virus.created_by.clone());
        if !self.early_eliminations.remove(&virus.hash) {
            self.active.insert(virus.hash.clone(), virus.clone());
        }
    }

    fn record_elimination(&mut self, virus: &Virus, vaccine: &Vaccine) {
        self.total_vaccines = self.total_vaccines.saturating_add(1);
        self.successful_vaccines = self.successful_vaccines.saturating_add(1);
        self.participants.insert(vaccine.created_by.clone());
        if self.active.remove(&virus.hash).is_none() {
            self.early_eliminations.insert(virus.hash.clone());
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Validates submissions, drives the record store, and keeps observers in
/// sync.
pub struct GameEngine {
    store: Arc<dyn RecordStore>,
    hub: EventHub,
    guard: Arc<dyn SubmissionGuard>,
    config: GameConfig,
    cache: RwLock<Cache>,
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("guard", &self.guard)
            .field("config", &self.config)
            .field("observers", &self.hub.observer_count())
            .finish_non_exhaustive()
    }
}

/// Current server time in unix seconds.
fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn require(field: &str, value: &str) -> Result<(), GameError> {
    if value.trim().is_empty() {
        return Err(GameError::Validation(format!(
            "Missing required field: {field}"
        )));
    }
    Ok(())
}

fn require_nonce(nonce: u64) -> Result<(), GameError> {
    if i64::try_from(nonce).is_err() {
        return Err(GameError::Validation(format!(
            "nonce out of range: {nonce}"
        )));
    }
    Ok(())
}

impl GameEngine {
    /// Create an engine with an empty cache.
    ///
    /// Use [`GameEngine::load`] when the store may already hold records.
    /// The guard is chosen from `config.timestamp_tolerance_secs`.
    pub fn new(store: Arc<dyn RecordStore>, hub: EventHub, config: GameConfig) -> Self {
        let guard: Arc<dyn SubmissionGuard> = match config.timestamp_tolerance_secs {
            Some(secs) => Arc::new(TimestampWindow::new(secs)),
            None => Arc::new(AcceptAll),
        };
        Self {
            store,
            hub,
            guard,
            config,
            cache: RwLock::new(Cache::default()),
        }
    }

    /// Create an engine and seed its cache from the store.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::StorageUnavailable`] if the store cannot be read.
    pub async fn load(
        store: Arc<dyn RecordStore>,
        hub: EventHub,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        let engine = Self::new(store, hub, config);
        engine.resync().await?;
        Ok(engine)
    }

    /// Replace the submission guard.
    #[must_use]
    pub fn with_guard(mut self, guard: Arc<dyn SubmissionGuard>) -> Self {
        self.guard = guard;
        self
    }

    /// Rebuild the cache from the store.
    ///
    /// Mutations that commit while the reload is in flight may be missed;
    /// call at startup or when submissions are quiesced.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::StorageUnavailable`] if the store cannot be read.
    pub async fn resync(&self) -> Result<(), GameError> {
        let (stats, active, participants) = tokio::try_join!(
            self.store.compute_stats(),
            self.store.list_active_viruses(),
            self.store.participants(),
        )?;
        let cache = Cache::seed(stats, active, participants);
        let seeded = cache.stats();
        *self.cache.write().await = cache;

        tracing::info!(
            total_viruses = seeded.total_viruses_created,
            active_viruses = seeded.active_viruses,
            total_vaccines = seeded.total_vaccines_created,
            unique_addresses = seeded.unique_addresses,
            "Game state loaded from store"
        );
        Ok(())
    }

    /// The hub observers subscribe to.
    pub const fn hub(&self) -> &EventHub {
        &self.hub
    }

    /// Engine limits.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only listing and search over the same store.
    pub fn queries(&self) -> Queries {
        Queries::new(Arc::clone(&self.store), self.config.clone())
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Validate and store a new virus, then broadcast `VirusCreated`.
    ///
    /// Runs on its own task: dropping the returned future does not cancel
    /// a store write that has already started.
    ///
    /// # Errors
    ///
    /// [`GameError::Validation`] for bad input or a guard rejection,
    /// [`GameError::ProofOfWork`] for insufficient work,
    /// [`GameError::DuplicateHash`] if the virus already exists, and
    /// [`GameError::StorageUnavailable`] on store failure.
    pub async fn submit_virus(
        self: &Arc<Self>,
        submission: VirusSubmission,
    ) -> Result<VirusCreated, GameError> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.create_virus(submission).await })
            .await
            .map_err(|e| GameError::Internal(format!("virus submission task failed: {e}")))?
    }

    /// Validate a vaccine against its target, eliminate the target
    /// atomically, then broadcast `VirusEliminated`.
    ///
    /// Runs on its own task, like [`GameEngine::submit_virus`].
    ///
    /// # Errors
    ///
    /// [`GameError::TargetNotFound`] for an unknown target,
    /// [`GameError::TargetAlreadyEliminated`] if it is (or concurrently
    /// became) eliminated, plus the errors of [`GameEngine::submit_virus`].
    pub async fn submit_vaccine(
        self: &Arc<Self>,
        submission: VaccineSubmission,
    ) -> Result<VirusEliminated, GameError> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.create_vaccine(submission).await })
            .await
            .map_err(|e| GameError::Internal(format!("vaccine submission task failed: {e}")))?
    }

    async fn create_virus(&self, submission: VirusSubmission) -> Result<VirusCreated, GameError> {
        let now = now();
        require("creator", &submission.creator)?;
        require_nonce(submission.nonce)?;
        self.guard
            .check(Submission::Virus(&submission), now)
            .map_err(GameError::Validation)?;

        let VirusSubmission {
            creator,
            timestamp,
            nonce,
            difficulty,
            memo,
            ..
        } = submission;
        let memo = memo.filter(|m| !m.is_empty());
        let hash = validate_virus(&creator, timestamp, nonce, difficulty, memo.as_deref())?;

        let virus = Virus {
            id: VirusId::new(),
            hash,
            created_by: creator,
            created_at: now,
            timestamp,
            nonce,
            difficulty,
            memo,
            status: VirusStatus::Active,
            eliminated_by: None,
            eliminated_at: None,
        };
        self.store
            .insert_virus(&virus)
            .await
            .map_err(|e| GameError::from_store(e, "Virus"))?;

        let event = {
            let mut cache = self.cache.write().await;
            cache.record_virus(&virus);
            let event = VirusCreated {
                virus,
                stats: cache.stats(),
            };
            let observers = self.hub.publish(GameEvent::VirusCreated(event.clone()));
            tracing::debug!(observers, "Published VIRUS_CREATED");
            event
        };

        tracing::info!(
            hash = %event.virus.hash,
            creator = %event.virus.created_by,
            difficulty = event.virus.difficulty,
            "Virus created"
        );
        Ok(event)
    }

    async fn create_vaccine(
        &self,
        submission: VaccineSubmission,
    ) -> Result<VirusEliminated, GameError> {
        let now = now();
        require("creator", &submission.creator)?;
        require("target", &submission.target)?;
        require_nonce(submission.nonce)?;

        let target = self
            .store
            .get_virus_by_hash(&submission.target)
            .await?
            .ok_or_else(|| GameError::TargetNotFound(submission.target.clone()))?;
        if !target.is_active() {
            return Err(GameError::TargetAlreadyEliminated(target.hash));
        }

        self.guard
            .check(Submission::Vaccine(&submission), now)
            .map_err(GameError::Validation)?;

        let hash = validate_vaccine(
            &submission.creator,
            &target.hash,
            submission.timestamp,
            submission.nonce,
            target.difficulty,
        )?;

        let vaccine = Vaccine {
            id: VaccineId::new(),
            hash,
            created_by: submission.creator,
            created_at: now,
            target: target.hash.clone(),
            timestamp: submission.timestamp,
            nonce: submission.nonce,
            success: true,
            virus_id: Some(target.id),
        };
        let virus = self
            .store
            .insert_vaccine_and_eliminate(&vaccine, &target.hash)
            .await
            .map_err(|e| GameError::from_store(e, "Vaccine"))?;

        let event = {
            let mut cache = self.cache.write().await;
            cache.record_elimination(&virus, &vaccine);
            let event = VirusEliminated {
                virus,
                vaccine,
                stats: cache.stats(),
            };
            let observers = self.hub.publish(GameEvent::VirusEliminated(event.clone()));
            tracing::debug!(observers, "Published VIRUS_ELIMINATED");
            event
        };

        tracing::info!(
            target = %event.virus.hash,
            eliminated_by = %event.vaccine.created_by,
            difficulty = event.virus.difficulty,
            "Virus eliminated"
        );
        Ok(event)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Active viruses (newest first) and the stats consistent with them.
    pub async fn status(&self) -> StatusSnapshot {
        let cache = self.cache.read().await;
        let mut active_viruses: Vec<Virus> = cache.active.values().cloned().collect();
        active_viruses.sort_by(newest_virus_first);
        StatusSnapshot {
            active_viruses,
            stats: cache.stats(),
        }
    }

    /// Current stats snapshot.
    pub async fn stats(&self) -> GameStats {
        self.cache.read().await.stats()
    }

    /// Clamp a requested history size to `[1, max_history_limit]`.
    pub fn history_limit(&self, requested: Option<u64>) -> u64 {
        let max = self.config.max_history_limit.max(1);
        requested
            .unwrap_or(self.config.default_history_limit)
            .max(1)
            .min(max)
    }

    /// Most recent viruses and vaccines, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::StorageUnavailable`] on store failure.
    pub async fn history(&self, limit: Option<u64>) -> Result<History, GameError> {
        let limit = self.history_limit(limit);
        let (viruses, vaccines) = tokio::try_join!(
            self.store.recent_viruses(limit),
            self.store.recent_vaccines(limit),
        )?;
        Ok(History { viruses, vaccines })
    }

    /// Participation summary for one identity.
    ///
    /// # Errors
    ///
    /// [`GameError::Validation`] for an empty address,
    /// [`GameError::StorageUnavailable`] on store failure.
    pub async fn agent_stats(&self, address: &str) -> Result<AgentStats, GameError> {
        let address = address.trim();
        require("address", address)?;
        Ok(self.store.agent_stats(address).await?)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use abandon_db::MemoryStore;
    use abandon_pow::{digest_hex, mine_vaccine, mine_virus, virus_message};

    use super::*;

    const TS: i64 = 1_738_454_400;
    const BUDGET: u64 = 50_000_000;

    fn engine_over(store: Arc<MemoryStore>) -> Arc<GameEngine> {
        Arc::new(GameEngine::new(
            store,
            EventHub::new(64),
            GameConfig::default(),
        ))
    }

    fn mined_virus(creator: &str, difficulty: u32, memo: Option<&str>) -> VirusSubmission {
        let mined = mine_virus(creator, TS, difficulty, memo, 0, BUDGET).unwrap();
        VirusSubmission {
            creator: creator.to_owned(),
            timestamp: TS,
            nonce: mined.nonce,
            difficulty,
            memo: memo.map(str::to_owned),
            signature: None,
        }
    }

    fn mined_vaccine(creator: &str, target: &Virus) -> VaccineSubmission {
        let mined = mine_vaccine(creator, &target.hash, TS, target.difficulty, 0, BUDGET).unwrap();
        VaccineSubmission {
            creator: creator.to_owned(),
            target: target.hash.clone(),
            timestamp: TS,
            nonce: mined.nonce,
            signature: None,
        }
    }

    #[tokio::test]
    async fn valid_virus_is_stored_under_its_digest() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_over(Arc::clone(&store));

        let created = engine
            .submit_virus(mined_virus("0xA", 3, Some("abc123")))
            .await
            .unwrap();
        let expected = digest_hex(&virus_message(
            "0xA",
            TS,
            created.virus.nonce,
            3,
            Some("abc123"),
        ));
        assert_eq!(created.virus.hash, expected);
        assert!(created.virus.is_active());
        assert_eq!(created.stats.total_viruses_created, 1);
        assert_eq!(created.stats.unique_addresses, 1);
        assert!(store.get_virus_by_hash(&expected).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn insufficient_work_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_over(Arc::clone(&store));

        let submission = VirusSubmission {
            creator: "0xA".into(),
            timestamp: TS,
            nonce: 0,
            difficulty: 10,
            memo: None,
            signature: None,
        };
        let err = engine.submit_virus(submission).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "PoW verification failed. Required difficulty: 10"
        );
        assert_eq!(store.compute_stats().await.unwrap().total_viruses_created, 0);
        assert_eq!(engine.stats().await.total_viruses_created, 0);
    }

    #[tokio::test]
    async fn bad_inputs_are_validation_errors() {
        let engine = engine_over(Arc::new(MemoryStore::new()));

        let mut sub = mined_virus("0xA", 3, None);
        sub.difficulty = 2;
        assert!(matches!(
            engine.submit_virus(sub).await,
            Err(GameError::Validation(_))
        ));

        let mut sub = mined_virus("0xA", 3, None);
        sub.memo = Some("not-hex".into());
        assert!(matches!(
            engine.submit_virus(sub).await,
            Err(GameError::Validation(_))
        ));

        let mut sub = mined_virus("0xA", 3, None);
        sub.creator = "  ".into();
        assert!(matches!(
            engine.submit_virus(sub).await,
            Err(GameError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn same_virus_twice_is_a_conflict() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_over(Arc::clone(&store));
        let sub = mined_virus("0xA", 3, None);

        engine.submit_virus(sub.clone()).await.unwrap();
        let err = engine.submit_virus(sub).await.unwrap_err();
        assert!(matches!(err, GameError::DuplicateHash { kind: "Virus", .. }));
        assert_eq!(store.compute_stats().await.unwrap().total_viruses_created, 1);
        assert_eq!(engine.stats().await.total_viruses_created, 1);
    }

    #[tokio::test]
    async fn vaccine_eliminates_and_broadcasts_stats() {
        let engine = engine_over(Arc::new(MemoryStore::new()));
        let mut rx = engine.hub().subscribe();

        let created = engine.submit_virus(mined_virus("0xA", 3, None)).await.unwrap();
        let eliminated = engine
            .submit_vaccine(mined_vaccine("0xB", &created.virus))
            .await
            .unwrap();

        assert_eq!(eliminated.virus.status, VirusStatus::Eliminated);
        assert_eq!(eliminated.virus.eliminated_by.as_deref(), Some("0xB"));
        assert!(eliminated.vaccine.success);
        assert_eq!(eliminated.vaccine.virus_id, Some(created.virus.id));
        assert_eq!(eliminated.stats.eliminated_viruses, 1);
        assert_eq!(eliminated.stats.active_viruses, 0);
        assert_eq!(eliminated.stats.unique_addresses, 2);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(matches!(first, GameEvent::VirusCreated(_)));
        assert_eq!(first.stats(), &created.stats);
        assert_eq!(second.stats(), &eliminated.stats);

        let status = engine.status().await;
        assert!(status.active_viruses.is_empty());
        assert!(status.stats.is_consistent());
    }

    #[tokio::test]
    async fn unknown_or_eliminated_targets_are_rejected() {
        let engine = engine_over(Arc::new(MemoryStore::new()));

        let missing = VaccineSubmission {
            creator: "0xB".into(),
            target: "000deadbeef".into(),
            timestamp: TS,
            nonce: 1,
            signature: None,
        };
        let err = engine.submit_vaccine(missing).await.unwrap_err();
        assert!(matches!(err, GameError::TargetNotFound(_)));
        assert!(err.to_string().contains("not found"));

        let created = engine.submit_virus(mined_virus("0xA", 3, None)).await.unwrap();
        engine
            .submit_vaccine(mined_vaccine("0xB", &created.virus))
            .await
            .unwrap();
        let err = engine
            .submit_vaccine(mined_vaccine("0xC", &created.virus))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::TargetAlreadyEliminated(_)));
    }

    #[tokio::test]
    async fn vaccine_difficulty_is_inherited_from_target() {
        let engine = engine_over(Arc::new(MemoryStore::new()));
        let created = engine.submit_virus(mined_virus("0xA", 4, None)).await.unwrap();

        // A nonce that only satisfies 3 zeros must fail against a difficulty 4 target.
        let mut nonce = 0;
        let weak = loop {
            let mined =
                mine_vaccine("0xB", &created.virus.hash, TS, 3, nonce, BUDGET).unwrap();
            if !mined.hash.starts_with("0000") {
                break mined;
            }
            nonce = mined.nonce + 1;
        };
        let err = engine
            .submit_vaccine(VaccineSubmission {
                creator: "0xB".into(),
                target: created.virus.hash.clone(),
                timestamp: TS,
                nonce: weak.nonce,
                signature: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::ProofOfWork(_)));
        assert_eq!(engine.stats().await.active_viruses, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_vaccines_have_exactly_one_winner() {
        let engine = engine_over(Arc::new(MemoryStore::new()));
        let created = engine.submit_virus(mined_virus("0xA", 3, None)).await.unwrap();
        let before = engine.stats().await;

        let submissions: Vec<VaccineSubmission> = (0..8)
            .map(|i| mined_vaccine(&format!("0xHealer{i}"), &created.virus))
            .collect();

        let mut handles = Vec::new();
        for submission in submissions {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine.submit_vaccine(submission).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(err) => assert!(matches!(err, GameError::TargetAlreadyEliminated(_))),
            }
        }
        assert_eq!(winners, 1);

        let after = engine.stats().await;
        assert_eq!(after.active_viruses, before.active_viruses - 1);
        assert_eq!(after.successful_vaccines, 1);
        assert!(after.is_consistent());
    }

    #[tokio::test]
    async fn load_seeds_cache_from_existing_records() {
        let store = Arc::new(MemoryStore::new());
        let first = engine_over(Arc::clone(&store));
        let a = first.submit_virus(mined_virus("0xA", 3, None)).await.unwrap();
        first.submit_virus(mined_virus("0xB", 3, None)).await.unwrap();
        first
            .submit_vaccine(mined_vaccine("0xC", &a.virus))
            .await
            .unwrap();

        let reloaded = GameEngine::load(store.clone(), EventHub::new(4), GameConfig::default())
            .await
            .unwrap();
        assert_eq!(reloaded.stats().await, first.stats().await);
        assert_eq!(
            reloaded.stats().await,
            store.compute_stats().await.unwrap()
        );
        assert_eq!(reloaded.status().await.active_viruses.len(), 1);
    }

    #[tokio::test]
    async fn history_limit_is_clamped() {
        let engine = engine_over(Arc::new(MemoryStore::new()));
        for creator in ["0xA", "0xB", "0xC"] {
            engine.submit_virus(mined_virus(creator, 3, None)).await.unwrap();
        }

        assert_eq!(engine.history_limit(None), 100);
        assert_eq!(engine.history_limit(Some(0)), 1);
        assert_eq!(engine.history_limit(Some(5000)), 1000);

        assert_eq!(engine.history(Some(0)).await.unwrap().viruses.len(), 1);
        assert_eq!(engine.history(None).await.unwrap().viruses.len(), 3);
    }

    #[tokio::test]
    async fn store_outage_is_storage_unavailable() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_over(Arc::clone(&store));
        let sub = mined_virus("0xA", 3, None);

        store.set_offline(true);
        let err = engine.submit_virus(sub).await.unwrap_err();
        assert!(matches!(err, GameError::StorageUnavailable(_)));
        assert!(!err.is_client_error());
        assert_eq!(engine.stats().await.total_viruses_created, 0);
    }

    #[tokio::test]
    async fn timestamp_window_guard_rejects_stale_submissions() {
        let config = GameConfig {
            timestamp_tolerance_secs: Some(3600),
            ..GameConfig::default()
        };
        let engine = Arc::new(GameEngine::new(
            Arc::new(MemoryStore::new()),
            EventHub::new(4),
            config,
        ));
        // TS is far in the past relative to the wall clock.
        let err = engine
            .submit_virus(mined_virus("0xA", 3, None))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Validation(msg) if msg.contains("Timestamp")));
    }

    #[tokio::test]
    async fn agent_stats_require_an_address() {
        let engine = engine_over(Arc::new(MemoryStore::new()));
        assert!(matches!(
            engine.agent_stats(" ").await,
            Err(GameError::Validation(_))
        ));
        let created = engine.submit_virus(mined_virus("0xA", 3, None)).await.unwrap();
        let agent = engine.agent_stats("0xA").await.unwrap();
        assert_eq!(agent.viruses_created, 1);
        assert_eq!(agent.total_difficulty_created, u64::from(created.virus.difficulty));
    }
}
