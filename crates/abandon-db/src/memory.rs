//! In-process record store.
//!
//! Used when no database URL is configured and throughout the test suites.
//! All mutations take a single write guard, so the check-and-eliminate in
//! [`MemoryStore::insert_vaccine_and_eliminate`] is atomic with respect to
//! every other caller.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use abandon_types::{AgentStats, GameStats, Page, Pagination, Vaccine, Virus};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{RecordStore, newest_vaccine_first, newest_virus_first};

#[derive(Debug, Default)]
struct Records {
    viruses: HashMap<String, Virus>,
    vaccines: HashMap<String, Vaccine>,
}

impl Records {
    fn viruses_newest_first(&self) -> Vec<&Virus> {
        let mut all: Vec<&Virus> = self.viruses.values().collect();
        all.sort_by(|a, b| newest_virus_first(a, b));
        all
    }

    fn vaccines_newest_first(&self) -> Vec<&Vaccine> {
        let mut all: Vec<&Vaccine> = self.vaccines.values().collect();
        all.sort_by(|a, b| newest_vaccine_first(a, b));
        all
    }
}

/// A [`RecordStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    /// until switched back. Lets callers exercise outage handling.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

fn page_of<T: Clone>(sorted: &[&T], page: u64, limit: u64) -> Page<T> {
    let pagination = Pagination::new(page, limit, count(sorted.len()));
    let items = sorted
        .iter()
        .skip(to_usize(pagination.offset()))
        .take(to_usize(limit))
        .map(|item| (*item).clone())
        .collect();
    Page { items, pagination }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_virus(&self, virus: &Virus) -> Result<(), StoreError> {
        self.check_online()?;
        let mut records = self.records.write().await;
        if records.viruses.contains_key(&virus.hash) {
            return Err(StoreError::DuplicateHash(virus.hash.clone()));
        }
        records.viruses.insert(virus.hash.clone(), virus.clone());
        Ok(())
    }

    async fn insert_vaccine_and_eliminate(
        &self,
        vaccine: &Vaccine,
        target_hash: &str,
    ) -> Result<Virus, StoreError> {
        self.check_online()?;
        let mut records = self.records.write().await;
        // Target state before vaccine hash, same order as `PostgresStore`.
        if !records.viruses.get(target_hash).is_some_and(Virus::is_active) {
            return Err(StoreError::TargetNotEliminable(target_hash.to_owned()));
        }
        if records.vaccines.contains_key(&vaccine.hash) {
            return Err(StoreError::DuplicateHash(vaccine.hash.clone()));
        }

        let Some(virus) = records.viruses.get_mut(target_hash) else {
            return Err(StoreError::TargetNotEliminable(target_hash.to_owned()));
        };
        if !virus.eliminate(&vaccine.created_by, vaccine.created_at) {
            return Err(StoreError::TargetNotEliminable(target_hash.to_owned()));
        }
        let updated = virus.clone();

        let mut stored = vaccine.clone();
        stored.success = true;
        stored.virus_id = Some(updated.id);
        records.vaccines.insert(stored.hash.clone(), stored);
        Ok(updated)
    }

    async fn get_virus_by_hash(&self, hash: &str) -> Result<Option<Virus>, StoreError> {
        self.check_online()?;
        Ok(self.records.read().await.viruses.get(hash).cloned())
    }

    async fn list_active_viruses(&self) -> Result<Vec<Virus>, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        Ok(records
            .viruses_newest_first()
            .into_iter()
            .filter(|v| v.is_active())
            .cloned()
            .collect())
    }

    async fn list_viruses_paginated(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<Page<Virus>, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        let active: Vec<&Virus> = records
            .viruses_newest_first()
            .into_iter()
            .filter(|v| v.is_active())
            .collect();
        Ok(page_of(&active, page, limit))
    }

    async fn list_vaccines_paginated(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<Page<Vaccine>, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        Ok(page_of(&records.vaccines_newest_first(), page, limit))
    }

    async fn recent_viruses(&self, limit: u64) -> Result<Vec<Virus>, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        Ok(records
            .viruses_newest_first()
            .into_iter()
            .take(to_usize(limit))
            .cloned()
            .collect())
    }

    async fn recent_vaccines(&self, limit: u64) -> Result<Vec<Vaccine>, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        Ok(records
            .vaccines_newest_first()
            .into_iter()
            .take(to_usize(limit))
            .cloned()
            .collect())
    }

    async fn search_viruses(&self, query: &str) -> Result<Vec<Virus>, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        Ok(records
            .viruses_newest_first()
            .into_iter()
            .filter(|v| v.hash == query || v.created_by == query)
            .cloned()
            .collect())
    }

    async fn compute_stats(&self) -> Result<GameStats, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        let active = count(records.viruses.values().filter(|v| v.is_active()).count());
        let total_viruses = count(records.viruses.len());
        let successful = count(records.vaccines.values().filter(|v| v.success).count());
        let total_vaccines = count(records.vaccines.len());
        Ok(GameStats {
            total_viruses_created: total_viruses,
            active_viruses: active,
            eliminated_viruses: total_viruses.saturating_sub(active),
            total_vaccines_created: total_vaccines,
            successful_vaccines: successful,
            failed_vaccines: total_vaccines.saturating_sub(successful),
            unique_addresses: count(participants_of(&records).len()),
        })
    }

    async fn participants(&self) -> Result<HashSet<String>, StoreError> {
        self.check_online()?;
        Ok(participants_of(&*self.records.read().await))
    }

    async fn agent_stats(&self, address: &str) -> Result<AgentStats, StoreError> {
        self.check_online()?;
        let records = self.records.read().await;
        let mut agent = AgentStats {
            address: address.to_owned(),
            ..AgentStats::default()
        };
        for virus in records.viruses.values() {
            if virus.created_by == address {
                agent.viruses_created = agent.viruses_created.saturating_add(1);
                agent.total_difficulty_created = agent
                    .total_difficulty_created
                    .saturating_add(u64::from(virus.difficulty));
            }
            if virus.eliminated_by.as_deref() == Some(address) {
                agent.total_difficulty_eliminated = agent
                    .total_difficulty_eliminated
                    .saturating_add(u64::from(virus.difficulty));
            }
        }
        for vaccine in records.vaccines.values().filter(|v| v.created_by == address) {
            agent.vaccines_created = agent.vaccines_created.saturating_add(1);
            if vaccine.success {
                agent.successful_vaccines = agent.successful_vaccines.saturating_add(1);
            }
        }
        Ok(agent)
    }
}

fn participants_of(records: &Records) -> HashSet<String> {
    let mut seen = HashSet::new();
    for virus in records.viruses.values() {
        seen.insert(virus.created_by.clone());
        if let Some(by) = &virus.eliminated_by {
            seen.insert(by.clone());
        }
    }
    for vaccine in records.vaccines.values() {
        seen.insert(vaccine.created_by.clone());
    }
    seen
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::sync::Arc;

    use abandon_types::{VaccineId, VirusId, VirusStatus};

    use super::*;

    fn virus(hash: &str, by: &str, created_at: i64) -> Virus {
        Virus {
            id: VirusId::new(),
            hash: hash.to_owned(),
            created_by: by.to_owned(),
            created_at,
            timestamp: created_at,
            nonce: 1,
            difficulty: 4,
            memo: None,
            status: VirusStatus::Active,
            eliminated_by: None,
            eliminated_at: None,
        }
    }

    fn vaccine(hash: &str, by: &str, target: &str, created_at: i64) -> Vaccine {
        Vaccine {
            id: VaccineId::new(),
            hash: hash.to_owned(),
            created_by: by.to_owned(),
            created_at,
            target: target.to_owned(),
            timestamp: created_at,
            nonce: 9,
            success: false,
            virus_id: None,
        }
    }

    #[tokio::test]
    async fn duplicate_virus_hash_is_rejected() {
        let store = MemoryStore::new();
        store.insert_virus(&virus("000a", "0xA", 1)).await.unwrap();
        let err = store.insert_virus(&virus("000a", "0xB", 2)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateHash(_)));
        assert_eq!(store.compute_stats().await.unwrap().total_viruses_created, 1);
    }

    #[tokio::test]
    async fn eliminate_marks_virus_and_stores_successful_vaccine() {
        let store = MemoryStore::new();
        store.insert_virus(&virus("000a", "0xA", 1)).await.unwrap();

        let updated = store
            .insert_vaccine_and_eliminate(&vaccine("000v", "0xB", "000a", 5), "000a")
            .await
            .unwrap();
        assert_eq!(updated.status, VirusStatus::Eliminated);
        assert_eq!(updated.eliminated_by.as_deref(), Some("0xB"));
        assert_eq!(updated.eliminated_at, Some(5));

        let vaccines = store.recent_vaccines(10).await.unwrap();
        assert!(vaccines[0].success);
        assert_eq!(vaccines[0].virus_id, Some(updated.id));
    }

    #[tokio::test]
    async fn eliminated_or_missing_target_writes_nothing() {
        let store = MemoryStore::new();
        store.insert_virus(&virus("000a", "0xA", 1)).await.unwrap();
        store
            .insert_vaccine_and_eliminate(&vaccine("000v", "0xB", "000a", 5), "000a")
            .await
            .unwrap();

        let err = store
            .insert_vaccine_and_eliminate(&vaccine("000w", "0xC", "000a", 6), "000a")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TargetNotEliminable(_)));

        let err = store
            .insert_vaccine_and_eliminate(&vaccine("000x", "0xC", "000z", 6), "000z")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TargetNotEliminable(_)));

        let stats = store.compute_stats().await.unwrap();
        assert_eq!(stats.total_vaccines_created, 1);
        assert!(!store.participants().await.unwrap().contains("0xC"));
    }

    #[tokio::test]
    async fn repeated_vaccine_against_eliminated_target_is_not_eliminable() {
        let store = MemoryStore::new();
        store.insert_virus(&virus("000a", "0xA", 1)).await.unwrap();
        let shot = vaccine("000v", "0xB", "000a", 5);

        store.insert_vaccine_and_eliminate(&shot, "000a").await.unwrap();
        let err = store
            .insert_vaccine_and_eliminate(&shot, "000a")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TargetNotEliminable(h) if h == "000a"));
        assert_eq!(store.compute_stats().await.unwrap().total_vaccines_created, 1);
    }

    #[tokio::test]
    async fn duplicate_vaccine_hash_leaves_active_target_untouched() {
        let store = MemoryStore::new();
        store.insert_virus(&virus("000a", "0xA", 1)).await.unwrap();
        store.insert_virus(&virus("000b", "0xA", 2)).await.unwrap();
        store
            .insert_vaccine_and_eliminate(&vaccine("000v", "0xB", "000a", 5), "000a")
            .await
            .unwrap();

        let err = store
            .insert_vaccine_and_eliminate(&vaccine("000v", "0xC", "000b", 6), "000b")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateHash(h) if h == "000v"));
        let untouched = store.get_virus_by_hash("000b").await.unwrap().unwrap();
        assert!(untouched.is_active());
        assert_eq!(untouched.eliminated_by, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_eliminations_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        store.insert_virus(&virus("000a", "0xA", 1)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let v = vaccine(&format!("000v{i}"), &format!("0xH{i}"), "000a", 10);
                store.insert_vaccine_and_eliminate(&v, "000a").await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(err) => assert!(matches!(err, StoreError::TargetNotEliminable(_))),
            }
        }
        assert_eq!(winners, 1);
        let stats = store.compute_stats().await.unwrap();
        assert_eq!(stats.successful_vaccines, 1);
        assert_eq!(stats.eliminated_viruses, 1);
    }

    #[tokio::test]
    async fn pages_are_newest_first_and_active_only() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_virus(&virus(&format!("000{i}"), "0xA", i))
                .await
                .unwrap();
        }

        let page = store.list_viruses_paginated(2, 3).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.items[0].hash, "0001");
        assert_eq!(page.items[1].hash, "0000");

        store
            .insert_vaccine_and_eliminate(&vaccine("000v", "0xB", "0004", 9), "0004")
            .await
            .unwrap();
        let page = store.list_viruses_paginated(1, 30).await.unwrap();
        assert_eq!(page.pagination.total, 4);
        assert!(page.items.iter().all(Virus::is_active));
        assert_eq!(store.recent_viruses(100).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn search_matches_hash_or_creator_exactly() {
        let store = MemoryStore::new();
        store.insert_virus(&virus("000a", "0xA", 1)).await.unwrap();
        store.insert_virus(&virus("000b", "0xB", 2)).await.unwrap();

        assert_eq!(store.search_viruses("000a").await.unwrap().len(), 1);
        assert_eq!(store.search_viruses("0xB").await.unwrap()[0].hash, "000b");
        assert!(store.search_viruses("000").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_and_agents_aggregate_all_roles() {
        let store = MemoryStore::new();
        store.insert_virus(&virus("000a", "0xA", 1)).await.unwrap();
        store.insert_virus(&virus("000b", "0xA", 2)).await.unwrap();
        store
            .insert_vaccine_and_eliminate(&vaccine("000v", "0xB", "000a", 3), "000a")
            .await
            .unwrap();

        let stats = store.compute_stats().await.unwrap();
        assert_eq!(stats.total_viruses_created, 2);
        assert_eq!(stats.active_viruses, 1);
        assert_eq!(stats.unique_addresses, 2);
        assert!(stats.is_consistent());

        let creator = store.agent_stats("0xA").await.unwrap();
        assert_eq!(creator.viruses_created, 2);
        assert_eq!(creator.total_difficulty_created, 8);

        let healer = store.agent_stats("0xB").await.unwrap();
        assert_eq!(healer.successful_vaccines, 1);
        assert_eq!(healer.total_difficulty_eliminated, 4);

        let nobody = store.agent_stats("0xNobody").await.unwrap();
        assert_eq!(nobody.viruses_created, 0);
        assert_eq!(nobody.address, "0xNobody");
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.compute_stats().await.unwrap_err();
        assert!(err.is_retryable());
        store.set_offline(false);
        assert!(store.compute_stats().await.is_ok());
    }
}
