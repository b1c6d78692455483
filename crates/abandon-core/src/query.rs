//! Paged listings and search.
//!
//! Reads go straight to the record store; only the page parameters are
//! normalised here. `page < 1` becomes 1, a missing limit becomes
//! `default_page_size`, and limits are clamped to `[1, max_page_size]`.

use std::sync::Arc;

use abandon_db::RecordStore;
use abandon_types::{Page, Vaccine, Virus};

use crate::config::GameConfig;
use crate::error::GameError;

/// Read-only view over the record store.
#[derive(Clone)]
pub struct Queries {
    store: Arc<dyn RecordStore>,
    config: GameConfig,
}

impl std::fmt::Debug for Queries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queries")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Queries {
    /// Create a façade over `store`.
    pub const fn new(store: Arc<dyn RecordStore>, config: GameConfig) -> Self {
        Self { store, config }
    }

    /// Normalise `(page, limit)` from raw query parameters.
    pub fn page_params(&self, page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.config.default_page_size)
            .max(1)
            .min(self.config.max_page_size.max(1));
        (page, limit)
    }

    /// Active viruses, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::StorageUnavailable`] on store failure.
    pub async fn list_viruses(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Page<Virus>, GameError> {
        let (page, limit) = self.page_params(page, limit);
        Ok(self.store.list_viruses_paginated(page, limit).await?)
    }

    /// Vaccines, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::StorageUnavailable`] on store failure.
    pub async fn list_vaccines(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Page<Vaccine>, GameError> {
        let (page, limit) = self.page_params(page, limit);
        Ok(self.store.list_vaccines_paginated(page, limit).await?)
    }

    /// Viruses whose hash or creator equals the trimmed query.
    ///
    /// # Errors
    ///
    /// [`GameError::Validation`] for an empty query,
    /// [`GameError::StorageUnavailable`] on store failure.
    pub async fn search_viruses(&self, query: &str) -> Result<Vec<Virus>, GameError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GameError::Validation("Missing query parameter: q".into()));
        }
        Ok(self.store.search_viruses(query).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use abandon_db::MemoryStore;
    use abandon_types::{VirusId, VirusStatus};

    use super::*;

    fn queries(store: Arc<MemoryStore>) -> Queries {
        Queries::new(store, GameConfig::default())
    }

    async fn seed(store: &MemoryStore, n: i64) {
        for i in 0..n {
            store
                .insert_virus(&Virus {
                    id: VirusId::new(),
                    hash: format!("000{i:04}"),
                    created_by: format!("0x{i}"),
                    created_at: i,
                    timestamp: i,
                    nonce: 0,
                    difficulty: 3,
                    memo: None,
                    status: VirusStatus::Active,
                    eliminated_by: None,
                    eliminated_at: None,
                })
                .await
                .unwrap();
        }
    }

    #[test]
    fn page_params_are_normalised() {
        let q = queries(Arc::new(MemoryStore::new()));
        assert_eq!(q.page_params(None, None), (1, 30));
        assert_eq!(q.page_params(Some(0), Some(0)), (1, 1));
        assert_eq!(q.page_params(Some(4), Some(500)), (4, 100));
    }

    #[tokio::test]
    async fn second_page_of_five() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, 5).await;
        let page = queries(store).list_viruses(Some(2), Some(3)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.pagination.page, 2);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, 2).await;
        let page = queries(store).list_viruses(Some(9), None).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[tokio::test]
    async fn empty_vaccine_listing_has_zero_pages() {
        let page = queries(Arc::new(MemoryStore::new()))
            .list_vaccines(None, None)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
    }

    #[tokio::test]
    async fn search_trims_and_requires_query() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, 3).await;
        let q = queries(store);
        assert_eq!(q.search_viruses("  0x1 ").await.unwrap().len(), 1);
        assert!(matches!(
            q.search_viruses("   ").await,
            Err(GameError::Validation(_))
        ));
    }
}
