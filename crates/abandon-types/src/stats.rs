//! Aggregate statistics and pagination envelopes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Point-in-time aggregate view over all records.
///
/// Always equal to a pure aggregation over the current virus and vaccine
/// sets; `total_viruses_created == active_viruses + eliminated_viruses`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameStats {
    /// Every virus ever created.
    #[ts(type = "number")]
    pub total_viruses_created: u64,
    /// Viruses currently active.
    #[ts(type = "number")]
    pub active_viruses: u64,
    /// Viruses that were eliminated.
    #[ts(type = "number")]
    pub eliminated_viruses: u64,
    /// Every vaccine recorded.
    #[ts(type = "number")]
    pub total_vaccines_created: u64,
    /// Vaccines that eliminated their target.
    #[ts(type = "number")]
    pub successful_vaccines: u64,
    /// Vaccines recorded without eliminating anything.
    #[ts(type = "number")]
    pub failed_vaccines: u64,
    /// Distinct identities across virus creators, vaccine creators and eliminators.
    #[ts(type = "number")]
    pub unique_addresses: u64,
}

impl GameStats {
    /// Check the internal accounting identities.
    pub const fn is_consistent(&self) -> bool {
        self.total_viruses_created == self.active_viruses.saturating_add(self.eliminated_viruses)
            && self.total_vaccines_created
                == self.successful_vaccines.saturating_add(self.failed_vaccines)
    }
}

/// Per-identity participation summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AgentStats {
    /// The identity these numbers belong to.
    pub address: String,
    /// Viruses created by this identity.
    #[ts(type = "number")]
    pub viruses_created: u64,
    /// Vaccines created by this identity.
    #[ts(type = "number")]
    pub vaccines_created: u64,
    /// Vaccines by this identity that eliminated a virus.
    #[ts(type = "number")]
    pub successful_vaccines: u64,
    /// Sum of difficulties over the viruses this identity created.
    #[ts(type = "number")]
    pub total_difficulty_created: u64,
    /// Sum of difficulties over the viruses this identity eliminated.
    #[ts(type = "number")]
    pub total_difficulty_eliminated: u64,
}

/// Pagination metadata returned with every paged listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Pagination {
    /// 1-based page number.
    #[ts(type = "number")]
    pub page: u64,
    /// Page size.
    #[ts(type = "number")]
    pub limit: u64,
    /// Total matching records.
    #[ts(type = "number")]
    pub total: u64,
    /// `ceil(total / limit)`.
    #[ts(type = "number")]
    pub total_pages: u64,
}

impl Pagination {
    /// Build pagination metadata, computing the page count.
    pub const fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Row offset of the first record on this page.
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// A single page of records plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records on this page, newest first.
    pub items: Vec<T>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(2, 3, 5).total_pages, 2);
        assert_eq!(Pagination::new(1, 30, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Pagination::new(1, 30, 100).offset(), 0);
        assert_eq!(Pagination::new(3, 30, 100).offset(), 60);
    }

    #[test]
    fn default_stats_are_consistent() {
        let mut stats = GameStats::default();
        assert!(stats.is_consistent());
        stats.total_viruses_created = 2;
        stats.active_viruses = 1;
        assert!(!stats.is_consistent());
        stats.eliminated_viruses = 1;
        assert!(stats.is_consistent());
    }
}
