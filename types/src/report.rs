//! The merged health report.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::{CollectionStats, InProgressStats, LogStats};

/// Point-in-time health report for one database.
///
/// `collections` holds only collections with at least one queued token,
/// keyed and ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    pub collections: BTreeMap<String, CollectionStats>,
    pub in_progress: InProgressStats,
    pub log: LogStats,
}

impl Report {
    /// Sum of queued tokens across all reported collections.
    pub fn total_queued(&self) -> u64 {
        self.collections.values().map(|c| c.total_queued).sum()
    }
}
