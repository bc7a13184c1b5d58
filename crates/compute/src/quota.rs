//! Per-source quota merge with backfill.
//!
//! Every source gets `target_per_source` slots. When a source comes up short,
//! the shortfall is offered to every other source, so a sibling may deliver
//! up to `target_per_source + shortfall`. The union is then re-sorted newest
//! first and cut to `total_target`.

use std::collections::BTreeMap;

use joby_core::SourceId;

use crate::ordering::sort_by_recency;
use crate::types::{MergedResultSet, SourceResultSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaMerger {
    pub target_per_source: usize,
    pub total_target: usize,
}

impl Default for QuotaMerger {
    fn default() -> Self {
        Self {
            target_per_source: 5,
            total_target: 10,
        }
    }
}

impl QuotaMerger {
    pub fn new(target_per_source: usize, total_target: usize) -> Self {
        Self {
            target_per_source,
            total_target,
        }
    }

    /// How many jobs each source may contribute, given each source's size.
    pub fn allowances(&self, sizes: &BTreeMap<SourceId, usize>) -> BTreeMap<SourceId, usize> {
        let shortfall = |len: usize| self.target_per_source.saturating_sub(len);
        let total_shortfall = sizes
            .values()
            .map(|len| shortfall(*len))
            .fold(0usize, usize::saturating_add);

        sizes
            .iter()
            .map(|(id, len)| {
                let from_others = total_shortfall.saturating_sub(shortfall(*len));
                let allowance = self.target_per_source.saturating_add(from_others);
                (*id, allowance.min(*len))
            })
            .collect()
    }

    /// Merge per-source sets (each already newest first). Deterministic: the
    /// same input always yields the same output.
    pub fn merge(&self, per_source: &BTreeMap<SourceId, SourceResultSet>) -> MergedResultSet {
        let sizes: BTreeMap<SourceId, usize> =
            per_source.iter().map(|(id, jobs)| (*id, jobs.len())).collect();
        let allowances = self.allowances(&sizes);

        let mut jobs = Vec::with_capacity(allowances.values().sum());
        for (id, set) in per_source {
            let take = allowances.get(id).copied().unwrap_or(0);
            jobs.extend(set.iter().take(take).cloned());
        }

        sort_by_recency(&mut jobs);
        jobs.truncate(self.total_target);

        MergedResultSet { jobs }
    }
}
