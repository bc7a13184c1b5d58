use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use joby_core::{RawJobRecord, SourceId};

/// A record paired with its resolved seniority level.
///
/// The source record is kept as delivered; the resolved level lives beside
/// it and only replaces `job_level` when the job is turned back into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedJob {
    pub source: SourceId,
    pub record: RawJobRecord,
    /// Source-supplied level, or the inferred tier, or `None` when unresolved.
    pub job_level: Option<String>,
}

impl ClassifiedJob {
    pub fn posted(&self) -> Option<NaiveDate> {
        self.record.date_posted
    }

    pub fn job_type(&self) -> Option<&str> {
        self.record.job_type.as_deref()
    }

    pub fn into_record(self) -> RawJobRecord {
        RawJobRecord {
            job_level: self.job_level,
            ..self.record
        }
    }
}

/// One source's classified results, most recent first.
pub type SourceResultSet = Vec<ClassifiedJob>;

/// Final merged jobs, bounded by the total target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedResultSet {
    pub jobs: Vec<ClassifiedJob>,
}

impl MergedResultSet {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// How many merged jobs came from each source; listed sources start at zero.
    pub fn counts_by_source(&self, sources: &[SourceId]) -> BTreeMap<SourceId, usize> {
        let mut counts: BTreeMap<SourceId, usize> = sources.iter().map(|id| (*id, 0)).collect();
        for job in &self.jobs {
            *counts.entry(job.source).or_insert(0) += 1;
        }
        counts
    }
}

/// Result of a full search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub total: usize,
    pub per_source_counts: BTreeMap<SourceId, usize>,
    pub jobs: Vec<RawJobRecord>,
}

impl SearchOutcome {
    pub fn empty(sources: &[SourceId]) -> Self {
        Self {
            total: 0,
            per_source_counts: sources.iter().map(|id| (*id, 0)).collect(),
            jobs: Vec::new(),
        }
    }
}
