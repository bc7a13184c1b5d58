//! Per-tier inclusion rules over classified jobs.

use joby_core::Seniority;

use crate::ordering::sort_by_recency;
use crate::types::{ClassifiedJob, SourceResultSet};

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Whether a classified job belongs in a search for `target`.
///
/// A missing level passes a senior search and fails every other tier.
pub fn matches(job: &ClassifiedJob, target: Seniority) -> bool {
    let level = job.job_level.as_deref().map(str::trim).filter(|l| !l.is_empty());
    match target {
        Seniority::Junior => {
            level.is_some_and(|l| l.eq_ignore_ascii_case("entry level"))
                || contains_ci(level, "junior")
        }
        Seniority::Intern => contains_ci(job.job_type(), "intern") || contains_ci(level, "intern"),
        Seniority::Senior => level.is_none() || contains_ci(level, "senior"),
        Seniority::Chief => contains_ci(level, "chief"),
    }
}

/// Drop non-matching jobs and re-sort the survivors newest first.
pub fn filter(jobs: SourceResultSet, target: Seniority) -> SourceResultSet {
    let mut kept: SourceResultSet = jobs.into_iter().filter(|j| matches(j, target)).collect();
    sort_by_recency(&mut kept);
    kept
}
