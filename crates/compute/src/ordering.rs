use std::cmp::Ordering;

use crate::types::ClassifiedJob;

/// Newest first. Undated jobs go after dated ones and keep arrival order.
pub fn by_recency(a: &ClassifiedJob, b: &ClassifiedJob) -> Ordering {
    match (a.posted(), b.posted()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by [`by_recency`]; equal dates keep their relative order.
pub fn sort_by_recency(jobs: &mut [ClassifiedJob]) {
    jobs.sort_by(by_recency);
}
