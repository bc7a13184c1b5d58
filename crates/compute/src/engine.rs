//! Search orchestration: fan out to every source, classify and filter each
//! result set on its own, then merge under the quota policy.
//!
//! A source that errors, times out or panics contributes an empty set. The
//! engine waits for every source before merging.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use joby_connector::{JobSource, SourceError};
use joby_core::config::SearchConfig;
use joby_core::{SearchRequest, Seniority, SourceId};

use crate::level::classify;
use crate::quota::QuotaMerger;
use crate::seniority;
use crate::types::{SearchOutcome, SourceResultSet};

pub struct SearchEngine {
    sources: Vec<Arc<dyn JobSource>>,
    settings: SearchConfig,
    merger: QuotaMerger,
    /// Bounds concurrent source fetches across all searches.
    permits: Arc<Semaphore>,
}

impl SearchEngine {
    pub fn new(sources: Vec<Arc<dyn JobSource>>, settings: SearchConfig) -> Self {
        let merger = QuotaMerger::new(settings.target_per_source, settings.total_target);
        let permits = Arc::new(Semaphore::new(settings.max_concurrency.max(1)));
        Self {
            sources,
            settings,
            merger,
            permits,
        }
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    pub fn settings(&self) -> &SearchConfig {
        &self.settings
    }

    /// Run one search. Never fails: source problems only shrink the result.
    pub async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let start = Instant::now();
        let source_ids = self.source_ids();

        info!(
            title = %request.title,
            seniority = %request.seniority,
            location = %request.location,
            sources = ?source_ids,
            "starting job search"
        );

        let per_source = self.fan_out(request).await;

        let merged = self.merger.merge(&per_source);
        let per_source_counts = merged.counts_by_source(&source_ids);
        let jobs: Vec<_> = merged.jobs.into_iter().map(|j| j.into_record()).collect();

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            total = jobs.len(),
            counts = ?per_source_counts,
            elapsed_ms,
            "job search complete"
        );

        SearchOutcome {
            total: jobs.len(),
            per_source_counts,
            jobs,
        }
    }

    /// One task per source; every slot starts empty and is only filled by a
    /// successful task.
    async fn fan_out(&self, request: &SearchRequest) -> BTreeMap<SourceId, SourceResultSet> {
        let mut slots: BTreeMap<SourceId, SourceResultSet> =
            self.sources.iter().map(|s| (s.id(), Vec::new())).collect();

        let mut tasks = JoinSet::new();
        for source in &self.sources {
            let source = source.clone();
            let permits = self.permits.clone();
            let request = request.clone();
            let results_wanted = self.settings.results_wanted;
            let timeout = self.settings.source_timeout();

            tasks.spawn(async move {
                let id = source.id();
                let result = run_source(source, permits, &request, results_wanted, timeout).await;
                (id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(set))) => {
                    slots.insert(id, set);
                }
                Ok((id, Err(e))) => {
                    warn!(source = %id, error = %e, "source failed, treating as empty");
                }
                Err(e) => {
                    warn!(error = %e, "source task aborted, treating as empty");
                }
            }
        }

        slots
    }
}

/// Fetch, classify and filter one source's results.
async fn run_source(
    source: Arc<dyn JobSource>,
    permits: Arc<Semaphore>,
    request: &SearchRequest,
    results_wanted: u32,
    timeout: Duration,
) -> Result<SourceResultSet, SourceError> {
    let id = source.id();
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| SourceError::Aborted(e.to_string()))?;

    let query = source.query_for(request, results_wanted);
    let started = Instant::now();
    let rows = tokio::time::timeout(timeout, source.fetch(&query))
        .await
        .map_err(|_| SourceError::Timeout(timeout))??;

    let fetched = rows.len();
    let kept = prepare(id, rows, request.seniority);

    debug!(
        source = %id,
        fetched,
        kept = kept.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "source finished"
    );

    Ok(kept)
}

/// Classify every row against the requested tier, then apply the tier filter.
pub fn prepare(
    source: SourceId,
    rows: Vec<joby_core::RawJobRecord>,
    target: Seniority,
) -> SourceResultSet {
    let classified = rows
        .into_iter()
        .map(|record| classify(source, record, target))
        .collect();
    seniority::filter(classified, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration as Days, NaiveDate};
    use joby_connector::SourceQuery;
    use joby_core::{JobScope, RawJobRecord};

    enum Behavior {
        Rows(Vec<RawJobRecord>),
        Fail,
        Hang,
        Panic,
    }

    struct FakeSource {
        id: SourceId,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
        seen: std::sync::Mutex<Vec<SourceQuery>>,
    }

    impl FakeSource {
        fn new(id: SourceId, behavior: Behavior) -> Self {
            Self {
                id,
                behavior,
                calls: Arc::new(AtomicUsize::new(0)),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JobSource for FakeSource {
        fn id(&self) -> SourceId {
            self.id
        }

        async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawJobRecord>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(query.clone());
            match &self.behavior {
                Behavior::Rows(rows) => Ok(rows.clone()),
                Behavior::Fail => Err(SourceError::Decode("boom".into())),
                Behavior::Hang => {
                    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
                Behavior::Panic => panic!("adapter blew up"),
            }
        }
    }

    fn rows(prefix: &str, n: usize, level: Option<&str>) -> Vec<RawJobRecord> {
        let newest = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        (0..n)
            .map(|i| RawJobRecord {
                title: Some(format!("{prefix} {i}")),
                job_level: level.map(String::from),
                date_posted: Some(newest - Days::days(i as i64)),
                ..Default::default()
            })
            .collect()
    }

    fn request(seniority: Seniority) -> SearchRequest {
        SearchRequest {
            title: "Backend Engineer".into(),
            seniority,
            country: "Israel".into(),
            location: "Tel Aviv".into(),
            distance: 0,
            job_scope: JobScope::Fulltime,
            days_back: 1,
        }
    }

    fn engine(sources: Vec<Arc<dyn JobSource>>) -> SearchEngine {
        SearchEngine::new(sources, SearchConfig::default())
    }

    #[tokio::test]
    async fn merges_filtered_results_from_all_sources() {
        let indeed = Arc::new(FakeSource::new(
            SourceId::Indeed,
            Behavior::Rows(rows("junior dev", 8, None)),
        ));
        let linkedin = Arc::new(FakeSource::new(
            SourceId::LinkedIn,
            Behavior::Rows(rows("dev", 8, Some("entry level"))),
        ));
        let engine = engine(vec![indeed.clone(), linkedin.clone()]);

        let outcome = engine.search(&request(Seniority::Junior)).await;

        assert_eq!(outcome.total, 10);
        assert_eq!(outcome.per_source_counts[&SourceId::Indeed], 5);
        assert_eq!(outcome.per_source_counts[&SourceId::LinkedIn], 5);
        // inferred level is written into the outgoing record
        let inferred = outcome
            .jobs
            .iter()
            .find(|j| j.title.as_deref().is_some_and(|t| t.starts_with("junior dev")))
            .unwrap();
        assert_eq!(inferred.job_level.as_deref(), Some("junior"));

        let indeed_query = indeed.seen.lock().unwrap()[0].clone();
        assert_eq!(indeed_query.search_term, "junior Backend Engineer");
        assert_eq!(indeed_query.results_wanted, 50);
        assert_eq!(indeed_query.hours_old, 24);
    }

    #[tokio::test]
    async fn failing_source_does_not_block_sibling() {
        let engine = engine(vec![
            Arc::new(FakeSource::new(SourceId::Indeed, Behavior::Fail)),
            Arc::new(FakeSource::new(
                SourceId::LinkedIn,
                Behavior::Rows(rows("platform", 12, Some("Mid-Senior level"))),
            )),
        ]);

        let outcome = engine.search(&request(Seniority::Senior)).await;

        assert_eq!(outcome.per_source_counts[&SourceId::Indeed], 0);
        assert_eq!(outcome.per_source_counts[&SourceId::LinkedIn], 10);
        assert_eq!(outcome.total, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_source_times_out_to_empty() {
        let engine = engine(vec![
            Arc::new(FakeSource::new(SourceId::Indeed, Behavior::Hang)),
            Arc::new(FakeSource::new(
                SourceId::LinkedIn,
                Behavior::Rows(rows("lead", 3, Some("senior"))),
            )),
        ]);

        let outcome = engine.search(&request(Seniority::Senior)).await;

        assert_eq!(outcome.per_source_counts[&SourceId::Indeed], 0);
        assert_eq!(outcome.per_source_counts[&SourceId::LinkedIn], 3);
    }

    #[tokio::test]
    async fn panicking_source_is_contained() {
        let engine = engine(vec![
            Arc::new(FakeSource::new(SourceId::Indeed, Behavior::Panic)),
            Arc::new(FakeSource::new(
                SourceId::LinkedIn,
                Behavior::Rows(rows("chief", 2, Some("Chief"))),
            )),
        ]);

        let outcome = engine.search(&request(Seniority::Chief)).await;

        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.per_source_counts[&SourceId::Indeed], 0);
    }

    #[tokio::test]
    async fn all_empty_is_a_normal_outcome() {
        let engine = engine(vec![
            Arc::new(FakeSource::new(SourceId::Indeed, Behavior::Rows(Vec::new()))),
            Arc::new(FakeSource::new(SourceId::LinkedIn, Behavior::Fail)),
        ]);

        let outcome = engine.search(&request(Seniority::Intern)).await;

        assert_eq!(outcome.total, 0);
        assert!(outcome.jobs.is_empty());
        assert_eq!(outcome.per_source_counts.len(), 2);
    }

    #[tokio::test]
    async fn every_source_is_called_once() {
        let a = Arc::new(FakeSource::new(SourceId::Indeed, Behavior::Rows(rows("x", 20, Some("senior")))));
        let b = Arc::new(FakeSource::new(SourceId::LinkedIn, Behavior::Rows(rows("y", 20, Some("senior")))));
        let engine = engine(vec![a.clone(), b.clone()]);

        engine.search(&request(Seniority::Senior)).await;

        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prepare_filters_by_tier() {
        let mut input = rows("Developer", 2, None);
        input.push(RawJobRecord {
            title: Some("Software Intern".into()),
            ..Default::default()
        });
        let kept = prepare(SourceId::Indeed, input, Seniority::Intern);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].job_level.as_deref(), Some("intern"));
    }
}
