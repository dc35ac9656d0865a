//! Paper fetch service
//!
//! Produces the enriched paper list behind the dashboard grid:
//! - waits a configurable delay standing in for network latency
//! - truncates the source list to the requested size
//! - joins summary/insights onto each paper by link
//!
//! Nothing is cached; every call re-reads the source.

mod source;

pub use source::{open_source, HttpSource, PaperSource, SourceData, StaticSource};

use crate::errors::{AppError, FetchError, Result};
use crate::metrics;
use crate::models::{Enrichment, Paper};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Dashboard grid rows
pub const GRID_ROWS: usize = 2;
/// Dashboard grid columns
pub const GRID_COLUMNS: usize = 5;
/// Papers shown on one dashboard page
pub const GRID_SIZE: usize = GRID_ROWS * GRID_COLUMNS;

/// Simulated latency of the mock service
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(500);

/// Take at most `max_results` papers in source order and attach enrichment.
pub fn enrich(
    papers: Vec<Paper>,
    enrichments: &HashMap<String, Enrichment>,
    max_results: usize,
) -> Vec<Paper> {
    papers
        .into_iter()
        .take(max_results)
        .map(|paper| {
            let enrichment = enrichments.get(&paper.link);
            paper.enriched(enrichment)
        })
        .collect()
}

#[derive(Clone)]
pub struct PaperService {
    source: Arc<dyn PaperSource>,
    delay: Duration,
}

impl PaperService {
    pub fn new(source: Arc<dyn PaperSource>, delay: Duration) -> Self {
        Self { source, delay }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch up to `max_results` enriched papers.
    ///
    /// Dropping the returned future cancels the fetch.
    pub async fn fetch_papers(&self, max_results: usize) -> Result<Vec<Paper>> {
        let start = Instant::now();
        tokio::time::sleep(self.delay).await;

        match self.load(max_results).await {
            Ok(papers) => {
                let elapsed = start.elapsed();
                metrics::record_fetch(elapsed.as_secs_f64(), self.source.name(), papers.len(), true);
                info!(
                    source = self.source.name(),
                    max_results,
                    returned = papers.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Fetched papers"
                );
                Ok(papers)
            }
            Err(e) => {
                metrics::record_fetch(start.elapsed().as_secs_f64(), self.source.name(), 0, false);
                warn!(source = self.source.name(), error = %e, "Paper fetch failed");
                Err(e)
            }
        }
    }

    /// [`fetch_papers`](Self::fetch_papers) bounded by `timeout`.
    pub async fn fetch_papers_with_timeout(
        &self,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<Paper>> {
        match tokio::time::timeout(timeout, self.fetch_papers(max_results)).await {
            Ok(result) => result,
            Err(_) => {
                metrics::record_fetch(timeout.as_secs_f64(), self.source.name(), 0, false);
                warn!(
                    source = self.source.name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Paper fetch timed out"
                );
                Err(FetchError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into())
            }
        }
    }

    /// Load the source once without delay, returning the base list length.
    pub async fn probe(&self) -> Result<usize> {
        Ok(self.source.load().await?.papers.len())
    }

    /// Look up one enriched paper by id, skipping the simulated delay.
    pub async fn find_paper(&self, id: &str) -> Result<Paper> {
        let data = self.source.load().await?;
        let enrichments = data.enrichments;
        data.papers
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| {
                let enrichment = enrichments.get(&p.link);
                p.enriched(enrichment)
            })
            .ok_or_else(|| AppError::PaperNotFound { id: id.to_string() })
    }

    async fn load(&self, max_results: usize) -> Result<Vec<Paper>> {
        let data = self.source.load().await?;
        Ok(enrich(data.papers, &data.enrichments, max_results))
    }
}
