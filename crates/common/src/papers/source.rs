//! Paper data sources
//!
//! A source yields the ordered base paper list and the link-keyed enrichment
//! mapping. The fetch service does the join.

use crate::config::FetchConfig;
use crate::errors::{AppError, FetchError, Result};
use crate::models::{Enrichment, Paper};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const BUNDLED_PAPERS: &str = include_str!("../../fixtures/results.json");
const BUNDLED_SUMMARIES: &str = include_str!("../../fixtures/summaries.json");

/// Raw datasets behind the fetch service
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    /// Base records in display order
    pub papers: Vec<Paper>,
    /// Enrichment mapping keyed by paper link
    pub enrichments: HashMap<String, Enrichment>,
}

/// Trait for paper data providers
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Load the base list and enrichment mapping
    async fn load(&self) -> Result<SourceData>;

    /// Short name used in logs and metric labels
    fn name(&self) -> &str;
}

fn parse_papers(json: &str) -> std::result::Result<Vec<Paper>, FetchError> {
    serde_json::from_str(json).map_err(|e| FetchError::Parse {
        message: format!("paper list: {}", e),
    })
}

fn parse_enrichments(json: &str) -> std::result::Result<HashMap<String, Enrichment>, FetchError> {
    serde_json::from_str(json).map_err(|e| FetchError::Parse {
        message: format!("summary mapping: {}", e),
    })
}

/// Static, in-memory datasets
#[derive(Debug, Clone)]
pub struct StaticSource {
    data: SourceData,
}

impl StaticSource {
    pub fn new(papers: Vec<Paper>, enrichments: HashMap<String, Enrichment>) -> Self {
        Self {
            data: SourceData {
                papers,
                enrichments,
            },
        }
    }

    /// Build from the JSON text of both datasets
    pub fn from_json(papers: &str, summaries: &str) -> Result<Self> {
        Ok(Self::new(parse_papers(papers)?, parse_enrichments(summaries)?))
    }

    /// Read both datasets from disk. An unreadable file is reported as
    /// [`FetchError::Read`].
    pub fn from_files(papers: impl AsRef<Path>, summaries: impl AsRef<Path>) -> Result<Self> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|e| FetchError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        };
        let papers = read(papers.as_ref())?;
        let summaries = read(summaries.as_ref())?;
        Self::from_json(&papers, &summaries)
    }

    /// The mock arXiv datasets shipped with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_PAPERS, BUNDLED_SUMMARIES)
    }

    pub fn len(&self) -> usize {
        self.data.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.papers.is_empty()
    }
}

#[async_trait]
impl PaperSource for StaticSource {
    async fn load(&self) -> Result<SourceData> {
        Ok(self.data.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Datasets served as JSON over HTTP
pub struct HttpSource {
    client: reqwest::Client,
    papers_url: String,
    summaries_url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(papers_url: String, summaries_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            papers_url,
            summaries_url,
            timeout,
        })
    }

    async fn get_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network {
                message: format!("GET {} returned {}", url, status),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        debug!(url = %url, bytes = body.len(), "Fetched dataset");
        Ok(body)
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Network {
                message: format!("GET {} failed: {}", url, e),
            }
        }
    }
}

#[async_trait]
impl PaperSource for HttpSource {
    async fn load(&self) -> Result<SourceData> {
        let (papers, summaries) = futures::try_join!(
            self.get_text(&self.papers_url),
            self.get_text(&self.summaries_url)
        )?;

        Ok(SourceData {
            papers: parse_papers(&papers)?,
            enrichments: parse_enrichments(&summaries)?,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Build the source selected by configuration.
pub fn open_source(config: &FetchConfig) -> Result<Arc<dyn PaperSource>> {
    let locations = || match (&config.papers_location, &config.summaries_location) {
        (Some(papers), Some(summaries)) => Ok((papers.clone(), summaries.clone())),
        _ => Err(AppError::Configuration {
            message: format!(
                "fetch.source = '{}' needs papers_location and summaries_location",
                config.source
            ),
        }),
    };

    match config.source.as_str() {
        "bundled" => {
            let source = StaticSource::bundled()?;
            info!(count = source.len(), "Using bundled paper fixtures");
            Ok(Arc::new(source))
        }
        "files" => {
            let (papers, summaries) = locations()?;
            let source = StaticSource::from_files(&papers, &summaries)?;
            info!(count = source.len(), path = %papers, "Using paper fixtures from disk");
            Ok(Arc::new(source))
        }
        "http" => {
            let (papers, summaries) = locations()?;
            info!(url = %papers, "Using HTTP paper source");
            Ok(Arc::new(HttpSource::new(
                papers,
                summaries,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown paper source '{}'", other),
        }),
    }
}
