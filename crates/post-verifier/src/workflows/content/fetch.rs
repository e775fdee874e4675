use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::domain::NormalizedContent;
use super::normalizer::{normalize, NormalizeError};
use crate::error::ErrorKind;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(90);

/// Handle to a started extraction job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRun {
    pub run_id: String,
    pub dataset_id: String,
}

/// Failure reported by the extraction service itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AdapterError(pub String);

/// Remote extraction service: start one run, then read its result set.
#[async_trait]
pub trait ExtractionJobs: Send + Sync {
    async fn start(&self, input: Value) -> Result<JobRun, AdapterError>;

    /// First item of the run's result set, if any has been produced yet.
    async fn first_item(&self, run: &JobRun) -> Result<Option<Value>, AdapterError>;
}

/// Produces normalized content for a post reference.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<NormalizedContent, ContentError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("timed out waiting for extraction results after {elapsed_ms}ms (run_id={run_id})")]
    Timeout { run_id: String, elapsed_ms: u128 },
    #[error("extraction job failed: {0}")]
    Adapter(#[from] AdapterError),
    #[error("post data incomplete: {0}")]
    Validation(#[from] NormalizeError),
}

impl ContentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentError::Timeout { .. } => ErrorKind::AdapterTimeout,
            ContentError::Adapter(_) => ErrorKind::Adapter,
            ContentError::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// Fixed task input; only the post reference varies between runs.
pub fn task_input(reference: &str) -> Value {
    json!({
        "caseInsensitive": true,
        "debug": { "maxItemsPerDataset": 1000 },
        "dedupe": { "enabled": true, "maxSeenIdsPerPlatform": 5000 },
        "match": { "symbols": ["DGRAM"], "caseInsensitive": true, "useWordBoundaries": false },
        "notify": { "webhookUrl": "" },
        "platformRuns": [
            {
                "name": "coinmarketcap-community",
                "actorId": "cmc/community-post",
                "input": {
                    "postIdOrUrl": reference,
                    "includeComments": true,
                    "maxComments": 50
                }
            }
        ],
        "symbols": ["DGRAM", "Datagram Network"],
        "useWordBoundaries": false
    })
}

/// Raw item together with the run that produced it.
#[derive(Debug, Clone)]
pub struct FetchedItem {
    pub run: JobRun,
    pub item: Value,
}

/// Starts one extraction run per reference and polls until an item appears or the budget runs out.
///
/// The budget is checked between polls; a request already in flight is not interrupted and the
/// remote run is left to finish on its own.
pub struct ContentFetcher<J> {
    jobs: J,
    timeout: Duration,
    poll_interval: Duration,
}

impl<J: ExtractionJobs> ContentFetcher<J> {
    pub fn new(jobs: J) -> Self {
        Self::with_budget(jobs, DEFAULT_FETCH_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_budget(jobs: J, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            jobs,
            timeout,
            poll_interval,
        }
    }

    pub async fn fetch_raw(&self, reference: &str) -> Result<FetchedItem, ContentError> {
        info!(reference, "starting extraction run");
        let run = self.jobs.start(task_input(reference)).await?;
        let started = Instant::now();

        loop {
            let elapsed = started.elapsed();
            if elapsed > self.timeout {
                warn!(run_id = %run.run_id, elapsed_ms = elapsed.as_millis() as u64, "extraction run timed out");
                return Err(ContentError::Timeout {
                    run_id: run.run_id,
                    elapsed_ms: elapsed.as_millis(),
                });
            }

            if let Some(item) = self.jobs.first_item(&run).await? {
                info!(
                    run_id = %run.run_id,
                    dataset_id = %run.dataset_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "extraction item received"
                );
                return Ok(FetchedItem { run, item });
            }

            debug!(run_id = %run.run_id, "no extraction items yet");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl<J: ExtractionJobs> ContentSource for ContentFetcher<J> {
    async fn fetch(&self, reference: &str) -> Result<NormalizedContent, ContentError> {
        let fetched = self.fetch_raw(reference).await?;
        Ok(normalize(&fetched.item)?)
    }
}
