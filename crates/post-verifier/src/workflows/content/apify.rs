use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::fetch::{AdapterError, ExtractionJobs, JobRun};
use crate::config::{ConfigError, ExtractionConfig};

/// Apify task runner speaking the v2 REST API.
pub struct ApifyTaskClient {
    client: Client,
    base_url: String,
    token: String,
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    data: RunData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunData {
    id: String,
    default_dataset_id: Option<String>,
}

impl ApifyTaskClient {
    pub fn new(base_url: &str, token: &str, task_id: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            task_id: task_id.to_string(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let (token, task_id) = config.credentials()?;
        Ok(Self::new(&config.base_url, token, task_id))
    }
}

fn transport(err: reqwest::Error) -> AdapterError {
    AdapterError(format!("extraction service request failed: {err}"))
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AdapterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AdapterError(format!(
        "extraction service returned {status}: {}",
        body.chars().take(200).collect::<String>()
    )))
}

#[async_trait]
impl ExtractionJobs for ApifyTaskClient {
    async fn start(&self, input: Value) -> Result<JobRun, AdapterError> {
        let url = format!("{}/v2/actor-tasks/{}/runs", self.base_url, self.task_id);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&input)
            .send()
            .await
            .map_err(transport)?;
        let envelope: RunEnvelope = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        let dataset_id = envelope.data.default_dataset_id.ok_or_else(|| {
            AdapterError(format!(
                "run {} did not return a default dataset id",
                envelope.data.id
            ))
        })?;

        Ok(JobRun {
            run_id: envelope.data.id,
            dataset_id,
        })
    }

    async fn first_item(&self, run: &JobRun) -> Result<Option<Value>, AdapterError> {
        let url = format!("{}/v2/datasets/{}/items", self.base_url, run.dataset_id);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("limit", "1"), ("clean", "true"), ("format", "json")])
            .send()
            .await
            .map_err(transport)?;
        let items: Vec<Value> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        debug!(run_id = %run.run_id, count = items.len(), "polled dataset");
        Ok(items.into_iter().next())
    }
}
