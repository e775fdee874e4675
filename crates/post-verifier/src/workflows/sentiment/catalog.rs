use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::client::{CompletionClient, UpstreamError};

pub const MODEL_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct CachedModels {
    models: Vec<String>,
    fetched_at: Instant,
}

/// Provider model list cached for a fixed TTL. There is no explicit invalidation.
#[derive(Debug)]
pub struct ModelCatalog {
    ttl: Duration,
    cached: Mutex<Option<CachedModels>>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(MODEL_CACHE_TTL)
    }
}

impl ModelCatalog {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached list, refreshing it from `client` once the TTL has elapsed.
    pub async fn models(&self, client: &dyn CompletionClient) -> Result<Vec<String>, UpstreamError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.models.clone());
            }
        }

        let models = client.list_models().await?;
        debug!(count = models.len(), "refreshed provider model list");
        *cached = Some(CachedModels {
            models: models.clone(),
            fetched_at: Instant::now(),
        });
        Ok(models)
    }
}
