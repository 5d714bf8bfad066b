use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no tabs provided")]
    EmptyBatch,
    #[error("upstream completion failed: {0}")]
    Upstream(String),
    #[error("unrecognized completion shape (top-level keys: {keys:?})")]
    Extraction { keys: Vec<String> },
    #[error("model reply is not parseable JSON")]
    Parse { excerpt: String },
    #[error("no JSON object found in model reply")]
    NoJson { excerpt: String },
    #[error("model reply is not a JSON object (found {found})")]
    NotAnObject { found: String },
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A browser tab descriptor. Identity is `id`; uniqueness within a batch is
/// the caller's problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: i64,
    pub title: String,
    pub url: String,
}

/// Category name -> whatever the model put under it (normally an array of tab
/// ids). The recovered object is handed back verbatim; only its shape is
/// checked.
pub type TabGroups = serde_json::Map<String, serde_json::Value>;

/// Immutable payload for one completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
}

/// Raw upstream reply. Kept loose on purpose: backends disagree on shape
/// (direct `text` field, nested candidates, or a bare string), and the
/// extractor probes them in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionResponse(pub serde_json::Value);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// The sleep after failed attempt N is `backoff_unit_ms * N`.
    pub backoff_unit_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_unit_ms.saturating_mul(attempt as u64))
    }
}

#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse>;
}
