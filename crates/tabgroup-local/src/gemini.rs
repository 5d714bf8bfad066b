//! Gemini (`generateContent`) completion backend.
//!
//! The API key travels in the query string, so reqwest errors are stripped of
//! their URL before they reach the error taxonomy.

use serde::Serialize;
use tabgroup_core::{CompletionBackend, CompletionRequest, CompletionResponse, Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn gemini_api_key_from_env() -> Option<String> {
    env("TABGROUP_GEMINI_API_KEY")
        .or_else(|| env("GEMINI_API_KEY"))
        .or_else(|| env("GOOGLE_API_KEY"))
}

pub fn gemini_model_from_env() -> String {
    env("TABGROUP_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

pub fn gemini_base_url_from_env() -> String {
    env("TABGROUP_GEMINI_BASE_URL")
        .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string())
}

pub fn gemini_timeout_ms_from_env() -> u64 {
    env("TABGROUP_GEMINI_TIMEOUT_MS")
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(20_000)
        .clamp(200, 120_000)
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout_ms: u64,
}

impl GeminiClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_ms,
        }
    }

    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let api_key = gemini_api_key_from_env().ok_or_else(|| {
            Error::NotConfigured(
                "missing TABGROUP_GEMINI_API_KEY (or GEMINI_API_KEY / GOOGLE_API_KEY)".to_string(),
            )
        })?;
        Ok(Self::new(
            client,
            gemini_base_url_from_env(),
            api_key,
            gemini_timeout_ms_from_env(),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_generate_content(&self, model: &str) -> String {
        format!(
            "{base}/v1beta/models/{model}:generateContent?key={key}",
            base = self.base_url.trim_end_matches('/'),
            key = self.api_key,
        )
    }
}

#[derive(Debug, Serialize)]
struct ReqPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct ReqContent {
    parts: Vec<ReqPart>,
}

#[derive(Debug, Serialize)]
struct GenCfg {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateContentReq {
    contents: Vec<ReqContent>,
    generation_config: GenCfg,
}

#[async_trait::async_trait]
impl CompletionBackend for GeminiClient {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse> {
        let body = GenerateContentReq {
            contents: vec![ReqContent {
                parts: vec![ReqPart {
                    text: req.prompt.clone(),
                }],
            }],
            generation_config: GenCfg { temperature: 0.0 },
        };

        let resp = self
            .client
            .post(self.endpoint_generate_content(&req.model))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "gemini generateContent HTTP {status}"
            )));
        }

        // Shape probing is the extractor's job; keep the body loose here.
        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::Upstream(e.without_url().to_string()))?;
        Ok(CompletionResponse(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::net::SocketAddr;
    use std::sync::Mutex;

    // Env vars are process-global; serialize tests that mutate them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvGuard {
        k: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(k: &'static str, v: &str) -> Self {
            let prev = std::env::var(k).ok();
            std::env::set_var(k, v);
            Self { k, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(v) = self.prev.take() {
                std::env::set_var(self.k, v);
            } else {
                std::env::remove_var(self.k);
            }
        }
    }

    #[test]
    fn blank_key_is_treated_as_missing() {
        let _l = ENV_LOCK.lock().unwrap();
        let _g = EnvGuard::set("TABGROUP_GEMINI_API_KEY", "   ");
        let _g2 = EnvGuard::set("GEMINI_API_KEY", "");
        let _g3 = EnvGuard::set("GOOGLE_API_KEY", " ");
        assert!(gemini_api_key_from_env().is_none());
        assert!(GeminiClient::from_env(reqwest::Client::new()).is_err());
    }

    #[test]
    fn timeout_is_clamped() {
        let _l = ENV_LOCK.lock().unwrap();
        {
            let _g = EnvGuard::set("TABGROUP_GEMINI_TIMEOUT_MS", "5");
            assert_eq!(gemini_timeout_ms_from_env(), 200);
        }
        {
            let _g = EnvGuard::set("TABGROUP_GEMINI_TIMEOUT_MS", "999999999");
            assert_eq!(gemini_timeout_ms_from_env(), 120_000);
        }
        {
            let _g = EnvGuard::set("TABGROUP_GEMINI_TIMEOUT_MS", "not-a-number");
            assert_eq!(gemini_timeout_ms_from_env(), 20_000);
        }
    }

    #[test]
    fn endpoint_includes_model_and_key() {
        let c = GeminiClient::new(reqwest::Client::new(), "https://gl.test/", "k123", 1_000);
        assert_eq!(
            c.endpoint_generate_content("gemini-test"),
            "https://gl.test/v1beta/models/gemini-test:generateContent?key=k123"
        );
    }

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn req() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-test".to_string(),
            prompt: "group these".to_string(),
        }
    }

    #[tokio::test]
    async fn complete_returns_the_body_verbatim() {
        let app = Router::new().route(
            "/v1beta/models/*rest",
            post(|| async {
                Json(serde_json::json!({
                    "candidates": [{"content": {"parts": [{"text": "{\"A\":[1]}"}]}}]
                }))
            }),
        );
        let addr = serve(app).await;
        let c = GeminiClient::new(reqwest::Client::new(), format!("http://{addr}"), "k", 2_000);
        let resp = c.complete(&req()).await.unwrap();
        assert_eq!(
            resp.0["candidates"][0]["content"]["parts"][0]["text"],
            "{\"A\":[1]}"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error() {
        let app = Router::new().route(
            "/v1beta/models/*rest",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let addr = serve(app).await;
        let c = GeminiClient::new(reqwest::Client::new(), format!("http://{addr}"), "k", 2_000);
        match c.complete(&req()).await.unwrap_err() {
            Error::Upstream(msg) => assert!(msg.contains("503")),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }
}
