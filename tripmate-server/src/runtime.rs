//! HTTP client for the external agent runtime.
//!
//! The facade forwards each user turn to a hosted runtime that does the
//! actual language work and tool orchestration. Nothing about that runtime
//! lives here beyond the request shape and a timeout.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tripmate_store::ChatMessage;

#[derive(Debug, Clone)]
pub struct RuntimeClient {
    http: reqwest::Client,
    base_url: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    message: &'a str,
    user_id: &'a str,
    session_id: &'a str,
    state: &'a Map<String, Value>,
    history: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    response: String,
}

impl RuntimeClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    /// Forward one user turn to the runtime and return its reply text.
    pub async fn run(
        &self,
        message: &str,
        user_id: &str,
        session_id: &str,
        state: &Map<String, Value>,
        history: &[ChatMessage],
    ) -> Result<String> {
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow!("agent runtime is not configured; set AGENT_RUNTIME_URL"))?;
        let url = format!("{}/run", base.trim_end_matches('/'));

        let body = RunRequest {
            message,
            user_id,
            session_id,
            state,
            history,
        };

        match tokio::time::timeout(self.timeout, self.http.post(&url).json(&body).send()).await {
            Ok(Ok(response)) => {
                if !response.status().is_success() {
                    return Err(anyhow!(
                        "agent runtime returned status {}",
                        response.status()
                    ));
                }
                let parsed: RunResponse = response
                    .json()
                    .await
                    .map_err(|e| anyhow!("failed to parse runtime response: {e}"))?;
                Ok(parsed.response)
            }
            Ok(Err(e)) => Err(anyhow!("network error talking to agent runtime: {e}")),
            Err(_) => Err(anyhow!("agent runtime request timed out")),
        }
    }
}
