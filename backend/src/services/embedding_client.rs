use async_trait::async_trait;

/// The idealized embedding RPC collaborator (spec §4.11, §6). Matches the
/// teacher's `embedding_request_timeout_ms` / `_retries` / `_max_inflight`
/// config triplet in shape; retry and inflight-limiting live at the
/// call-site (C11) rather than inside the client.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingClientError {
    #[error("embedding request timed out")]
    Timeout,
    #[error("embedding transport error: {0}")]
    Transport(String),
    #[error("embedding service returned status {0}")]
    Status(u16),
}

pub struct HttpEmbeddingClient {
    client: reqwest::Client,
    service_url: String,
}

impl HttpEmbeddingClient {
    pub fn new(service_url: String, timeout_ms: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            service_url,
        }
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        let response = self
            .client
            .post(format!("{}/embed", self.service_url))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingClientError::Timeout
                } else {
                    EmbeddingClientError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(EmbeddingClientError::Status(response.status().as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EmbeddingClientError::Transport(e.to_string()))?;

        let vector = body
            .get("embedding")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_f64()).map(|v| v as f32).collect())
            .unwrap_or_default();

        Ok(vector)
    }
}
