use async_trait::async_trait;

/// Result of a single LLM completion call.
#[derive(Debug, Clone)]
pub struct LlmCompletion {
    pub text: String,
    pub tokens_used: Option<u32>,
}

/// The idealized LLM RPC collaborator (spec §1, §6). Generalized from the
/// teacher's `AIAgentConnector` trait: one fixed operation instead of a
/// generic `query`, since the query-expansion pipeline only ever needs a
/// single fixed-temperature completion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<LlmCompletion, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("llm request timed out")]
    Timeout,
    #[error("llm transport error: {0}")]
    Transport(String),
    #[error("llm returned status {0}")]
    Status(u16),
}

/// `reqwest`-backed implementation calling a single configured provider
/// endpoint with one credential.
pub struct HttpLlmClient {
    client: reqwest::Client,
    provider_url: String,
    api_key: Option<String>,
}

impl HttpLlmClient {
    pub fn new(provider_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            provider_url,
            api_key,
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<LlmCompletion, LlmClientError> {
        let mut request = self
            .client
            .post(format!("{}/v1/completions", self.provider_url))
            .json(&serde_json::json!({ "prompt": prompt, "temperature": temperature }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmClientError::Timeout
            } else {
                LlmClientError::Transport(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(LlmClientError::Status(response.status().as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmClientError::Transport(e.to_string()))?;

        let text = body
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let tokens_used = body.get("tokens_used").and_then(|v| v.as_u64()).map(|v| v as u32);

        Ok(LlmCompletion { text, tokens_used })
    }
}
