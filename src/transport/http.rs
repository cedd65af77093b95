use super::client::Transport;
use crate::{
    Error, Result, config::EndpointConfig, prompt::TemplateRequest, response::GenerationResult,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// JSON-over-HTTP transport for `POST <base>/prompt-templates/{id}/generations`.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_token: String,
    timeout: Duration,
    max_error_body_chars: usize,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::config(format!("Invalid endpoint URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Endpoint URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Creating HTTP transport for: {}", base_url);

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token,
            timeout: Duration::from_secs(config.timeout_secs),
            max_error_body_chars: config.max_error_body_chars,
        })
    }

    /// Overrides the per-call timeout from the endpoint configuration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn generations_url(&self, template_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["prompt-templates", template_id, "generations"]);
        }
        url
    }

    async fn exchange(&self, request: &TemplateRequest) -> Result<GenerationResult> {
        let url = self.generations_url(request.template_id());

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(&request.to_wire())
            .send()
            .await
            .map_err(connectivity)?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            warn!(
                "Template '{}' returned status {}",
                request.template_id(),
                status.as_u16()
            );
            return Err(Error::Transport {
                status: status.as_u16(),
                body: truncate(&body, self.max_error_body_chars),
            });
        }

        let body = response.text().await.map_err(connectivity)?;
        serde_json::from_str(&body)
            .map_err(|e| Error::malformed(format!("Invalid generations response: {}", e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &TemplateRequest) -> Result<GenerationResult> {
        debug!(
            "Sending template '{}' (preview: {}, generations: {})",
            request.template_id(),
            request.is_preview(),
            request.num_generations()
        );

        let result = tokio::time::timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_| {
                Error::timeout(format!(
                    "Template '{}' did not respond within {:?}",
                    request.template_id(),
                    self.timeout
                ))
            })??;

        let expected = request.num_generations() as usize;
        if !request.is_preview() && result.generations.len() != expected {
            warn!(
                "Template '{}' returned {} generations, expected {}",
                request.template_id(),
                result.generations.len(),
                expected
            );
        }

        debug!(
            "Received {} generations for template '{}'",
            result.generations.len(),
            request.template_id()
        );
        Ok(result)
    }
}

fn connectivity(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::timeout(e.to_string())
    } else {
        Error::connectivity(e.to_string())
    }
}

fn error_body<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
    body.unwrap_or_else(|e| format!("<unreadable body: {}>", e))
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
