use async_trait::async_trait;
use prompt_relay::{
    Error, Result, prompt::TemplateRequest, response::GenerationResult, transport::Transport,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock transport that replays queued results and records every request.
#[derive(Debug, Clone)]
pub struct MockTransport {
    pub responses: Arc<Mutex<Vec<Result<GenerationResult>>>>,
    pub requests: Arc<Mutex<Vec<TemplateRequest>>>,
    pub delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn with_response(self, response: GenerationResult) -> Self {
        self.responses.lock().unwrap().push(Ok(response));
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_response(GenerationResult::from_texts([text]))
    }

    pub fn with_error(self, error: Error) -> Self {
        self.responses.lock().unwrap().push(Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_requests(&self) -> Vec<TemplateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &TemplateRequest) -> Result<GenerationResult> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::internal("No more mock responses available"));
        }

        responses.remove(0)
    }
}
