use crate::{Result, prompt::TemplateRequest, response::GenerationResult};
use async_trait::async_trait;

/// Sends one template request to the generation endpoint.
///
/// Implementations make exactly one attempt per call; retrying is left to
/// the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TemplateRequest) -> Result<GenerationResult>;
}
