use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub templates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
