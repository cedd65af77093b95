use super::types::{ErrorResponse, HealthResponse, PreviewResponse};
use crate::{
    Error,
    invocation::{InvocationOutcome, Invoker},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub invoker: Arc<Invoker>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

pub async fn generate(
    State(state): State<AppState>,
    Path((template, record_id)): Path<(String, String)>,
) -> Result<Json<InvocationOutcome>, HandlerError> {
    info!(
        "Received generation request: template '{}', record {}",
        template, record_id
    );

    match state.invoker.invoke(&template, &record_id).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => Err(error_response(&template, &record_id, e)),
    }
}

pub async fn preview(
    State(state): State<AppState>,
    Path((template, record_id)): Path<(String, String)>,
) -> Result<Json<PreviewResponse>, HandlerError> {
    info!(
        "Received preview request: template '{}', record {}",
        template, record_id
    );

    match state.invoker.preview(&template, &record_id).await {
        Ok(prompt) => Ok(Json(PreviewResponse { prompt })),
        Err(e) => Err(error_response(&template, &record_id, e)),
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        templates: state.invoker.template_names().map(str::to_string).collect(),
    })
}

pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Error::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Connectivity(_)
        | Error::Transport { .. }
        | Error::EmptyResponse
        | Error::MalformedOutput(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(template: &str, record_id: &str, e: Error) -> HandlerError {
    error!(
        "Failed to run template '{}' for record {}: {}",
        template, record_id, e
    );
    (
        status_for(&e),
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
