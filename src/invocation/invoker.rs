use super::fsm::{InvocationEvent, InvocationStateMachine};
use crate::{
    Error, Result,
    config::TemplateDefinition,
    mapping::{self, TargetRecord},
    prompt::{TemplateRequest, TemplateRequestBuilder},
    records::RecordStore,
    response::{self, GenerationResult, ParsedOutput},
    transport::Transport,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of a completed invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationOutcome {
    pub invocation_id: String,
    pub record: TargetRecord,
    pub output: ParsedOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_score: Option<Value>,
}

/// Runs configured templates against records: build, send, parse, apply, save.
///
/// Holds no mutable state, so one instance can serve concurrent invocations.
/// Any failure short-circuits the remaining stages and leaves the stored
/// record as it was.
pub struct Invoker {
    transport: Arc<dyn Transport>,
    store: Arc<dyn RecordStore>,
    templates: BTreeMap<String, TemplateDefinition>,
}

impl Invoker {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn RecordStore>,
        templates: BTreeMap<String, TemplateDefinition>,
    ) -> Self {
        info!("Initializing invoker with {} templates", templates.len());
        Self {
            transport,
            store,
            templates,
        }
    }

    pub fn template(&self, name: &str) -> Result<&TemplateDefinition> {
        self.templates
            .get(name)
            .ok_or_else(|| Error::invalid_argument(format!("Unknown template: {}", name)))
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub async fn invoke(&self, template_name: &str, record_id: &str) -> Result<InvocationOutcome> {
        self.invoke_until(template_name, record_id, std::future::pending::<()>())
            .await
    }

    /// Like [`Invoker::invoke`], but gives up when `cancel` completes before
    /// the endpoint answers. A cancelled call reports `Timeout`; the remote
    /// side may still finish the generation.
    pub async fn invoke_until<F>(
        &self,
        template_name: &str,
        record_id: &str,
        cancel: F,
    ) -> Result<InvocationOutcome>
    where
        F: Future<Output = ()> + Send,
    {
        let invocation_id = Uuid::new_v4().to_string();
        let mut fsm = InvocationStateMachine::new(&invocation_id);

        info!(
            "Invocation {}: template '{}' for record {}",
            invocation_id, template_name, record_id
        );

        match self
            .run(&mut fsm, template_name, record_id, cancel)
            .await
        {
            Ok(outcome) => {
                info!("Invocation {} completed", invocation_id);
                Ok(outcome)
            }
            Err(e) => {
                let reached = fsm.fail();
                warn!(
                    "Invocation {} failed after {:?}: {}",
                    invocation_id, reached, e
                );
                Err(e)
            }
        }
    }

    /// Resolves the template against the record without generating.
    pub async fn preview(&self, template_name: &str, record_id: &str) -> Result<String> {
        let invocation_id = Uuid::new_v4().to_string();
        let mut fsm = InvocationStateMachine::new(&invocation_id);

        info!(
            "Preview {}: template '{}' for record {}",
            invocation_id, template_name, record_id
        );

        match self.run_preview(&mut fsm, template_name, record_id).await {
            Ok(prompt) => Ok(prompt),
            Err(e) => {
                let reached = fsm.fail();
                warn!("Preview {} failed after {:?}: {}", invocation_id, reached, e);
                Err(e)
            }
        }
    }

    async fn run<F>(
        &self,
        fsm: &mut InvocationStateMachine,
        template_name: &str,
        record_id: &str,
        cancel: F,
    ) -> Result<InvocationOutcome>
    where
        F: Future<Output = ()> + Send,
    {
        let template = self.template(template_name)?;
        let mut record = self.store.get(record_id).await?;

        let request = build_request(template, record_id, false)?;
        fsm.transition(InvocationEvent::RequestBuilt)?;

        fsm.transition(InvocationEvent::RequestSent)?;
        let result = self.dispatch(&request, cancel).await?;

        let safety_score = result.first().and_then(|g| g.safety_score.clone());
        let output = response::parse(&result, &template.expected_keys)?;
        fsm.transition(InvocationEvent::ResponseParsed)?;

        mapping::apply(&output, &mut record, &template.field_map)?;
        fsm.transition(InvocationEvent::FieldsApplied)?;

        self.store.update(&record).await?;
        fsm.transition(InvocationEvent::RecordSaved)?;

        Ok(InvocationOutcome {
            invocation_id: fsm.invocation_id().to_string(),
            record,
            output,
            safety_score,
        })
    }

    async fn run_preview(
        &self,
        fsm: &mut InvocationStateMachine,
        template_name: &str,
        record_id: &str,
    ) -> Result<String> {
        let template = self.template(template_name)?;
        // Only checks that the record exists
        self.store.get(record_id).await?;

        let request = build_request(template, record_id, true)?;
        fsm.transition(InvocationEvent::RequestBuilt)?;

        fsm.transition(InvocationEvent::RequestSent)?;
        let result = self.dispatch(&request, std::future::pending::<()>()).await?;

        let prompt = result
            .resolved_prompt()
            .ok_or(Error::EmptyResponse)?
            .to_string();
        fsm.transition(InvocationEvent::PreviewResolved)?;

        Ok(prompt)
    }

    async fn dispatch<F>(&self, request: &TemplateRequest, cancel: F) -> Result<GenerationResult>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.transport.send(request) => result,
            _ = cancel => {
                debug!("Cancelled template '{}' while in flight", request.template_id());
                Err(Error::timeout(format!(
                    "Invocation of template '{}' was cancelled",
                    request.template_id()
                )))
            }
        }
    }
}

fn build_request(
    template: &TemplateDefinition,
    record_id: &str,
    preview: bool,
) -> Result<TemplateRequest> {
    TemplateRequestBuilder::new(template.id.as_str())
        .record_input(template.input_name.as_str(), record_id)
        .required_inputs(template.required_inputs.iter().cloned())
        .config(template.generation.clone())
        .preview(preview)
        .build()
}
