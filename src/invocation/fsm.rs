use crate::{Error, Result};
use tracing::{debug, info, warn};

// Invocation stages
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationState {
    Pending,
    RequestBuilt,
    Dispatched,
    ResponseParsed,
    Applied,
    Persisted,
    Failed,
}

// Invocation events
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationEvent {
    RequestBuilt,
    RequestSent,
    ResponseParsed,
    FieldsApplied,
    RecordSaved,
    /// Preview calls finish once the prompt comes back.
    PreviewResolved,
    ErrorOccurred,
}

/// Tracks how far one invocation got.
pub struct InvocationStateMachine {
    invocation_id: String,
    state: InvocationState,
}

impl InvocationStateMachine {
    pub fn new(invocation_id: impl Into<String>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            state: InvocationState::Pending,
        }
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn current_state(&self) -> &InvocationState {
        &self.state
    }

    pub fn transition(&mut self, event: InvocationEvent) -> Result<()> {
        let old_state = self.state.clone();
        debug!(
            "Invocation {} processing event {:?} in state {:?}",
            self.invocation_id, event, old_state
        );

        let new_state = match (&self.state, &event) {
            (InvocationState::Pending, InvocationEvent::RequestBuilt) => {
                InvocationState::RequestBuilt
            }
            (InvocationState::RequestBuilt, InvocationEvent::RequestSent) => {
                InvocationState::Dispatched
            }
            (InvocationState::Dispatched, InvocationEvent::ResponseParsed) => {
                InvocationState::ResponseParsed
            }
            (InvocationState::Dispatched, InvocationEvent::PreviewResolved) => {
                InvocationState::Persisted
            }
            (InvocationState::ResponseParsed, InvocationEvent::FieldsApplied) => {
                InvocationState::Applied
            }
            (InvocationState::Applied, InvocationEvent::RecordSaved) => {
                InvocationState::Persisted
            }
            (_, InvocationEvent::ErrorOccurred) if !self.is_terminal() => InvocationState::Failed,
            _ => {
                warn!(
                    "Invalid invocation transition from {:?} with event {:?}",
                    self.state, event
                );
                return Err(Error::pipeline(format!(
                    "Invalid transition from {:?} with event {:?}",
                    self.state, event
                )));
            }
        };

        info!(
            "Invocation {} state transition: {:?} -> {:?} (event: {:?})",
            self.invocation_id, old_state, new_state, event
        );

        self.state = new_state;
        Ok(())
    }

    /// Moves to `Failed` and returns the stage the invocation had reached.
    pub fn fail(&mut self) -> InvocationState {
        let reached = self.state.clone();
        if let Err(e) = self.transition(InvocationEvent::ErrorOccurred) {
            warn!("{}", e);
        }
        reached
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            InvocationState::Persisted | InvocationState::Failed
        )
    }
}
