pub mod fsm;
mod invoker;

pub use fsm::{InvocationEvent, InvocationState, InvocationStateMachine};
pub use invoker::{InvocationOutcome, Invoker};
