use crate::workflow::domain::workflow_state::WorkflowState;

/// Observes workflow events without taking part in them.
///
/// Lets the CLI print a countdown, the desktop app trigger its flash
/// overlay, and tests record transitions, all without changing the
/// controller.
pub trait WorkflowObserver: Send {
    /// Called after every state change.
    fn transition(&mut self, from: &WorkflowState, to: &WorkflowState);

    /// Fire-and-forget camera flash, emitted once per capture.
    fn flash(&mut self) {}

    /// A locally recovered failure (capture or upload).
    fn error(&mut self, _message: &str) {}
}

/// Discards all events.
pub struct NullWorkflowObserver;

impl WorkflowObserver for NullWorkflowObserver {
    fn transition(&mut self, _from: &WorkflowState, _to: &WorkflowState) {}
}

/// Forwards events to the `log` facade.
pub struct LogWorkflowObserver;

impl WorkflowObserver for LogWorkflowObserver {
    fn transition(&mut self, from: &WorkflowState, to: &WorkflowState) {
        log::debug!("Workflow {from} -> {to}");
    }

    fn flash(&mut self) {
        log::debug!("Flash");
    }

    fn error(&mut self, message: &str) {
        log::warn!("Submission failed: {message}");
    }
}
