use crate::scoring::domain::score_result::ScoreResult;

/// Position of the capture workflow in its single-submission cycle.
///
/// `Idle → Countdown(n) → Capturing → Uploading → Displaying(result)`, and
/// back to `Countdown` when the next participant starts.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    Countdown(u32),
    Capturing,
    Uploading,
    Displaying(ScoreResult),
}

impl WorkflowState {
    /// True while a submission is between start and upload response.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            WorkflowState::Countdown(_) | WorkflowState::Capturing | WorkflowState::Uploading
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Countdown(_) => "countdown",
            WorkflowState::Capturing => "capturing",
            WorkflowState::Uploading => "uploading",
            WorkflowState::Displaying(_) => "displaying",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowState::Countdown(n) => write!(f, "countdown({n})"),
            WorkflowState::Displaying(result) => write!(f, "displaying({})", result.name),
            other => f.write_str(other.name()),
        }
    }
}
