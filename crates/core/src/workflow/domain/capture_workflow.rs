use thiserror::Error;

use crate::capture::domain::frame_source::FrameSource;
use crate::scoring::domain::score_result::ScoreResult;
use crate::scoring::domain::scoring_service::ScoringError;
use crate::scoring::domain::submission_request::SubmissionRequest;
use crate::shared::config::KioskConfig;
use crate::shared::constants::{COUNTDOWN_START, DEFAULT_JPEG_QUALITY, PROCESSING_TEXT};
use crate::shared::frame::Frame;
use crate::workflow::domain::display_name::DisplayName;
use crate::workflow::domain::workflow_observer::{NullWorkflowObserver, WorkflowObserver};
use crate::workflow::domain::workflow_state::WorkflowState;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("a submission is already in progress ({0})")]
    Busy(&'static str),
    #[error("a display name is required")]
    EmptyName,
    #[error("no countdown is running (state: {0})")]
    NotCountingDown(&'static str),
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("upload failed: {0}")]
    Upload(#[source] ScoringError),
    #[error("countdown cancelled")]
    Cancelled,
}

/// Result of advancing the countdown by one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; the value now shown.
    Counting(u32),
    /// Countdown reached zero and the workflow is in `Capturing`.
    ReadyToCapture,
}

/// State machine for one photo submission at a time.
///
/// The controller owns no timers or threads: callers drive it with
/// [`tick`](Self::tick) once per interval and hand it frames and upload
/// outcomes, so the same object runs under a blocking loop or a GUI event
/// loop. Starting while a submission is in flight is rejected.
pub struct CaptureWorkflow {
    state: WorkflowState,
    countdown_start: u32,
    jpeg_quality: u8,
    pending_name: Option<DisplayName>,
    last_result: Option<ScoreResult>,
    last_error: Option<String>,
    observer: Box<dyn WorkflowObserver>,
}

impl CaptureWorkflow {
    pub fn new(countdown_start: u32, jpeg_quality: u8) -> Self {
        Self {
            state: WorkflowState::Idle,
            countdown_start,
            jpeg_quality,
            pending_name: None,
            last_result: None,
            last_error: None,
            observer: Box::new(NullWorkflowObserver),
        }
    }

    pub fn from_config(config: &KioskConfig) -> Self {
        Self::new(config.countdown_start, config.jpeg_quality)
    }

    pub fn with_observer(mut self, observer: Box<dyn WorkflowObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Most recent successful result. Survives failed submissions.
    pub fn last_result(&self) -> Option<&ScoreResult> {
        self.last_result.as_ref()
    }

    /// Error from the most recent submission, cleared by the next start.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn countdown_start(&self) -> u32 {
        self.countdown_start
    }

    /// Overlay text for the camera view: the countdown digit, or the
    /// processing notice while capturing and uploading.
    pub fn status_text(&self) -> Option<String> {
        match self.state {
            WorkflowState::Countdown(n) => Some(n.to_string()),
            WorkflowState::Capturing | WorkflowState::Uploading => {
                Some(PROCESSING_TEXT.to_string())
            }
            WorkflowState::Idle | WorkflowState::Displaying(_) => None,
        }
    }

    pub fn start(&mut self, name: &str) -> Result<(), WorkflowError> {
        if self.state.is_busy() {
            return Err(WorkflowError::Busy(self.state.name()));
        }
        let name = DisplayName::parse(name).ok_or(WorkflowError::EmptyName)?;

        log::info!("Starting submission for '{name}'");
        self.pending_name = Some(name);
        self.last_error = None;
        self.transition(WorkflowState::Countdown(self.countdown_start));
        if self.countdown_start == 0 {
            self.transition(WorkflowState::Capturing);
        }
        Ok(())
    }

    /// Advances the countdown by one step. Reaching zero moves straight on
    /// to `Capturing`.
    pub fn tick(&mut self) -> Result<TickOutcome, WorkflowError> {
        let WorkflowState::Countdown(n) = self.state else {
            return Err(WorkflowError::NotCountingDown(self.state.name()));
        };
        if n > 0 {
            self.transition(WorkflowState::Countdown(n - 1));
            if n - 1 > 0 {
                return Ok(TickOutcome::Counting(n - 1));
            }
        }
        self.transition(WorkflowState::Capturing);
        Ok(TickOutcome::ReadyToCapture)
    }

    /// Aborts a running countdown. Returns whether anything was cancelled.
    pub fn cancel(&mut self) -> bool {
        if !matches!(self.state, WorkflowState::Countdown(_)) {
            return false;
        }
        self.pending_name = None;
        self.transition(WorkflowState::Idle);
        true
    }

    /// Grabs one frame from `source` and packages it for upload.
    pub fn capture(
        &mut self,
        source: &mut dyn FrameSource,
    ) -> Result<SubmissionRequest, WorkflowError> {
        self.ensure_state(&WorkflowState::Capturing, "capture")?;
        match source.capture() {
            Ok(frame) => self.capture_frame(&frame),
            Err(e) => Err(self.fail_capture(e.to_string())),
        }
    }

    /// Packages an already grabbed frame (e.g. the latest preview frame)
    /// for upload and fires the flash.
    pub fn capture_frame(&mut self, frame: &Frame) -> Result<SubmissionRequest, WorkflowError> {
        self.ensure_state(&WorkflowState::Capturing, "capture")?;
        let jpeg = match frame.encode_jpeg(self.jpeg_quality) {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail_capture(format!("JPEG encoding failed: {e}"))),
        };
        let Some(name) = self.pending_name.clone() else {
            return Err(self.fail_capture("no display name pending".into()));
        };

        self.observer.flash();
        self.transition(WorkflowState::Uploading);
        Ok(SubmissionRequest::new(name, jpeg))
    }

    /// Applies the upload response. `Ok` means the leaderboard should now
    /// be refreshed; on `Err` the previous result stays in place.
    pub fn finish_upload(
        &mut self,
        outcome: Result<ScoreResult, ScoringError>,
    ) -> Result<ScoreResult, WorkflowError> {
        self.ensure_state(&WorkflowState::Uploading, "finish upload")?;
        self.pending_name = None;

        match outcome {
            Ok(result) => {
                log::info!(
                    "'{}' scored {} ({})",
                    result.name,
                    result.score_label(),
                    result.smile_label()
                );
                self.last_result = Some(result.clone());
                self.transition(WorkflowState::Displaying(result.clone()));
                Ok(result)
            }
            Err(e) => {
                let message = e.to_string();
                self.observer.error(&message);
                self.last_error = Some(message);
                self.transition(WorkflowState::Idle);
                Err(WorkflowError::Upload(e))
            }
        }
    }

    fn ensure_state(
        &self,
        expected: &WorkflowState,
        action: &'static str,
    ) -> Result<(), WorkflowError> {
        if std::mem::discriminant(&self.state) == std::mem::discriminant(expected) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                action,
                state: self.state.name(),
            })
        }
    }

    fn fail_capture(&mut self, message: String) -> WorkflowError {
        self.observer.error(&message);
        self.last_error = Some(message.clone());
        self.pending_name = None;
        self.transition(WorkflowState::Idle);
        WorkflowError::Capture(message)
    }

    fn transition(&mut self, to: WorkflowState) {
        let from = std::mem::replace(&mut self.state, to);
        self.observer.transition(&from, &self.state);
    }
}

impl Default for CaptureWorkflow {
    fn default() -> Self {
        Self::new(COUNTDOWN_START, DEFAULT_JPEG_QUALITY)
    }
}
