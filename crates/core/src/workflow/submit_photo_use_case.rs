use std::sync::Arc;

use crate::capture::domain::frame_source::FrameSource;
use crate::scoring::domain::score_result::ScoreResult;
use crate::scoring::domain::scoring_service::ScoringService;
use crate::workflow::domain::capture_workflow::{CaptureWorkflow, TickOutcome, WorkflowError};
use crate::workflow::infrastructure::countdown_timer::{CountdownTimer, TimerEvent};
use crate::workflow::leaderboard_poller::LeaderboardPoller;

/// Blocking kiosk session: countdown → capture → upload → leaderboard
/// refresh, one submission per [`execute`](Self::execute) call.
///
/// The leaderboard refresh starts only after the upload response has been
/// applied to the workflow.
pub struct SubmitPhotoUseCase {
    workflow: CaptureWorkflow,
    source: Box<dyn FrameSource>,
    service: Arc<dyn ScoringService>,
    poller: LeaderboardPoller,
    timer: CountdownTimer,
}

impl SubmitPhotoUseCase {
    pub fn new(
        workflow: CaptureWorkflow,
        source: Box<dyn FrameSource>,
        service: Arc<dyn ScoringService>,
        timer: CountdownTimer,
    ) -> Self {
        let poller = LeaderboardPoller::new(Arc::clone(&service));
        Self {
            workflow,
            source,
            service,
            poller,
            timer,
        }
    }

    pub fn workflow(&self) -> &CaptureWorkflow {
        &self.workflow
    }

    pub fn poller(&self) -> &LeaderboardPoller {
        &self.poller
    }

    /// Initial leaderboard load. Failure is logged by the poller and is not
    /// fatal: the kiosk starts with an empty board.
    pub fn mount(&mut self) {
        let _ = self.poller.fetch();
    }

    /// Runs one full submission for `name`.
    pub fn execute(&mut self, name: &str) -> Result<ScoreResult, WorkflowError> {
        self.timer.reset();
        self.workflow.start(name)?;

        if self.workflow.countdown_start() > 0 {
            loop {
                if self.timer.wait() == TimerEvent::Cancelled {
                    self.workflow.cancel();
                    return Err(WorkflowError::Cancelled);
                }
                if self.workflow.tick()? == TickOutcome::ReadyToCapture {
                    break;
                }
            }
        }

        let request = self.workflow.capture(self.source.as_mut())?;
        let outcome = self.service.upload(&request);
        drop(request);

        let result = self.workflow.finish_upload(outcome)?;
        let _ = self.poller.fetch();
        Ok(result)
    }
}

impl Drop for SubmitPhotoUseCase {
    fn drop(&mut self) {
        self.source.close();
    }
}
