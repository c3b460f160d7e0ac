use std::sync::Arc;

use crate::scoring::domain::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::scoring::domain::scoring_service::{ScoringError, ScoringService};

/// Holds the last leaderboard fetched from the scoring service.
///
/// Every successful fetch replaces the list wholesale. A failed fetch is
/// logged and leaves the previous list on screen.
pub struct LeaderboardPoller {
    service: Arc<dyn ScoringService>,
    leaderboard: Leaderboard,
}

impl LeaderboardPoller {
    pub fn new(service: Arc<dyn ScoringService>) -> Self {
        Self {
            service,
            leaderboard: Leaderboard::default(),
        }
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Fetches on the calling thread and applies the outcome.
    pub fn fetch(&mut self) -> Result<(), ScoringError> {
        let outcome = self.service.scoreboard();
        self.apply(outcome)
    }

    /// Applies a fetch that ran elsewhere (e.g. on a worker thread).
    pub fn apply(
        &mut self,
        outcome: Result<Vec<LeaderboardEntry>, ScoringError>,
    ) -> Result<(), ScoringError> {
        match outcome {
            Ok(entries) => {
                log::info!("Leaderboard refreshed ({} entries)", entries.len());
                self.leaderboard = Leaderboard::new(entries);
                Ok(())
            }
            Err(e) => {
                log::warn!("Leaderboard fetch failed, keeping previous data: {e}");
                Err(e)
            }
        }
    }
}
