use thiserror::Error;

use crate::scoring::domain::leaderboard::LeaderboardEntry;
use crate::scoring::domain::score_result::ScoreResult;
use crate::scoring::domain::submission_request::SubmissionRequest;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("could not build request: {0}")]
    Request(String),
}

/// Domain interface for the remote scoring service.
///
/// The service owns detection, scoring and ranking; callers only move
/// images in and results out.
pub trait ScoringService: Send + Sync {
    /// Uploads one photo and returns the score the service assigned.
    fn upload(&self, request: &SubmissionRequest) -> Result<ScoreResult, ScoringError>;

    /// Returns the current leaderboard in rank order.
    fn scoreboard(&self) -> Result<Vec<LeaderboardEntry>, ScoringError>;

    /// Downloads the bytes behind an `image_url` returned by the service.
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScoringError>;
}
