//! JSON shapes of the scoring service and their validation into domain types.

use serde::Deserialize;

use crate::scoring::domain::leaderboard::LeaderboardEntry;
use crate::scoring::domain::score_result::ScoreResult;
use crate::scoring::domain::scoring_service::ScoringError;

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    name: String,
    score: f64,
    smile_percentage: f64,
    image_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreboardResponse {
    top_3: Vec<ScoreboardRow>,
}

#[derive(Debug, Deserialize)]
struct ScoreboardRow {
    name: String,
    score: f64,
    image_url: String,
}

impl UploadResponse {
    pub(crate) fn into_domain(self) -> Result<ScoreResult, ScoringError> {
        ensure_finite("score", self.score)?;
        ensure_finite("smile_percentage", self.smile_percentage)?;
        if !(0.0..=100.0).contains(&self.smile_percentage) {
            return Err(ScoringError::InvalidResponse(format!(
                "smile_percentage must be within 0..=100, got {}",
                self.smile_percentage
            )));
        }
        Ok(ScoreResult {
            name: self.name,
            score: self.score,
            smile_percentage: self.smile_percentage,
            image_url: self.image_url,
        })
    }
}

impl ScoreboardResponse {
    pub(crate) fn into_domain(self) -> Result<Vec<LeaderboardEntry>, ScoringError> {
        self.top_3
            .into_iter()
            .map(|row| {
                ensure_finite("score", row.score)?;
                Ok(LeaderboardEntry {
                    name: row.name,
                    score: row.score,
                    image_url: row.image_url,
                })
            })
            .collect()
    }
}

fn ensure_finite(field: &str, value: f64) -> Result<(), ScoringError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScoringError::InvalidResponse(format!(
            "{field} is not a finite number"
        )))
    }
}
