pub mod leaderboard;
pub mod score_result;
pub mod scoring_service;
pub mod submission_request;
