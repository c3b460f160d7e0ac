pub mod domain;
pub mod infrastructure;
pub mod leaderboard_poller;
pub mod submit_photo_use_case;
