pub mod leaderboard_panel;
pub mod primary_button;
pub mod result_card;
pub mod smile_bar;
