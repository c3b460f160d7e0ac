pub mod countdown_timer;
