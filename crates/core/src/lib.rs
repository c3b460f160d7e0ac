pub mod capture;
pub mod scoring;
pub mod shared;
pub mod workflow;
