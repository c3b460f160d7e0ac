pub mod capture_workflow;
pub mod display_name;
pub mod workflow_observer;
pub mod workflow_state;
