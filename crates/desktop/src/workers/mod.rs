pub mod camera_worker;
pub mod service_worker;
