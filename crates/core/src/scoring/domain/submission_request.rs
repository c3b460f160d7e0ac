use crate::workflow::domain::display_name::DisplayName;

/// One captured photo ready for upload. Consumed by the upload call.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub display_name: DisplayName,
    pub image_jpeg: Vec<u8>,
}

impl SubmissionRequest {
    pub fn new(display_name: DisplayName, image_jpeg: Vec<u8>) -> Self {
        Self {
            display_name,
            image_jpeg,
        }
    }
}
