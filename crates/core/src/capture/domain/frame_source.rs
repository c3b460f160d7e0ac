use crate::shared::frame::Frame;

/// Delivers frames from a camera or stand-in source.
///
/// Implementations may hold an open device between calls, hence `&mut self`.
pub trait FrameSource: Send {
    /// Grabs the next available frame.
    fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>>;

    /// Releases the device. Capturing again reopens it.
    fn close(&mut self) {}
}
