use std::path::PathBuf;

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Serves the same image file as every captured frame.
///
/// Stands in for a camera on kiosks without one and in demos. The file is
/// decoded once and cached.
pub struct StillImageSource {
    path: PathBuf,
    frame: Option<Frame>,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frame: None,
        }
    }

    fn decode(&self) -> Result<Frame, image::ImageError> {
        let img = image::open(&self.path)?.to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height))
    }
}

impl FrameSource for StillImageSource {
    fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        if self.frame.is_none() {
            self.frame = Some(self.decode()?);
        }
        self.frame
            .clone()
            .ok_or_else(|| "StillImageSource: no frame decoded".into())
    }

    fn close(&mut self) {
        self.frame = None;
    }
}
