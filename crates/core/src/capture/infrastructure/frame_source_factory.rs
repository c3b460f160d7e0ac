use crate::capture::domain::frame_source::FrameSource;
use crate::capture::infrastructure::ffmpeg_camera_source::FfmpegCameraSource;
use crate::capture::infrastructure::still_image_source::StillImageSource;
use crate::shared::config::CameraConfig;

/// Picks the still-image stand-in when one is configured, the capture
/// device otherwise.
pub fn create_frame_source(config: &CameraConfig) -> Box<dyn FrameSource> {
    match &config.still_image {
        Some(path) => {
            log::info!("Using still image {} as camera", path.display());
            Box::new(StillImageSource::new(path))
        }
        None => Box::new(FfmpegCameraSource::new(config.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_image_config_serves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        image::RgbImage::new(6, 4).save(&path).unwrap();

        let mut source = create_frame_source(&CameraConfig {
            still_image: Some(path),
            ..CameraConfig::default()
        });
        let frame = source.capture().unwrap();
        assert_eq!((frame.width(), frame.height()), (6, 4));
    }
}
