use thiserror::Error;

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::config::CameraConfig;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("failed to initialise ffmpeg: {0}")]
    Init(#[source] ffmpeg_next::Error),
    #[error("capture input format '{0}' is not available in this ffmpeg build")]
    NoInputFormat(String),
    #[error("failed to open camera {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("camera {0} exposes no video stream")]
    NoVideoStream(String),
    #[error("failed to decode camera frame: {0}")]
    Decode(#[source] ffmpeg_next::Error),
    #[error("camera stream ended")]
    EndOfStream,
}

/// Grabs frames from a capture device through libavdevice.
///
/// The device is opened on the first capture and kept open so the preview
/// loop does not renegotiate formats on every frame. A failed capture
/// drops the session; the next call reopens the device.
pub struct FfmpegCameraSource {
    config: CameraConfig,
    session: Option<CameraSession>,
}

struct CameraSession {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: FfmpegCameraSource is owned by a single capture thread at a time.
// The raw pointers inside ffmpeg types are never shared across threads.
unsafe impl Send for FfmpegCameraSource {}

impl FfmpegCameraSource {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    fn open(&self) -> Result<CameraSession, CameraError> {
        ffmpeg_next::init().map_err(CameraError::Init)?;
        ffmpeg_next::device::register_all();

        let driver = self.config.input_format();
        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == driver)
            .ok_or_else(|| CameraError::NoInputFormat(driver.to_string()))?;

        let mut options = ffmpeg_next::Dictionary::new();
        if let (Some(w), Some(h)) = (self.config.width, self.config.height) {
            options.set("video_size", &format!("{w}x{h}"));
        }
        if let Some(fps) = self.config.framerate {
            options.set("framerate", &fps.to_string());
        }

        let device = self.config.device.as_str();
        log::info!("Opening camera {device} via {driver}");
        let ctx = ffmpeg_next::format::open_with(&self.config.device, &format, options)
            .map_err(|e| CameraError::Open {
                device: device.to_string(),
                source: e,
            })?;
        let ictx = match ctx {
            ffmpeg_next::format::context::Context::Input(input) => input,
            ffmpeg_next::format::context::Context::Output(_) => {
                return Err(CameraError::NoVideoStream(device.to_string()))
            }
        };

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| CameraError::NoVideoStream(device.to_string()))?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(CameraError::Decode)?;
        let decoder = codec_ctx.decoder().video().map_err(CameraError::Decode)?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(CameraError::Decode)?;
        log::debug!("Camera negotiated {width}x{height} {:?}", decoder.format());

        Ok(CameraSession {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        })
    }
}

impl CameraSession {
    fn next_frame(&mut self) -> Result<Frame, CameraError> {
        if let Some(frame) = self.try_receive()? {
            return Ok(frame);
        }
        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                return Err(CameraError::EndOfStream);
            };
            if stream.index() != self.stream_index {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            if let Some(frame) = self.try_receive()? {
                return Ok(frame);
            }
        }
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, CameraError> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler
            .run(&decoded, &mut rgb)
            .map_err(CameraError::Decode)?;
        let pixels = extract_rgb_pixels(&rgb, self.width, self.height);
        Ok(Some(Frame::new(pixels, self.width, self.height)))
    }
}

/// Copies RGB24 rows out of a possibly padded ffmpeg frame.
fn extract_rgb_pixels(
    rgb: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * Frame::CHANNELS;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

impl FrameSource for FfmpegCameraSource {
    fn capture(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        if self.session.is_none() {
            self.session = Some(self.open()?);
        }
        let Some(session) = self.session.as_mut() else {
            return Err("FfmpegCameraSource: camera not open".into());
        };
        match session.next_frame() {
            Ok(frame) => Ok(frame),
            Err(e) => {
                log::warn!("Camera capture failed, closing device: {e}");
                self.session = None;
                Err(Box::new(e))
            }
        }
    }

    fn close(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_input_format_is_reported() {
        let mut source = FfmpegCameraSource::new(CameraConfig {
            input_format: Some("no-such-grabber".into()),
            ..CameraConfig::default()
        });
        let err = source.capture().unwrap_err();
        assert!(err.to_string().contains("no-such-grabber"));
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut source = FfmpegCameraSource::new(CameraConfig::default());
        source.close();
        source.close();
        assert!(source.session.is_none());
    }
}
