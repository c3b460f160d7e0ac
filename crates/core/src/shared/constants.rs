use std::time::Duration;

/// First value shown by the pre-capture countdown.
pub const COUNTDOWN_START: u32 = 3;
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";
pub const BASE_URL_ENV: &str = "SMILEBOOTH_BASE_URL";

pub const UPLOAD_PATH: &str = "upload-image/";
pub const SCOREBOARD_PATH: &str = "scoreboard/";
pub const UPLOAD_FILE_NAME: &str = "captured-image.jpg";
pub const UPLOAD_MIME: &str = "image/jpeg";

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Percentages strictly above this are rendered in the high band.
pub const HIGH_BAND_THRESHOLD: f64 = 80.0;
/// Percentages at or above this (and not high) are rendered in the mid band.
pub const MID_BAND_THRESHOLD: f64 = 50.0;

pub const PROCESSING_TEXT: &str = "Processing your face...";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

#[cfg(target_os = "linux")]
pub const DEFAULT_CAMERA_FORMAT: &str = "v4l2";
#[cfg(target_os = "linux")]
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_FORMAT: &str = "avfoundation";
#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_DEVICE: &str = "0";

#[cfg(target_os = "windows")]
pub const DEFAULT_CAMERA_FORMAT: &str = "dshow";
#[cfg(target_os = "windows")]
pub const DEFAULT_CAMERA_DEVICE: &str = "video=Integrated Camera";

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_CAMERA_FORMAT: &str = "v4l2";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";
