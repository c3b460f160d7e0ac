pub mod ffmpeg_camera_source;
pub mod frame_source_factory;
pub mod still_image_source;
