//! Video utility - stitch a PNG sequence into a video file with ffmpeg

pub mod config;
pub mod encode;
pub mod session;

pub use config::*;
pub use encode::*;
pub use session::*;
