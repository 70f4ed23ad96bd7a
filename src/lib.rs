//! Rendercue: interactive batch rendering utilities
//!
//! Two terminal tools share this library: a render utility that assembles a
//! render configuration, projects it onto a 3D application's scene and starts
//! the batch render, and a video utility that stitches a PNG sequence into a
//! video file with ffmpeg.

pub mod cli;
pub mod host;
pub mod render;
pub mod report;
pub mod utils;
pub mod video;
