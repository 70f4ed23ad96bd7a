//! CLI module - argument parsing, interactive prompts and the two command flows

pub mod args;
pub mod prompts;
pub mod render_cmd;
pub mod video_cmd;

pub use args::{Cli, Commands, HostTarget, RenderArgs};
pub use prompts::*;
pub use render_cmd::{render_session, run_render};
pub use video_cmd::run_video;
