//! Render utility - configure a host scene and trigger its batch render

pub mod assemble;
pub mod config;
pub mod invoke;
pub mod project;

pub use assemble::*;
pub use config::*;
pub use invoke::*;
pub use project::*;
