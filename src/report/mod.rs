//! Report module - summarizing configurations and results

pub mod summary;

pub use summary::*;
