//! Plain-text reports printed to stdout after each stage.

pub mod format;

pub use format::*;
