//! Upstream data: the Banxico client and the per-series merge.

pub mod banxico;
pub mod merge;

pub use banxico::*;
pub use merge::*;
