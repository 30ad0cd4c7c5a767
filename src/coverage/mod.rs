//! Data-completeness aggregation.
//!
//! Turns a merged table into a series × quarter presence grid that the
//! plotting code renders.

pub mod presence;

pub use presence::*;
