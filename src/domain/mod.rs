//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the static series catalog (`SeriesDescriptor`, `SERIES_CATALOG`)
//! - per-series observations and the merged date table (`SeriesData`, `MergedTable`)
//! - calendar quarters and the derived presence grid (`Quarter`, `PresenceMatrix`)
//! - resolved run configuration (`FetchConfig`, `PlotConfig`)

pub mod types;

pub use types::*;
