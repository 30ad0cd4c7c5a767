//! `bmx-coverage` library crate.
//!
//! The binary (`bmx`) is a thin wrapper around this library so that:
//!
//! - both pipeline stages are testable without spawning processes
//! - the HTTP client can be swapped for canned data behind `SeriesSource`

pub mod app;
pub mod cli;
pub mod coverage;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
