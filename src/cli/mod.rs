//! Command-line parsing for the Banxico fetch/plot pipeline.
//!
//! Argument parsing and command dispatch stay here; the pipeline only sees
//! the resolved `FetchConfig` / `PlotConfig`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DATA_FILE, DEFAULT_DPI, DEFAULT_PLOT_FILE,
    DEFAULT_TIMEOUT_SECS,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "bmx",
    version,
    about = "Banxico government securities fetcher and data-availability plot"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download every configured series and write the merged CSV.
    ///
    /// Requires `BANXICO_TOKEN` in the environment (or a `.env` file).
    Fetch(FetchArgs),
    /// Read the merged CSV and render the quarterly availability heatmap.
    Plot(PlotArgs),
    /// List the configured series.
    Series,
}

#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Base URL of the SIE series endpoint.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Total per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,

    /// Exit with code 3 when no series could be fetched.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Input CSV produced by `bmx fetch`.
    #[arg(long, value_name = "CSV", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Output PNG path.
    #[arg(short = 'o', long, value_name = "PNG", default_value = DEFAULT_PLOT_FILE)]
    pub output: PathBuf,

    /// Resolution of the 15x10 inch figure.
    #[arg(long, default_value_t = DEFAULT_DPI)]
    pub dpi: u32,

    /// Also print the availability grid as text.
    #[arg(long)]
    pub ascii: bool,
}
