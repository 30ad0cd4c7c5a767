//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - turns arguments into validated stage configs
//! - runs the requested stage and prints its report

use std::path::Path;
use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, FetchArgs, PlotArgs};
use crate::domain::{FetchConfig, PlotConfig, SERIES_CATALOG};
use crate::error::AppError;

pub mod pipeline;

const MAX_DPI: u32 = 600;

/// Entry point for the `bmx` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init();

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Plot(args) => handle_plot(args),
        Command::Series => {
            println!("{}", crate::report::format_series_catalog(&SERIES_CATALOG));
            Ok(())
        }
    }
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = fetch_config_from_args(&args)?;
    let run = pipeline::run_fetch(&config)?;

    println!("{}", crate::report::format_fetch_summary(&run));

    pipeline::enforce_strict(&run, &config)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let config = plot_config_from_args(&args)?;
    let run = pipeline::run_plot(&config)?;

    if config.ascii {
        println!("{}", crate::plot::render_ascii_grid(&run.matrix));
    }
    println!("{}", crate::report::format_plot_summary(&run));
    Ok(())
}

pub fn fetch_config_from_args(args: &FetchArgs) -> Result<FetchConfig, AppError> {
    if args.timeout_secs == 0 || args.connect_timeout_secs == 0 {
        return Err(AppError::config("Timeouts must be at least 1 second."));
    }
    let base_url = args.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(AppError::config(format!(
            "Invalid --base-url '{base_url}': expected an http(s) URL."
        )));
    }

    Ok(FetchConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(args.timeout_secs),
        connect_timeout: Duration::from_secs(args.connect_timeout_secs),
        data_file: args.data_file.clone(),
        strict: args.strict,
    })
}

pub fn plot_config_from_args(args: &PlotArgs) -> Result<PlotConfig, AppError> {
    if args.dpi == 0 || args.dpi > MAX_DPI {
        return Err(AppError::config(format!(
            "Invalid --dpi {}: expected 1..={MAX_DPI}.",
            args.dpi
        )));
    }
    if !has_png_extension(&args.output) {
        return Err(AppError::config(format!(
            "Output '{}' must have a .png extension.",
            args.output.display()
        )));
    }

    Ok(PlotConfig {
        data_file: args.data_file.clone(),
        plot_file: args.output.clone(),
        dpi: args.dpi,
        ascii: args.ascii,
    })
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::EXIT_CONFIG;

    fn fetch_args() -> FetchArgs {
        FetchArgs {
            data_file: PathBuf::from("data/banxico_rates.csv"),
            base_url: "https://www.banxico.org.mx/SieAPIRest/service/v1/series".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            strict: false,
        }
    }

    fn plot_args() -> PlotArgs {
        PlotArgs {
            data_file: PathBuf::from("data/banxico_rates.csv"),
            output: PathBuf::from("plots/data_availability.png"),
            dpi: 150,
            ascii: false,
        }
    }

    #[test]
    fn fetch_config_carries_explicit_timeouts() {
        let config = fetch_config_from_args(&fetch_args()).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = FetchArgs {
            timeout_secs: 0,
            ..fetch_args()
        };
        assert_eq!(fetch_config_from_args(&args).unwrap_err().exit_code(), EXIT_CONFIG);
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let args = FetchArgs {
            base_url: "ftp://example".to_string(),
            ..fetch_args()
        };
        assert!(fetch_config_from_args(&args).is_err());
    }

    #[test]
    fn plot_config_validates_dpi_and_extension() {
        let config = plot_config_from_args(&plot_args()).unwrap();
        assert_eq!(config.image_size(), (2250, 1500));

        let bad_dpi = PlotArgs {
            dpi: 0,
            ..plot_args()
        };
        assert!(plot_config_from_args(&bad_dpi).is_err());

        let bad_ext = PlotArgs {
            output: PathBuf::from("plots/out.jpg"),
            ..plot_args()
        };
        assert_eq!(plot_config_from_args(&bad_ext).unwrap_err().exit_code(), EXIT_CONFIG);
    }
}
