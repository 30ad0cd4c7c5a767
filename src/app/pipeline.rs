//! The two pipeline stages shared by the CLI handlers.
//!
//! fetch: Banxico API -> per-series columns -> outer join -> CSV
//! plot:  CSV -> quarterly presence grid -> PNG
//!
//! The stages only communicate through the CSV file; each is meant to run as
//! its own process invocation.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::coverage::presence_matrix;
use crate::data::{BanxicoClient, SeriesSource, merge_series};
use crate::domain::{FetchConfig, MergedTable, PlotConfig, PresenceMatrix, SERIES_CATALOG, SeriesData, SeriesDescriptor};
use crate::error::{AppError, EXIT_NO_DATA};
use crate::io::{read_table_csv, write_table_csv};
use crate::plot::render_heatmap;

/// What happened to one series during a fetch run.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesStatus {
    Fetched {
        rows: usize,
        valid: usize,
        first: Option<NaiveDate>,
        last: Option<NaiveDate>,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOutcome {
    pub id: String,
    pub name: String,
    pub status: SeriesStatus,
}

impl SeriesOutcome {
    fn fetched(data: &SeriesData) -> Self {
        Self {
            id: data.id.clone(),
            name: data.name.clone(),
            status: SeriesStatus::Fetched {
                rows: data.observations.len(),
                valid: data.valid_count(),
                first: data.first_date(),
                last: data.last_date(),
            },
        }
    }

    fn failed(series: &SeriesDescriptor, err: &AppError) -> Self {
        Self {
            id: series.id.to_string(),
            name: series.name.to_string(),
            status: SeriesStatus::Failed {
                reason: err.message().to_string(),
            },
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self.status, SeriesStatus::Fetched { .. })
    }
}

/// All outputs of a single fetch run.
#[derive(Debug, Clone)]
pub struct FetchRun {
    pub outcomes: Vec<SeriesOutcome>,
    /// `None` when every series failed.
    pub table: Option<MergedTable>,
    /// Where the table was written, if it was.
    pub written: Option<PathBuf>,
}

impl FetchRun {
    pub fn fetched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_fetched()).count()
    }
}

/// Fetch every catalog series from Banxico and write the merged CSV.
pub fn run_fetch(config: &FetchConfig) -> Result<FetchRun, AppError> {
    // Token is resolved before any request goes out.
    let client = BanxicoClient::from_env(config)?;
    run_fetch_with_source(&client, &SERIES_CATALOG, config)
}

/// Fetch `catalog` from an arbitrary source, merge, and write the CSV.
///
/// Per-series failures are logged and skipped. If nothing was fetched the
/// CSV is left untouched and the run still returns `Ok`; see `enforce_strict`.
pub fn run_fetch_with_source<S: SeriesSource + ?Sized>(
    source: &S,
    catalog: &[SeriesDescriptor],
    config: &FetchConfig,
) -> Result<FetchRun, AppError> {
    info!(series = catalog.len(), "Starting Banxico data pipeline...");

    let mut fetched = Vec::new();
    let mut outcomes = Vec::with_capacity(catalog.len());

    for series in catalog {
        info!(series = series.id, "Fetching {}...", series.name);
        match source.fetch_series(series) {
            Ok(data) => {
                outcomes.push(SeriesOutcome::fetched(&data));
                fetched.push(data);
            }
            Err(err) => {
                warn!(series = series.id, error = %err, "Error fetching {}", series.name);
                outcomes.push(SeriesOutcome::failed(series, &err));
            }
        }
    }

    if fetched.is_empty() {
        warn!("No data fetched.");
        return Ok(FetchRun {
            outcomes,
            table: None,
            written: None,
        });
    }

    let table = merge_series(&fetched);
    write_table_csv(&config.data_file, &table)?;
    info!(
        path = %config.data_file.display(),
        rows = table.rows.len(),
        columns = table.columns.len(),
        "Success: database updated."
    );

    Ok(FetchRun {
        outcomes,
        table: Some(table),
        written: Some(config.data_file.clone()),
    })
}

/// With `--strict`, a run that fetched nothing is a hard failure.
pub fn enforce_strict(run: &FetchRun, config: &FetchConfig) -> Result<(), AppError> {
    if config.strict && run.table.is_none() {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!("No data fetched: all {} series failed.", run.outcomes.len()),
        ));
    }
    Ok(())
}

/// All outputs of a single plot run.
#[derive(Debug, Clone)]
pub struct PlotRun {
    pub matrix: PresenceMatrix,
    pub plot_file: PathBuf,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

/// Read the CSV, aggregate presence per quarter, and render the PNG.
pub fn run_plot(config: &PlotConfig) -> Result<PlotRun, AppError> {
    info!("Generating visualization...");

    let table = read_table_csv(&config.data_file)?;
    let matrix = presence_matrix(&table);
    info!(
        series = matrix.series.len(),
        quarters = matrix.quarters.len(),
        "presence matrix built"
    );

    render_heatmap(&matrix, &config.plot_file, config.image_size())?;
    info!("Success: plot saved to {}", config.plot_file.display());

    Ok(PlotRun {
        matrix,
        plot_file: config.plot_file.clone(),
        first: table.first_date(),
        last: table.last_date(),
    })
}
