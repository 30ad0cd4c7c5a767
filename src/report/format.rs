//! Formatted terminal output.
//!
//! Kept separate from the pipeline so the stage logic stays free of
//! presentation details and output changes stay local.

use crate::app::pipeline::{FetchRun, PlotRun, SeriesStatus};
use crate::domain::SeriesDescriptor;

/// Per-series table of what the fetch stage did.
pub fn format_fetch_summary(run: &FetchRun) -> String {
    let mut out = String::new();

    out.push_str("=== bmx - Banxico fetch summary ===\n");
    out.push_str(&format!(
        "Fetched: {}/{} series\n",
        run.fetched_count(),
        run.outcomes.len()
    ));

    match (&run.table, &run.written) {
        (Some(table), Some(path)) => {
            let range = match (table.first_date(), table.last_date()) {
                (Some(a), Some(b)) => format!("{a}..{b}"),
                _ => "-".to_string(),
            };
            out.push_str(&format!(
                "Table: {} rows x {} series ({range}) -> {}\n",
                table.rows.len(),
                table.columns.len(),
                path.display()
            ));
        }
        _ => out.push_str("Table: not written (no data fetched)\n"),
    }

    let name_width = run
        .outcomes
        .iter()
        .map(|o| o.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("series".len());

    out.push('\n');
    out.push_str(&format!(
        "{:<8} {:<name_width$} {:<6} {:>6} {:>6}  {:<10}  {:<10}\n",
        "id", "series", "status", "rows", "valid", "first", "last"
    ));

    for o in &run.outcomes {
        match &o.status {
            SeriesStatus::Fetched {
                rows,
                valid,
                first,
                last,
            } => {
                let first = first.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
                let last = last.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "{:<8} {:<name_width$} {:<6} {:>6} {:>6}  {:<10}  {:<10}\n",
                    o.id, o.name, "ok", rows, valid, first, last
                ));
            }
            SeriesStatus::Failed { reason } => {
                out.push_str(&format!(
                    "{:<8} {:<name_width$} {:<6} {reason}\n",
                    o.id, o.name, "FAILED"
                ));
            }
        }
    }

    out.trim_end().to_string()
}

/// One-line recap of a plot run.
pub fn format_plot_summary(run: &PlotRun) -> String {
    let range = match (run.first, run.last) {
        (Some(a), Some(b)) => format!("{a}..{b}"),
        _ => "-".to_string(),
    };
    let (first_q, last_q) = match (run.matrix.quarters.first(), run.matrix.quarters.last()) {
        (Some(a), Some(b)) => (a.to_string(), b.to_string()),
        _ => ("-".to_string(), "-".to_string()),
    };
    format!(
        "Plot: {} series x {} quarters ({first_q}..{last_q}, data {range}) -> {}",
        run.matrix.series.len(),
        run.matrix.quarters.len(),
        run.plot_file.display()
    )
}

/// The configured series catalog, one per line.
pub fn format_series_catalog(catalog: &[SeriesDescriptor]) -> String {
    catalog
        .iter()
        .map(|s| format!("{:<8} {}", s.id, s.name))
        .collect::<Vec<_>>()
        .join("\n")
}
