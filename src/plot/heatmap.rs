//! PNG heatmap of series availability, rendered with Plotters.
//!
//! Layout: one row per series (first series on top), one column per quarter,
//! light red for "no observation" and green for "at least one observation".
//! The bitmap is drawn into a staged temp file and renamed into place only
//! after Plotters has finished encoding it.

use std::any::Any;
use std::ops::Range;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, ValueFormatter};
use plotters::prelude::*;
use tracing::{debug, error};

use crate::domain::PresenceMatrix;
use crate::error::{AppError, EXIT_VISUALIZE, error_chain};
use crate::io::atomic::StagedFile;
use crate::plot::year_ticks;

pub const TITLE: &str = "Timeline of Mexican Government Securities Availability";
const X_DESC: &str = "Year";
const Y_DESC: &str = "Instrument";

const ABSENT_COLOR: RGBColor = RGBColor(0xff, 0xeb, 0xeb);
const PRESENT_COLOR: RGBColor = RGBColor(0x28, 0xa7, 0x45);

/// Font sizes below are tuned for a 1500 px tall image and scaled from there.
const REFERENCE_HEIGHT_PX: f64 = 1500.0;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Render `matrix` to a PNG at `path` with the given pixel size.
///
/// Both drawing errors and panics raised inside the backend are turned into
/// an exit-code-1 `AppError`; the destination is never left half-written.
pub fn render_heatmap(matrix: &PresenceMatrix, path: &Path, size: (u32, u32)) -> Result<(), AppError> {
    if matrix.series.is_empty() || matrix.quarters.is_empty() {
        return Err(AppError::visualize("Nothing to plot: the presence matrix is empty."));
    }
    if size.0 == 0 || size.1 == 0 {
        return Err(AppError::visualize(format!(
            "Invalid image size {}x{}.",
            size.0, size.1
        )));
    }

    let staged = StagedFile::new(path, EXIT_VISUALIZE)?;
    debug!(staging = %staged.path().display(), "rendering heatmap");

    match catch_unwind(AssertUnwindSafe(|| draw(matrix, staged.path(), size))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            let detail = error_chain(e.as_ref());
            error!(error = %detail, "heatmap rendering failed");
            return Err(AppError::visualize(format!(
                "An error occurred during plotting: {detail}"
            )));
        }
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            error!(panic = %detail, "heatmap renderer panicked");
            return Err(AppError::visualize(format!(
                "An error occurred during plotting: {detail}"
            )));
        }
    }

    staged.commit()?;
    Ok(())
}

fn draw(matrix: &PresenceMatrix, out: &Path, size: (u32, u32)) -> DrawResult {
    let n_s = matrix.series.len();

    let scale = f64::from(size.1) / REFERENCE_HEIGHT_PX;
    let pt = |v: f64| (v * scale).round().max(8.0);
    let px = |v: f64| (v * scale).round().max(1.0) as u32;

    let x_axis = CellAxis::new(year_ticks(&matrix.quarters));
    let y_axis = CellAxis::new((0..n_s).map(|y| row_label(matrix, y)).collect());

    let longest_name = matrix
        .series
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0) as f64;

    let root = BitMapBackend::new(out, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", pt(32.0)))
        .margin(px(24.0))
        .x_label_area_size(px(80.0))
        .y_label_area_size(px(longest_name * 11.0 + 60.0))
        .build_cartesian_2d(x_axis, y_axis)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .axis_desc_style(("sans-serif", pt(24.0)))
        .label_style(("sans-serif", pt(18.0)))
        .draw()?;

    let cell = |qi: usize, si: usize| {
        let x = qi as f64;
        // Row 0 is drawn at the top.
        let y = (n_s - 1 - si) as f64;
        [(x, y), (x + 1.0, y + 1.0)]
    };

    chart.draw_series(matrix.cells.iter().enumerate().flat_map(|(si, row)| {
        row.iter().enumerate().map(move |(qi, &present)| {
            let color = if present { PRESENT_COLOR } else { ABSENT_COLOR };
            Rectangle::new(cell(qi, si), color.filled())
        })
    }))?;

    // Thin white borders between cells.
    let border = WHITE.stroke_width(px(1.0));
    chart.draw_series(matrix.cells.iter().enumerate().flat_map(|(si, row)| {
        (0..row.len()).map(move |qi| Rectangle::new(cell(qi, si), border))
    }))?;

    root.present()?;
    Ok(())
}

/// One axis of the cell grid: unit-wide cells on `0.0..len`.
///
/// Ticks sit at the centre of every cell that has a label and nowhere else,
/// so the axis shows exactly the labels it is given.
struct CellAxis {
    labels: Vec<Option<String>>,
}

impl CellAxis {
    fn new(labels: Vec<Option<String>>) -> Self {
        Self { labels }
    }

    fn tick_positions(&self) -> Vec<f64> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_some())
            .map(|(i, _)| i as f64 + 0.5)
            .collect()
    }

    fn label_at(&self, v: f64) -> String {
        cell_index(v)
            .and_then(|i| self.labels.get(i).cloned().flatten())
            .unwrap_or_default()
    }
}

impl Ranged for CellAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let cells = self.labels.len().max(1) as f64;
        let span = f64::from(limit.1 - limit.0);
        limit.0 + (span * value / cells).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        // Light points would only feed the (disabled) fine mesh.
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.tick_positions()
        }
    }

    fn range(&self) -> Range<f64> {
        0.0..self.labels.len() as f64
    }
}

impl ValueFormatter<f64> for CellAxis {
    fn format(_value: &f64) -> String {
        String::new()
    }

    fn format_ext(&self, value: &f64) -> String {
        self.label_at(*value)
    }
}

/// Cell index for a coordinate inside the cell.
fn cell_index(v: f64) -> Option<usize> {
    if v.is_finite() && v >= 0.0 {
        Some(v.floor() as usize)
    } else {
        None
    }
}

/// Label for the row drawn at y-index `y` (y grows upwards).
fn row_label(matrix: &PresenceMatrix, y: usize) -> Option<String> {
    let n = matrix.series.len();
    let si = n.checked_sub(1)?.checked_sub(y)?;
    matrix.series.get(si).cloned()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "renderer panicked".to_string()
    }
}
