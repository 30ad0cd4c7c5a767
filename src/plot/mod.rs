//! Rendering of the presence grid.
//!
//! - PNG heatmap via Plotters (`heatmap`)
//! - plain-text grid for terminals/CI logs (`ascii`)

pub mod ascii;
pub mod heatmap;

pub use ascii::*;
pub use heatmap::*;

use crate::domain::Quarter;

/// Only every `TICK_STRIDE`-th quarter gets an axis label (one per year).
pub const TICK_STRIDE: usize = 4;

/// X-axis labels: the quarter-end year at indices 0, 4, 8, ...; `None` elsewhere.
pub fn year_ticks(quarters: &[Quarter]) -> Vec<Option<String>> {
    quarters
        .iter()
        .enumerate()
        .map(|(i, q)| (i % TICK_STRIDE == 0).then(|| q.year_label()))
        .collect()
}
