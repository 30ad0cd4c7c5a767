//! Shared domain types.
//!
//! The types are plain data: fetch code produces `SeriesData`, the merger
//! folds them into a `MergedTable`, and the visualizer derives a
//! `PresenceMatrix` from a table read back from disk.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};

pub const DEFAULT_BASE_URL: &str = "https://www.banxico.org.mx/SieAPIRest/service/v1/series";
pub const DEFAULT_DATA_FILE: &str = "data/banxico_rates.csv";
pub const DEFAULT_PLOT_FILE: &str = "plots/data_availability.png";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DPI: u32 = 150;

/// Figure size in inches; multiplied by the DPI to get pixels.
pub const FIGURE_WIDTH_IN: u32 = 15;
pub const FIGURE_HEIGHT_IN: u32 = 10;

/// Name of the index column in the persisted CSV.
pub const DATE_COLUMN: &str = "Date";

/// A Banxico SIE series code and the label used as its column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesDescriptor {
    pub id: &'static str,
    pub name: &'static str,
}

impl SeriesDescriptor {
    pub const fn new(id: &'static str, name: &'static str) -> Self {
        Self { id, name }
    }
}

/// Government securities fetched on every run, in fetch (and column) order.
pub const SERIES_CATALOG: [SeriesDescriptor; 16] = [
    SeriesDescriptor::new("SF43936", "Cetes 28 days"),
    SeriesDescriptor::new("SF43939", "Cetes 91 days"),
    SeriesDescriptor::new("SF43942", "Cetes 182 days"),
    SeriesDescriptor::new("SF43945", "Cetes 364 days"),
    SeriesDescriptor::new("SF43948", "Cetes 728 days"),
    SeriesDescriptor::new("SF44070", "Bonos 3 years"),
    SeriesDescriptor::new("SF44073", "Bonos 5 years"),
    SeriesDescriptor::new("SF44076", "Bonos 7 years"),
    SeriesDescriptor::new("SF45383", "Bonos 10 years"),
    SeriesDescriptor::new("SF45384", "Bonos 20 years"),
    SeriesDescriptor::new("SF61504", "Bonos 30 years"),
    SeriesDescriptor::new("SF43951", "Udibonos 3 years"),
    SeriesDescriptor::new("SF43952", "Udibonos 5 years"),
    SeriesDescriptor::new("SF43954", "Udibonos 10 years"),
    SeriesDescriptor::new("SF45421", "Udibonos 20 years"),
    SeriesDescriptor::new("SF45386", "Udibonos 30 years"),
];

/// One dated observation. `None` means the upstream value was not numeric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A single fetched series: observations sorted by date, one per date.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub observations: Vec<Observation>,
}

impl SeriesData {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Number of observations with a numeric value.
    pub fn valid_count(&self) -> usize {
        self.observations.iter().filter(|o| o.value.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: NaiveDate,
    /// One cell per entry in `MergedTable::columns`.
    pub values: Vec<Option<f64>>,
}

/// Date-indexed table with one column per series.
///
/// Rows are ascending by date (distinct when built by the merger). Every row
/// has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedTable {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl MergedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }
}

/// A calendar quarter. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    pub year: i32,
    /// 1..=4
    pub quarter: u8,
}

impl Quarter {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn next(self) -> Self {
        if self.quarter >= 4 {
            Self {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }

    /// Last calendar day of the quarter (the anchor date of the bucket).
    pub fn end_date(self) -> Option<NaiveDate> {
        let (month, day) = match self.quarter {
            1 => (3, 31),
            2 => (6, 30),
            3 => (9, 30),
            _ => (12, 31),
        };
        NaiveDate::from_ymd_opt(self.year, month, day)
    }

    /// Axis label: the year of the quarter-end date.
    pub fn year_label(self) -> String {
        self.end_date().map_or(self.year, |d| d.year()).to_string()
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

/// Series × quarter availability grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceMatrix {
    pub series: Vec<String>,
    /// Contiguous, chronological.
    pub quarters: Vec<Quarter>,
    /// `cells[series][quarter]`
    pub cells: Vec<Vec<bool>>,
}

impl PresenceMatrix {
    pub fn is_present(&self, series: usize, quarter: usize) -> bool {
        self.cells
            .get(series)
            .and_then(|row| row.get(quarter))
            .copied()
            .unwrap_or(false)
    }

    pub fn present_quarters(&self, series: usize) -> usize {
        self.cells
            .get(series)
            .map(|row| row.iter().filter(|&&p| p).count())
            .unwrap_or(0)
    }
}

/// Resolved options for the fetch stage.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub data_file: PathBuf,
    /// Treat "no series fetched" as a hard failure.
    pub strict: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            strict: false,
        }
    }
}

/// Resolved options for the visualization stage.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub data_file: PathBuf,
    pub plot_file: PathBuf,
    pub dpi: u32,
    /// Also print the presence grid to stdout.
    pub ascii: bool,
}

impl PlotConfig {
    /// Pixel size of the output image.
    pub fn image_size(&self) -> (u32, u32) {
        (FIGURE_WIDTH_IN * self.dpi, FIGURE_HEIGHT_IN * self.dpi)
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            plot_file: PathBuf::from(DEFAULT_PLOT_FILE),
            dpi: DEFAULT_DPI,
            ascii: false,
        }
    }
}
