//! CSV persistence of the merged table.
//!
//! Layout: header `Date,<series name>,...`, one row per date, ISO dates,
//! empty cell for a missing observation.

use std::fs::File;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::{DATE_COLUMN, MergedTable, TableRow};
use crate::error::{AppError, EXIT_FETCH};
use crate::io::atomic::StagedFile;

/// Write the table to `path`, replacing any previous file atomically.
pub fn write_table_csv(path: &Path, table: &MergedTable) -> Result<(), AppError> {
    let mut staged = StagedFile::new(path, EXIT_FETCH)?;

    {
        let mut writer = csv::Writer::from_writer(staged.file_mut());

        let mut header = Vec::with_capacity(table.columns.len() + 1);
        header.push(DATE_COLUMN);
        header.extend(table.columns.iter().map(String::as_str));
        writer
            .write_record(&header)
            .map_err(|e| AppError::fetch(format!("Failed to write CSV header: {e}")))?;

        for row in &table.rows {
            let mut record = Vec::with_capacity(row.values.len() + 1);
            record.push(row.date.format("%Y-%m-%d").to_string());
            record.extend(row.values.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
            writer
                .write_record(&record)
                .map_err(|e| AppError::fetch(format!("Failed to write CSV row for {}: {e}", row.date)))?;
        }

        writer
            .flush()
            .map_err(|e| AppError::fetch(format!("Failed to flush CSV: {e}")))?;
    }

    staged
        .file_mut()
        .sync_all()
        .map_err(|e| AppError::fetch(format!("Failed to sync CSV: {e}")))?;
    staged.commit()?;

    debug!(path = %path.display(), rows = table.rows.len(), "table written");
    Ok(())
}

/// Read a table written by `write_table_csv`.
///
/// Missing file, a first column other than `Date`, bad dates, and a table
/// with no data rows are all visualizer errors (exit code 1).
pub fn read_table_csv(path: &Path) -> Result<MergedTable, AppError> {
    if !path.exists() {
        return Err(AppError::visualize(format!(
            "CRITICAL ERROR: {} not found.",
            path.display()
        )));
    }

    let file = File::open(path)
        .map_err(|e| AppError::visualize(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::visualize(format!("Failed to read CSV headers: {e}")))?
        .clone();

    check_date_header(&headers)?;
    let columns = headers
        .iter()
        .skip(1)
        .map(|name| normalize_header_name(name).to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::visualize(format!("CSV parse error on line {line}: {e}")))?;

        let raw_date = record.get(0).unwrap_or("");
        let date = parse_date(raw_date)
            .map_err(|e| AppError::visualize(format!("Line {line}: {e}")))?;

        let values = (1..headers.len()).map(|i| parse_cell(record.get(i))).collect();
        rows.push(TableRow { date, values });
    }

    rows.sort_by_key(|r| r.date);
    let table = MergedTable { columns, rows };
    if table.is_empty() {
        return Err(AppError::visualize(format!(
            "Data loaded but table is empty: {}",
            path.display()
        )));
    }
    Ok(table)
}

/// The first column must be the date index.
fn check_date_header(headers: &StringRecord) -> Result<(), AppError> {
    match headers.get(0).map(normalize_header_name) {
        Some(first) if first.eq_ignore_ascii_case(DATE_COLUMN) => Ok(()),
        Some(first) => Err(AppError::visualize(format!(
            "First column must be `{DATE_COLUMN}`, found `{first}`."
        ))),
        None => Err(AppError::visualize(format!(
            "Missing required column: `{DATE_COLUMN}`"
        ))),
    }
}

fn normalize_header_name(name: &str) -> &str {
    // Spreadsheet tools may prepend a BOM to the first header.
    name.trim().trim_start_matches('\u{feff}')
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!(
        "Invalid date '{s}'. Expected YYYY-MM-DD (or DD/MM/YYYY, YYYY/MM/DD)."
    ))
}

fn parse_cell(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EXIT_VISUALIZE;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_table() -> MergedTable {
        MergedTable {
            columns: vec!["Cetes 28 days".to_string(), "Bonos 3, old".to_string()],
            rows: vec![
                TableRow {
                    date: d(2020, 1, 2),
                    values: vec![Some(7.25), None],
                },
                TableRow {
                    date: d(2020, 1, 3),
                    values: vec![None, Some(6.5)],
                },
            ],
        }
    }

    #[test]
    fn written_csv_has_date_header_iso_dates_and_empty_nulls() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data").join("rates.csv");

        write_table_csv(&path, &sample_table()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Date,Cetes 28 days,\"Bonos 3, old\"");
        assert_eq!(lines[1], "2020-01-02,7.25,");
        assert_eq!(lines[2], "2020-01-03,,6.5");
    }

    #[test]
    fn read_back_preserves_columns_dates_and_nulls() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rates.csv");
        let table = sample_table();

        write_table_csv(&path, &table).unwrap();
        assert_eq!(read_table_csv(&path).unwrap(), table);
    }

    #[test]
    fn rewrite_overwrites_previous_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rates.csv");
        std::fs::write(&path, "garbage\n").unwrap();

        write_table_csv(&path, &sample_table()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("Date,"));
    }

    #[test]
    fn missing_file_is_a_visualizer_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_table_csv(&tmp.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_VISUALIZE);
        assert!(err.message().contains("not found"));
    }

    #[test]
    fn header_only_file_is_a_visualizer_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rates.csv");
        std::fs::write(&path, "Date,Cetes 28 days\n").unwrap();

        let err = read_table_csv(&path).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_VISUALIZE);
        assert!(err.message().contains("empty"));
    }

    #[test]
    fn reader_tolerates_bom_short_rows_and_nan_cells() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rates.csv");
        std::fs::write(
            &path,
            "\u{feff}Date,A,B\n2020-01-03 00:00:00,NaN,1.5\n2020-01-02,2\n",
        )
        .unwrap();

        let table = read_table_csv(&path).unwrap();
        assert_eq!(table.columns, vec!["A", "B"]);
        assert_eq!(table.rows[0].date, d(2020, 1, 2));
        assert_eq!(table.rows[0].values, vec![Some(2.0), None]);
        assert_eq!(table.rows[1].values, vec![None, Some(1.5)]);
    }

    #[test]
    fn missing_date_column_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rates.csv");
        std::fs::write(&path, "When,A\n2020-01-02,1\n").unwrap();

        let err = read_table_csv(&path).unwrap_err();
        assert!(err.message().contains("`Date`"));
    }

    #[test]
    fn date_column_must_come_first() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rates.csv");
        std::fs::write(&path, "A,Date\n1,2020-01-02\n").unwrap();

        let err = read_table_csv(&path).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_VISUALIZE);
        assert!(err.message().contains("First column must be `Date`"), "{}", err.message());
    }

    #[test]
    fn date_header_match_ignores_case() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rates.csv");
        std::fs::write(&path, "date,A\n2020-01-02,1\n").unwrap();

        let table = read_table_csv(&path).unwrap();
        assert_eq!(table.columns, vec!["A"]);
    }
}
