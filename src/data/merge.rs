//! Outer join of per-series columns on date.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{MergedTable, SeriesData, TableRow};

/// Combine fetched series into one table keyed by date.
///
/// The row set is the union of every input's dates, ascending. Column order
/// follows input order; a series that lacks a date gets `None` there.
pub fn merge_series(series: &[SeriesData]) -> MergedTable {
    let width = series.len();
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

    for (col, s) in series.iter().enumerate() {
        for obs in &s.observations {
            let cells = rows.entry(obs.date).or_insert_with(|| vec![None; width]);
            cells[col] = obs.value;
        }
    }

    MergedTable {
        columns: series.iter().map(|s| s.name.clone()).collect(),
        rows: rows
            .into_iter()
            .map(|(date, values)| TableRow { date, values })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(name: &str, obs: &[(NaiveDate, Option<f64>)]) -> SeriesData {
        SeriesData {
            id: name.to_string(),
            name: name.to_string(),
            observations: obs
                .iter()
                .map(|&(date, value)| Observation { date, value })
                .collect(),
        }
    }

    #[test]
    fn disjoint_ranges_produce_sorted_union_with_gaps() {
        let late = series("B", &[(d(2021, 1, 4), Some(2.0)), (d(2021, 1, 5), Some(2.1))]);
        let early = series("A", &[(d(2020, 1, 2), Some(1.0)), (d(2020, 1, 3), Some(1.1))]);

        let table = merge_series(&[late, early]);
        assert_eq!(table.columns, vec!["B", "A"]);

        let dates: Vec<_> = table.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2020, 1, 2), d(2020, 1, 3), d(2021, 1, 4), d(2021, 1, 5)]);

        assert_eq!(table.rows[0].values, vec![None, Some(1.0)]);
        assert_eq!(table.rows[3].values, vec![Some(2.1), None]);
    }

    #[test]
    fn overlapping_dates_share_a_row() {
        let a = series("A", &[(d(2020, 1, 2), Some(1.0)), (d(2020, 1, 3), None)]);
        let b = series("B", &[(d(2020, 1, 3), Some(5.0))]);

        let table = merge_series(&[a, b]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].values, vec![None, Some(5.0)]);
    }

    #[test]
    fn null_only_dates_keep_their_row() {
        let a = series("A", &[(d(2020, 1, 2), None)]);
        let table = merge_series(&[a]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].values, vec![None]);
    }

    #[test]
    fn no_input_gives_empty_table() {
        let table = merge_series(&[]);
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }
}
