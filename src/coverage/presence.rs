//! Quarterly presence aggregation.
//!
//! Quarters are anchored on their last calendar day (31 Mar, 30 Jun, 30 Sep,
//! 31 Dec). The quarter axis spans every quarter between the first and last
//! table date, so a quarter with no rows still shows up as all-absent.

use crate::domain::{MergedTable, PresenceMatrix, Quarter};

/// Build the presence grid: rows are the table's series (in column order),
/// columns are quarters. A cell is `true` iff the series has at least one
/// non-null value in that quarter.
pub fn presence_matrix(table: &MergedTable) -> PresenceMatrix {
    let quarters = quarter_span(table);
    let mut cells = vec![vec![false; quarters.len()]; table.columns.len()];

    if let Some(&start) = quarters.first() {
        for row in &table.rows {
            let qi = quarter_offset(start, Quarter::from_date(row.date));
            for (si, _) in row.values.iter().enumerate().filter(|(_, v)| v.is_some()) {
                if let Some(cell) = cells.get_mut(si).and_then(|r| r.get_mut(qi)) {
                    *cell = true;
                }
            }
        }
    }

    PresenceMatrix {
        series: table.columns.clone(),
        quarters,
        cells,
    }
}

/// Every quarter from the earliest to the latest row date, inclusive.
fn quarter_span(table: &MergedTable) -> Vec<Quarter> {
    let min = table.rows.iter().map(|r| r.date).min();
    let max = table.rows.iter().map(|r| r.date).max();
    let (Some(min), Some(max)) = (min, max) else {
        return Vec::new();
    };

    let last = Quarter::from_date(max);
    let mut q = Quarter::from_date(min);
    let mut out = vec![q];
    while q < last {
        q = q.next();
        out.push(q);
    }
    out
}

fn quarter_offset(start: Quarter, q: Quarter) -> usize {
    let start_idx = start.year as i64 * 4 + i64::from(start.quarter) - 1;
    let idx = q.year as i64 * 4 + i64::from(q.quarter) - 1;
    (idx - start_idx).max(0) as usize
}
