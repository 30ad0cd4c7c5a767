//! ASCII/Unicode rendering of the presence grid for terminal and CI logs.
//!
//! Deterministic fixed-layout output:
//! - one row per series, one character per quarter
//! - `█` quarter has data, `·` quarter is empty
//! - two-digit year labels (`'22`) above every fourth quarter, same
//!   decimation as the PNG

use crate::domain::PresenceMatrix;
use crate::plot::year_ticks;

const PRESENT: char = '█';
const ABSENT: char = '·';

pub fn render_ascii_grid(matrix: &PresenceMatrix) -> String {
    let name_width = matrix
        .series
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0);
    let n_q = matrix.quarters.len();

    let mut out = String::new();

    // Header: year labels placed at their tick column, skipped if they would
    // run into the previous label.
    let mut header = vec![' '; n_q];
    let mut next_free = 0usize;
    for (i, tick) in year_ticks(&matrix.quarters).into_iter().enumerate() {
        let Some(year) = tick else { continue };
        let label = short_year(&year);
        if i < next_free || i + label.len() > n_q {
            continue;
        }
        for (offset, ch) in label.chars().enumerate() {
            header[i + offset] = ch;
        }
        next_free = i + label.len() + 1;
    }
    out.push_str(&" ".repeat(name_width + 2));
    out.push_str(header.iter().collect::<String>().trim_end());
    out.push('\n');

    for (si, name) in matrix.series.iter().enumerate() {
        let row: String = (0..n_q)
            .map(|qi| if matrix.is_present(si, qi) { PRESENT } else { ABSENT })
            .collect();
        out.push_str(&format!(
            "{name:<name_width$} |{row}| {}/{n_q}\n",
            matrix.present_quarters(si)
        ));
    }

    out.push_str(&format!("{PRESENT} observed  {ABSENT} missing"));
    out
}

fn short_year(year: &str) -> String {
    let tail = year.get(year.len().saturating_sub(2)..).unwrap_or(year);
    format!("'{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quarter;

    #[test]
    fn grid_marks_presence_and_labels_years() {
        let quarters: Vec<_> = [(2021, 4), (2022, 1), (2022, 2), (2022, 3), (2022, 4), (2023, 1)]
            .into_iter()
            .map(|(year, quarter)| Quarter { year, quarter })
            .collect();
        let matrix = PresenceMatrix {
            series: vec!["Cetes".to_string(), "Bonos 3y".to_string()],
            quarters,
            cells: vec![
                vec![true, true, false, true, false, false],
                vec![false, false, false, false, true, true],
            ],
        };

        let text = render_ascii_grid(&matrix);
        let lines: Vec<_> = text.lines().collect();
        // The label for index 4 would run past the last column.
        assert_eq!(lines[0], "          '21");
        assert_eq!(lines[1], "Cetes    |██·█··| 3/6");
        assert_eq!(lines[2], "Bonos 3y |····██| 2/6");
        assert_eq!(lines[3], "█ observed  · missing");
    }

    #[test]
    fn labels_repeat_every_four_quarters() {
        let mut quarters = Vec::new();
        let mut q = Quarter { year: 2020, quarter: 1 };
        for _ in 0..12 {
            quarters.push(q);
            q = q.next();
        }
        let matrix = PresenceMatrix {
            series: vec!["A".to_string()],
            quarters,
            cells: vec![vec![true; 12]],
        };

        let text = render_ascii_grid(&matrix);
        assert_eq!(text.lines().next(), Some("   '20 '21 '22"));
    }
}
