//! Text rendering of report rows and summary lines.
//!
//! A row is a list of [`Cell`]s in [`Column`] order. Rendering is
//! separate from delivery: [`crate::sink`] decides where lines go.

use std::fmt;

use beatmeter_core::{nanos_to_millis, StepIndex};

use crate::config::{Column, ReportConfig};
use crate::report::{Report, ReportSummary};
use crate::summary::StepSummary;

/// Separator printed between the rows, the summary and the ranking.
pub const DELIMITER: &str =
    "--------------------------------------------------------------------------------";

/// Skipped time below this many nanoseconds is left out of the summary line.
pub const SKIPPED_NOTE_THRESHOLD_NANOS: i64 = 1_000;

/// Marker appended to the annotation of a loop that was never closed.
pub const INCOMPLETE_MARKER: &str = " (incomplete)";

/// One rendered value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Raw timestamp in nanoseconds.
    Timestamp(i64),
    /// Percentage of the run.
    Percent(f64),
    /// Duration in milliseconds.
    Millis(f64),
    /// Free text.
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp(t) => write!(f, "{t}"),
            Self::Percent(p) => write!(f, "{p:5.2}%"),
            Self::Millis(ms) => write!(f, "{ms:8.3} ms"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One step rendered into cells.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    /// Step this row describes.
    pub index: StepIndex,
    /// Whether the step was excluded from timing.
    pub excluded: bool,
    /// Prefix the line with `"| "`.
    pub table_start: bool,
    /// Cells in column order.
    pub cells: Vec<Cell>,
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.table_start {
            f.write_str("| ")?;
        }
        for cell in &self.cells {
            write!(f, "{cell}")?;
            // Text is always the trailing column.
            if !matches!(cell, Cell::Text(_)) {
                f.write_str(" | ")?;
            }
        }
        Ok(())
    }
}

/// Render one step. `width` is the number of grid cells.
pub fn row(step: &StepSummary, width: usize, config: &ReportConfig) -> ReportRow {
    let mut cells = Vec::new();
    for column in config.columns() {
        match column {
            Column::Grid => cells.extend((0..width).map(|col| {
                Cell::Timestamp(if col == step.index.as_usize() {
                    step.start
                } else {
                    0
                })
            })),
            Column::Percent => cells.push(Cell::Percent(step.percent)),
            Column::Cost => cells.push(Cell::Millis(nanos_to_millis(step.cost))),
            Column::Accumulated => cells.push(Cell::Millis(nanos_to_millis(step.accumulated))),
            Column::Annotation => {
                let mut text = step.annotation.clone();
                if step.incomplete {
                    text.push_str(INCOMPLETE_MARKER);
                }
                cells.push(Cell::Text(text));
            }
        }
    }
    ReportRow {
        index: step.index,
        excluded: step.is_excluded,
        table_start: config.show_table_start,
        cells,
    }
}

/// Render every step of `report`, in step order.
pub fn rows(report: &Report, config: &ReportConfig) -> Vec<ReportRow> {
    let width = report.steps.len();
    report.steps.iter().map(|s| row(s, width, config)).collect()
}

/// `final: X ms (-Y ms), steps: N`.
pub fn summary_line(summary: ReportSummary) -> String {
    let skipped = if summary.excluded_total > SKIPPED_NOTE_THRESHOLD_NANOS {
        format!(" (-{:.3} ms)", nanos_to_millis(summary.excluded_total))
    } else {
        String::new()
    };
    format!(
        "final: {:.3} ms{skipped}, steps: {}",
        nanos_to_millis(summary.elapsed),
        summary.step_count
    )
}

/// Rows of the ranked steps paired with their rank, numbered from 1 and
/// at most `config.top_n_longest` of them.
pub fn top_rows<'a>(
    report: &'a Report,
    config: &'a ReportConfig,
) -> impl Iterator<Item = (usize, ReportRow)> + 'a {
    let width = report.steps.len();
    report
        .top()
        .take(config.top_n_longest)
        .enumerate()
        .map(move |(i, step)| (i + 1, row(step, width, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatmeter_core::RunId;
    use beatmeter_ledger::{MeasurementRun, RunConfig};
    use beatmeter_test_utils::NANOS_PER_MS;

    fn sample_report() -> Report {
        let mut run = MeasurementRun::open(RunId(0), 0, &RunConfig::with_capacity(8));
        let a = run.record_point(2 * NANOS_PER_MS, true).unwrap();
        run.annotate(a, "load").unwrap();
        run.record_point(3 * NANOS_PER_MS, false).unwrap();
        run.record_point(4 * NANOS_PER_MS, true).unwrap();
        Report::build(&run, 5)
    }

    #[test]
    fn cell_formats() {
        assert_eq!(Cell::Timestamp(42).to_string(), "42");
        assert_eq!(Cell::Percent(5.0).to_string(), " 5.00%");
        assert_eq!(Cell::Millis(1.5).to_string(), "   1.500 ms");
        assert_eq!(Cell::Text("x".into()).to_string(), "x");
    }

    #[test]
    fn default_row_layout() {
        let report = sample_report();
        let row = row(&report.steps[1], 4, &ReportConfig::default());
        assert_eq!(row.to_string(), "| 50.00% |    2.000 ms | load");
    }

    #[test]
    fn row_without_table_start() {
        let config = ReportConfig {
            show_table_start: false,
            ..ReportConfig::default()
        };
        let report = sample_report();
        assert_eq!(
            row(&report.steps[3], 4, &config).to_string(),
            "25.00% |    1.000 ms | step #3"
        );
    }

    #[test]
    fn grid_places_timestamp_on_diagonal() {
        let config = ReportConfig {
            show_steps_grid: true,
            show_cost_percent: false,
            show_cost_time: false,
            show_annotation: false,
            ..ReportConfig::default()
        };
        let report = sample_report();
        let rendered = rows(&report, &config);
        assert_eq!(rendered.len(), 4);
        assert_eq!(
            rendered[2].cells,
            vec![
                Cell::Timestamp(0),
                Cell::Timestamp(0),
                Cell::Timestamp(3 * NANOS_PER_MS),
                Cell::Timestamp(0),
            ]
        );
        assert!(rendered[2].excluded);
        assert_eq!(rendered[2].to_string(), "| 0 | 0 | 3000000 | 0 | ");
    }

    #[test]
    fn accumulated_column() {
        let config = ReportConfig {
            show_cost_percent: false,
            show_cost_time: false,
            show_accumulated_time: true,
            show_annotation: false,
            ..ReportConfig::default()
        };
        let report = sample_report();
        assert_eq!(rows(&report, &config)[3].cells, vec![Cell::Millis(4.0)]);
    }

    #[test]
    fn summary_line_mentions_skipped_time_above_threshold() {
        let report = sample_report();
        assert_eq!(
            summary_line(report.summary()),
            "final: 3.000 ms (-1.000 ms), steps: 4"
        );
        let quiet = ReportSummary {
            elapsed: 2_000_000,
            excluded_total: 1_000,
            step_count: 2,
        };
        assert_eq!(summary_line(quiet), "final: 2.000 ms, steps: 2");
    }

    #[test]
    fn top_rows_are_numbered_from_one() {
        let report = sample_report();
        let config = ReportConfig {
            top_n_longest: 1,
            ..ReportConfig::default()
        };
        let ranked: Vec<String> = top_rows(&report, &config)
            .map(|(rank, row)| format!("top-{rank}: {row}"))
            .collect();
        assert_eq!(ranked, vec!["top-1: | 50.00% |    2.000 ms | load".to_string()]);
    }

    #[test]
    fn incomplete_loop_is_marked() {
        let mut run = MeasurementRun::open(RunId(0), 0, &RunConfig::with_capacity(8));
        run.open_loop(NANOS_PER_MS, 3, false).unwrap();
        run.close(2 * NANOS_PER_MS).unwrap();
        let report = Report::build(&run, 0);
        let rendered = rows(&report, &ReportConfig::default());
        assert_eq!(
            rendered[1].cells.last(),
            Some(&Cell::Text("loop #1 (incomplete)".into()))
        );
    }

    #[test]
    fn delimiter_is_eighty_dashes() {
        assert_eq!(DELIMITER.len(), 80);
        assert!(DELIMITER.chars().all(|c| c == '-'));
    }
}
