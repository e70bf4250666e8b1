//! Which derived columns a report shows.
//!
//! [`ReportConfig`] is read-only input to rendering; nothing in the
//! engine mutates it.

/// One derived column of a report row, in rendering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    /// Raw timestamps, one cell per step of the run.
    Grid,
    /// Percent of total run time.
    Percent,
    /// Step cost in milliseconds.
    Cost,
    /// Time since run start in milliseconds.
    Accumulated,
    /// Loop statistics, user annotation, or default label.
    Annotation,
}

/// Presentation switches consumed at report time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportConfig {
    /// Show the raw timestamp grid. Default: false.
    pub show_steps_grid: bool,
    /// Show the percent-of-total column. Default: true.
    pub show_cost_percent: bool,
    /// Show the step cost column. Default: true.
    pub show_cost_time: bool,
    /// Show the accumulated time column. Default: false.
    pub show_accumulated_time: bool,
    /// Show the annotation column. Default: true.
    pub show_annotation: bool,
    /// Emit the summary line after the rows. Default: true.
    pub show_summary: bool,
    /// Prefix each row with `"| "`. Default: true.
    pub show_table_start: bool,
    /// How many of the most expensive steps to list; 0 disables. Default: 5.
    pub top_n_longest: usize,
}

impl ReportConfig {
    /// Default number of ranked steps.
    pub const DEFAULT_TOP_N: usize = 5;

    /// Enabled columns in rendering order.
    pub fn columns(&self) -> Vec<Column> {
        [
            (self.show_steps_grid, Column::Grid),
            (self.show_cost_percent, Column::Percent),
            (self.show_cost_time, Column::Cost),
            (self.show_accumulated_time, Column::Accumulated),
            (self.show_annotation, Column::Annotation),
        ]
        .into_iter()
        .filter_map(|(enabled, column)| enabled.then_some(column))
        .collect()
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_steps_grid: false,
            show_cost_percent: true,
            show_cost_time: true,
            show_accumulated_time: false,
            show_annotation: true,
            show_summary: true,
            show_table_start: true,
            top_n_longest: Self::DEFAULT_TOP_N,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns() {
        assert_eq!(
            ReportConfig::default().columns(),
            vec![Column::Percent, Column::Cost, Column::Annotation]
        );
    }

    #[test]
    fn all_columns_keep_fixed_order() {
        let config = ReportConfig {
            show_steps_grid: true,
            show_accumulated_time: true,
            ..ReportConfig::default()
        };
        assert_eq!(
            config.columns(),
            vec![
                Column::Grid,
                Column::Percent,
                Column::Cost,
                Column::Accumulated,
                Column::Annotation,
            ]
        );
    }

    #[test]
    fn everything_off_yields_no_columns() {
        let config = ReportConfig {
            show_steps_grid: false,
            show_cost_percent: false,
            show_cost_time: false,
            show_accumulated_time: false,
            show_annotation: false,
            ..ReportConfig::default()
        };
        assert!(config.columns().is_empty());
    }
}
