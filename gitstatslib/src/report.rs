//! Reports built from table queries.
//!
//! A report sits between the line statistics table and the rendered output:
//! - [`Summary`]: whole-table totals
//! - [`Report`]: one [`ReportItem`] per distinct value of a dimension
//!   (author, language, month, file), sorted by the requested [`Ordering`]
//!
//! Everything here derives `Serialize` so the CLI can emit JSON directly.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classifier::LineType;
use crate::columns::{self, AUTHOR, FILE, LINE_TYPE, MONTH, REVISION};
use crate::table::MemoryTable;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Unicode sparkline of a series, one bar per value.
///
/// Bars are scaled between the series minimum and maximum. A flat series is
/// drawn with the lowest bar.
pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let top = (BARS.len() - 1) as f64;

    values
        .iter()
        .map(|v| {
            if range > 0.0 {
                BARS[((v - min) / range * top).round() as usize]
            } else {
                BARS[0]
            }
        })
        .collect()
}

/// Line counts by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineCounts {
    pub code: f64,
    pub comment: f64,
    pub empty: f64,
}

impl LineCounts {
    /// Sum the rows of `table` by line type.
    pub fn from_table(table: &MemoryTable) -> Self {
        let mut counts = Self::default();
        for (name, value) in table.sum_distinct(LINE_TYPE) {
            match LineType::from_name(&name) {
                Some(LineType::Code) => counts.code += value,
                Some(LineType::Comment) => counts.comment += value,
                Some(LineType::Empty) => counts.empty += value,
                None => {}
            }
        }
        counts
    }

    pub fn total(&self) -> f64 {
        self.code + self.comment + self.empty
    }

    pub fn get(&self, line_type: LineType) -> f64 {
        match line_type {
            LineType::Code => self.code,
            LineType::Comment => self.comment,
            LineType::Empty => self.empty,
        }
    }
}

/// Whole-table totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub lines: LineCounts,
    pub total: f64,
    pub files: usize,
    pub revisions: usize,
    pub authors: usize,
    /// Lines with no attributed revision
    pub unattributed: f64,
    pub first_month: Option<String>,
    pub last_month: Option<String>,
}

impl Summary {
    pub fn from_table(table: &MemoryTable) -> Self {
        let lines = LineCounts::from_table(table);
        let non_empty = |column| {
            table
                .distinct(column)
                .into_iter()
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
        };
        let months = non_empty(MONTH);

        Self {
            total: lines.total(),
            lines,
            files: non_empty(FILE).len(),
            revisions: non_empty(REVISION).len(),
            authors: non_empty(AUTHOR).len(),
            unattributed: table.filter_column(REVISION, "").sum(),
            first_month: months.first().cloned(),
            last_month: months.last().cloned(),
        }
    }
}

/// Field used to sort report items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ordering {
    /// Largest total first, ties by label
    #[default]
    Total,
    /// By label, case-insensitive
    Label,
}

impl FromStr for Ordering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "total" | "lines" => Ok(Ordering::Total),
            "label" | "name" => Ok(Ordering::Label),
            _ => Err(format!("Unknown order field: {}", s)),
        }
    }
}

/// One row of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    /// Dimension value (author name, language, month, file)
    pub label: String,
    pub lines: LineCounts,
    pub total: f64,
    /// Fraction of the report total, between 0 and 1
    pub share: f64,
    /// Lines per month, over every month present in the table
    pub activity: String,
}

/// Table rolled up along one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Name of the dimension
    pub column: String,
    pub items: Vec<ReportItem>,
    pub total: f64,
}

impl Report {
    /// Group `table` by `column`.
    pub fn by(table: &MemoryTable, column: usize, ordering: Ordering) -> Self {
        let total = table.sum();
        let months: Vec<String> = table
            .distinct(MONTH)
            .into_iter()
            .filter(|m| !m.is_empty())
            .collect();

        let mut items: Vec<ReportItem> = table
            .sum_distinct(column)
            .into_iter()
            .map(|(label, item_total)| {
                let rows = table.filter_column(column, &label);
                let per_month = rows.sum_distinct(MONTH);
                let series: Vec<f64> = months
                    .iter()
                    .map(|m| {
                        per_month
                            .iter()
                            .find(|(month, _)| month == m)
                            .map_or(0.0, |(_, v)| *v)
                    })
                    .collect();

                ReportItem {
                    lines: LineCounts::from_table(&rows),
                    total: item_total,
                    share: if total > 0.0 { item_total / total } else { 0.0 },
                    activity: sparkline(&series),
                    label,
                }
            })
            .collect();

        match ordering {
            Ordering::Total => items.sort_by(|a, b| {
                b.total
                    .total_cmp(&a.total)
                    .then_with(|| a.label.cmp(&b.label))
            }),
            // sum_distinct already returns labels in group order
            Ordering::Label => {}
        }

        Self {
            column: columns::name(column).to_string(),
            items,
            total,
        }
    }

    /// Lines per month over the whole table, oldest first. Unattributed
    /// lines are left out.
    pub fn monthly_series(table: &MemoryTable) -> Vec<(String, f64)> {
        table
            .sum_distinct(MONTH)
            .into_iter()
            .filter(|(month, _)| !month.is_empty())
            .collect()
    }
}
