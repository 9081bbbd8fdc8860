//! Console rendering of reports.

use console::Style;
use gitstatslib::{LineCounts, Report, Summary};

/// Widest label column before names are truncated
const MAX_NAME_WIDTH: usize = 50;
const CELL_WIDTH: usize = 9;

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let len = name.chars().count();
    if len > max_len {
        let tail: String = name.chars().skip(len - max_len + 2).collect();
        format!("..{}", tail)
    } else {
        name.to_string()
    }
}

fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn cells(lines: &LineCounts, total: f64) -> String {
    [lines.code, lines.comment, lines.empty, total]
        .iter()
        .map(|v| format!("{:>width$}", format_count(*v), width = CELL_WIDTH))
        .collect()
}

/// Render the whole-table summary.
pub fn render_summary(summary: &Summary) -> String {
    let bold = Style::new().bold();
    let mut out = String::new();

    out.push_str(&format!("{}\n", bold.apply_to("Summary")));
    out.push_str(&format!(
        "  Lines:        {} ({} code, {} comment, {} empty)\n",
        format_count(summary.total),
        format_count(summary.lines.code),
        format_count(summary.lines.comment),
        format_count(summary.lines.empty)
    ));
    out.push_str(&format!("  Files:        {}\n", summary.files));
    out.push_str(&format!("  Authors:      {}\n", summary.authors));
    out.push_str(&format!("  Revisions:    {}\n", summary.revisions));
    if let (Some(first), Some(last)) = (&summary.first_month, &summary.last_month) {
        out.push_str(&format!("  Period:       {} to {}\n", first, last));
    }
    if summary.unattributed > 0.0 {
        out.push_str(&format!(
            "  Unattributed: {}\n",
            format_count(summary.unattributed)
        ));
    }
    out
}

/// Render a report as an aligned table.
pub fn render_report(report: &Report) -> String {
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    let header = capitalize(&report.column);
    let name_width = report
        .items
        .iter()
        .map(|i| display_label(&i.label).chars().count())
        .chain([header.len(), "Total".len()])
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH)
        + 2;

    let columns: String = ["Code", "Comment", "Empty", "Total"]
        .iter()
        .map(|c| format!("{:>width$}", c, width = CELL_WIDTH))
        .collect();
    let header_line = format!(
        "{:<name_width$}{}{:>7}  Activity",
        header,
        columns,
        "%",
        name_width = name_width
    );
    let separator = "-".repeat(header_line.chars().count());

    let mut out = String::new();
    out.push_str(&format!("{}\n", bold.apply_to(&header_line)));
    out.push_str(&format!("{}\n", dim.apply_to(&separator)));

    for item in &report.items {
        let name = truncate_name(&display_label(&item.label), name_width - 2);
        out.push_str(&format!(
            "{:<name_width$}{}{:>6.1}%  {}\n",
            name,
            cells(&item.lines, item.total),
            item.share * 100.0,
            item.activity,
            name_width = name_width
        ));
    }

    let totals = report
        .items
        .iter()
        .fold(LineCounts::default(), |acc, item| LineCounts {
            code: acc.code + item.lines.code,
            comment: acc.comment + item.lines.comment,
            empty: acc.empty + item.lines.empty,
        });
    out.push_str(&format!("{}\n", dim.apply_to(&separator)));
    out.push_str(&format!(
        "{}\n",
        bold.apply_to(format!(
            "{:<name_width$}{}",
            format!("Total ({} rows)", report.items.len()),
            cells(&totals, report.total),
            name_width = name_width
        ))
    ));
    out
}

/// Render the monthly sparkline.
pub fn render_activity(series: &[(String, f64)]) -> String {
    match (series.first(), series.last()) {
        (Some((first, _)), Some((last, _))) => {
            let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
            format!(
                "Activity {} {} {}\n",
                first,
                gitstatslib::sparkline(&values),
                last
            )
        }
        _ => String::new(),
    }
}

fn display_label(label: &str) -> String {
    if label.is_empty() {
        "(unattributed)".to_string()
    } else {
        label.to_string()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
