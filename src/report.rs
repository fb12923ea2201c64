//! Output formatting for coverage diff results.

use std::fmt::Write;

use crate::diff::{Classification, DiffResult, DiffRow, MetricDelta};

/// Trait for formatting diff results.
pub trait ReportFormatter {
    /// Format the result to a string.
    fn format(&self, result: &DiffResult) -> String;
}

/// Plain text formatter, for consoles and CI logs.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, result: &DiffResult) -> String {
        let d = result.decimals;
        let mut out = String::new();

        let headline = result.verdict().headline();
        let base = format_pct(result.base_pct, d);
        let head = format_pct(result.head_pct, d);
        let delta = format_delta(result.total_delta, d);
        writeln!(out, "{headline}: {base} -> {head} ({delta})").unwrap();

        if result.rows.is_empty() {
            return out;
        }

        let width = result.rows.iter().map(|r| r.path.len()).max().unwrap_or(0);
        out.push('\n');
        for row in &result.rows {
            let label = row.classification.as_str();
            let path = &row.path;
            let detail = match row.classification {
                Classification::Added => row.head_pct.map(|p| format_pct(p, d)),
                Classification::Removed => {
                    row.base_pct.map(|p| format!("was {}", format_pct(p, d)))
                }
                _ => Some(format_delta(row.overall_delta, d)),
            }
            .unwrap_or_else(|| "n/a".to_string());
            writeln!(out, "  {label:<10} {path:<width$}  {detail}").unwrap();
        }

        out
    }
}

/// Markdown formatter, for pull request comments.
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, result: &DiffResult) -> String {
        let d = result.decimals;
        let mut md = String::new();

        writeln!(md, "### {}\n", result.verdict().headline()).unwrap();

        let head = format_pct(result.head_pct, d);
        let base = format_pct(result.base_pct, d);
        let delta = format_delta(result.total_delta, d);
        writeln!(md, "**{head}** total coverage (base {base}, **{delta}**)\n").unwrap();

        md.push_str("| File |");
        for metric in &result.columns {
            write!(md, " {} |", metric.title()).unwrap();
        }
        md.push_str(" Overall |\n");

        md.push_str("|:-----|");
        for metric in &result.columns {
            write!(md, "{}:|", "-".repeat(metric.title().len() + 1)).unwrap();
        }
        md.push_str("--------:|\n");

        for row in &result.rows {
            write!(md, "| {} |", code_cell(&row.path)).unwrap();
            for &metric in &result.columns {
                write!(md, " {} |", metric_cell(row.metrics.get(&metric), d)).unwrap();
            }
            writeln!(md, " {} |", overall_cell(row, d)).unwrap();
        }

        md.push_str("| **Total** |");
        for &metric in &result.columns {
            write!(md, " {} |", metric_cell(result.total_metrics.get(&metric), d)).unwrap();
        }
        writeln!(md, " **{base} → {head} ({delta})** |").unwrap();

        let added = result.rows_with(Classification::Added).count();
        let removed = result.rows_with(Classification::Removed).count();
        if added + removed > 0 {
            writeln!(md, "\n{added} file(s) added, {removed} file(s) removed.").unwrap();
        }

        md.push('\n');
        md.push_str("<sub>covdiff</sub>\n");

        md
    }
}

/// Format a percentage, e.g. `82.50%`.
#[must_use]
pub fn format_pct(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, round_to(value, decimals))
}

/// Format a signed delta, e.g. `+1.25` or `-0.50`. The sign is that of the
/// unrounded value, so a drop too small to show still reads `-0.00`.
#[must_use]
pub fn format_delta(value: f64, decimals: usize) -> String {
    let rounded = round_to(value, decimals);
    if value < 0.0 && rounded == 0.0 {
        format!("-{:.*}", decimals, 0.0)
    } else {
        format!("{:+.*}", decimals, rounded)
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals.min(15) as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn metric_cell(metric: Option<&MetricDelta>, d: usize) -> String {
    let Some(m) = metric else {
        return "-".to_string();
    };
    match (m.base, m.head, m.delta) {
        (_, Some(head), Some(delta)) => {
            format!("{} ({})", format_pct(head, d), format_delta(delta, d))
        }
        (_, Some(head), None) => format_pct(head, d),
        (Some(base), None, _) => format!("~~{}~~", format_pct(base, d)),
        (None, None, _) => "n/a".to_string(),
    }
}

fn overall_cell(row: &DiffRow, d: usize) -> String {
    match row.classification {
        Classification::Added => "added".to_string(),
        Classification::Removed => "removed".to_string(),
        Classification::Unchanged => format_delta(0.0, d),
        Classification::Improved | Classification::Regressed => {
            format!("{} {}", row.classification, format_delta(row.overall_delta, d))
        }
    }
}

/// Render `text` as an inline code span inside a table cell. The fence is one
/// backtick longer than the longest backtick run in `text`.
fn code_cell(text: &str) -> String {
    let longest_run = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    let text = text.replace('|', "\\|");
    if longest_run == 0 {
        format!("{fence}{text}{fence}")
    } else {
        format!("{fence} {text} {fence}")
    }
}
