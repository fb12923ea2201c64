//! Base-vs-head comparison of two coverage summaries.
//!
//! [`compute_diff`] aligns both summaries by file path, computes per-metric
//! percentage deltas, classifies every file and renders the result with the
//! formatters from [`crate::report`]. It is a pure function of its inputs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::aggregate::{average, file_pct, total_pct};
use crate::model::{CoverageMap, FileCoverage, Metric};
use crate::report::{MarkdownFormatter, ReportFormatter, TextFormatter};

/// Decimal places used when rendering percentages unless overridden.
pub const DEFAULT_DECIMALS: usize = 2;

/// Policy knobs for a comparison.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// When true a coverage drop is reported but never fails the build.
    pub allowed_to_fail: bool,
    /// Decimal places for rendered percentages and deltas.
    pub decimals: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            allowed_to_fail: false,
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// Whether a file exists on one side of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Present,
    Absent,
}

impl Presence {
    fn of<T>(value: Option<T>) -> Self {
        if value.is_some() {
            Presence::Present
        } else {
            Presence::Absent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Added,
    Removed,
    Improved,
    Regressed,
    Unchanged,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Added => "added",
            Classification::Removed => "removed",
            Classification::Improved => "improved",
            Classification::Regressed => "regressed",
            Classification::Unchanged => "unchanged",
        }
    }

    /// Report grouping: files present on both sides come first.
    fn group(&self) -> u8 {
        match self {
            Classification::Improved | Classification::Regressed | Classification::Unchanged => 0,
            Classification::Added => 1,
            Classification::Removed => 2,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline verdict on the total coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Decreased,
    Increased,
    Unchanged,
}

impl Verdict {
    pub fn headline(&self) -> &'static str {
        match self {
            Verdict::Decreased => "Coverage decreased",
            Verdict::Increased => "Coverage increased",
            Verdict::Unchanged => "Coverage unchanged",
        }
    }
}

/// Base and head percentage of one metric, and their difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub base: Option<f64>,
    pub head: Option<f64>,
    /// `head - base`, or `None` if either side lacks a numeric percentage.
    pub delta: Option<f64>,
}

/// Comparison of one file between base and head.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRow {
    pub path: String,
    pub base_status: Presence,
    pub head_status: Presence,
    /// Every canonical metric present on either side.
    pub metrics: BTreeMap<Metric, MetricDelta>,
    /// Mean of the non-null per-metric deltas (0 when there are none).
    pub overall_delta: f64,
    pub base_pct: Option<f64>,
    pub head_pct: Option<f64>,
    pub classification: Classification,
}

impl DiffRow {
    /// Delta for one metric, `None` when it cannot be computed.
    pub fn delta(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).and_then(|m| m.delta)
    }
}

/// Everything the caller needs after a comparison.
#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    /// File rows in report order.
    pub rows: Vec<DiffRow>,
    /// Metric columns shown in the report, in canonical order.
    pub columns: Vec<Metric>,
    /// Per-metric comparison of the two `total` entries.
    pub total_metrics: BTreeMap<Metric, MetricDelta>,
    pub base_pct: f64,
    pub head_pct: f64,
    pub total_delta: f64,
    /// Raw signal: total coverage is lower than the base.
    pub dropped_below_base: bool,
    /// Policy signal: the drop is not forgiven by `allowed_to_fail`.
    pub should_fail_build: bool,
    pub decimals: usize,
    #[serde(skip)]
    pub markdown: String,
    #[serde(skip)]
    pub results: String,
}

impl DiffResult {
    /// The single "regression" flag of the comment workflow: a drop that is
    /// not allowed to fail.
    pub fn regression(&self) -> bool {
        self.should_fail_build
    }

    pub fn verdict(&self) -> Verdict {
        match self.total_delta.partial_cmp(&0.0) {
            Some(Ordering::Less) => Verdict::Decreased,
            Some(Ordering::Greater) => Verdict::Increased,
            _ => Verdict::Unchanged,
        }
    }

    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }

    /// Rows with the given classification, in report order.
    pub fn rows_with(&self, classification: Classification) -> impl Iterator<Item = &DiffRow> {
        self.rows
            .iter()
            .filter(move |r| r.classification == classification)
    }
}

/// Compare `head` against `base`.
pub fn compute_diff(base: &CoverageMap, head: &CoverageMap, options: &DiffOptions) -> DiffResult {
    let base_pct = total_pct(base);
    let head_pct = total_pct(head);
    let total_delta = head_pct - base_pct;

    let paths: BTreeSet<&String> = base.per_file.keys().chain(head.per_file.keys()).collect();

    let mut rows: Vec<DiffRow> = paths
        .into_iter()
        .map(|path| diff_file(path, base.per_file.get(path), head.per_file.get(path)))
        .collect();
    rows.sort_by(compare_rows);

    let total_metrics = metric_deltas(Some(&base.total), Some(&head.total));

    let columns: Vec<Metric> = Metric::ALL
        .into_iter()
        .filter(|m| {
            total_metrics.contains_key(m) || rows.iter().any(|r| r.metrics.contains_key(m))
        })
        .collect();

    let dropped_below_base = total_delta < 0.0;
    let should_fail_build = dropped_below_base && !options.allowed_to_fail;

    log::debug!(
        "coverage diff: {} files, base {base_pct:.4}%, head {head_pct:.4}%",
        rows.len()
    );

    let mut result = DiffResult {
        rows,
        columns,
        total_metrics,
        base_pct,
        head_pct,
        total_delta,
        dropped_below_base,
        should_fail_build,
        decimals: options.decimals,
        markdown: String::new(),
        results: String::new(),
    };
    result.markdown = result.format(&MarkdownFormatter);
    result.results = result.format(&TextFormatter);
    result
}

fn diff_file(path: &str, base: Option<&FileCoverage>, head: Option<&FileCoverage>) -> DiffRow {
    let metrics = metric_deltas(base, head);
    let deltas: Vec<f64> = metrics.values().filter_map(|m| m.delta).collect();
    let overall_delta = average(&deltas, 0.0);

    let classification = match (base, head) {
        (None, _) => Classification::Added,
        (_, None) => Classification::Removed,
        _ if overall_delta > 0.0 => Classification::Improved,
        _ if overall_delta < 0.0 => Classification::Regressed,
        _ => Classification::Unchanged,
    };

    DiffRow {
        path: path.to_string(),
        base_status: Presence::of(base),
        head_status: Presence::of(head),
        metrics,
        overall_delta,
        base_pct: base.and_then(file_pct),
        head_pct: head.and_then(file_pct),
        classification,
    }
}

fn metric_deltas(
    base: Option<&FileCoverage>,
    head: Option<&FileCoverage>,
) -> BTreeMap<Metric, MetricDelta> {
    let has = |side: Option<&FileCoverage>, metric: Metric| {
        side.is_some_and(|f| f.contains(metric))
    };

    Metric::ALL
        .into_iter()
        .filter(|&m| has(base, m) || has(head, m))
        .map(|m| {
            let base_pct = base.and_then(|f| f.pct(m));
            let head_pct = head.and_then(|f| f.pct(m));
            let delta = match (base_pct, head_pct) {
                (Some(b), Some(h)) => Some(h - b),
                _ => None,
            };
            (
                m,
                MetricDelta {
                    base: base_pct,
                    head: head_pct,
                    delta,
                },
            )
        })
        .collect()
}

/// Largest regressions first among files on both sides, then added files,
/// then removed files; ties by path.
fn compare_rows(a: &DiffRow, b: &DiffRow) -> Ordering {
    a.classification
        .group()
        .cmp(&b.classification.group())
        .then_with(|| a.overall_delta.total_cmp(&b.overall_delta))
        .then_with(|| a.path.cmp(&b.path))
}
