//! Reduction of coverage percentages to a single number.

use crate::model::{CoverageMap, FileCoverage};

/// Arithmetic mean of `values`, or `default` when there is nothing to average.
#[must_use]
pub fn average(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        default
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Mean of the numeric metric percentages of a file, or `None` when no metric
/// carries a numeric percentage.
#[must_use]
pub fn file_pct(file: &FileCoverage) -> Option<f64> {
    let pcts: Vec<f64> = file.pcts().collect();
    (!pcts.is_empty()).then(|| average(&pcts, 0.0))
}

/// Overall percentage of a coverage summary.
///
/// Uses the numeric percentages of the `total` entry. A summary without any
/// numeric total falls back to the mean of its per-file percentages, and an
/// empty summary is 0.
#[must_use]
pub fn total_pct(map: &CoverageMap) -> f64 {
    let totals: Vec<f64> = map.total.pcts().collect();
    if !totals.is_empty() {
        return average(&totals, 0.0);
    }

    let files: Vec<f64> = map.per_file.values().filter_map(file_pct).collect();
    average(&files, 0.0)
}
