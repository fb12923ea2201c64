//! Uniform in-memory representation of a coverage summary. The summary parser
//! produces a `CoverageMap` for each side of a comparison; the diff engine
//! only ever reads them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// One of the canonical coverage metrics. The declaration order is the
/// column order used everywhere in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Statements,
    Branches,
    Functions,
    Lines,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Statements,
        Metric::Branches,
        Metric::Functions,
        Metric::Lines,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Statements => "statements",
            Metric::Branches => "branches",
            Metric::Functions => "functions",
            Metric::Lines => "lines",
        }
    }

    /// Column title, e.g. "Statements".
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Statements => "Statements",
            Metric::Branches => "Branches",
            Metric::Functions => "Functions",
            Metric::Lines => "Lines",
        }
    }

    /// Look up a metric by its summary key. Non-canonical keys such as
    /// `branchesTrue` yield `None`.
    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.as_str() == key)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters and percentage for one metric of one file (or of the total).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricStat {
    pub total: u64,
    pub covered: u64,
    pub skipped: u64,
    /// `None` when the report carried no numeric percentage (e.g. `"Unknown"`
    /// for a file without any branches). Such entries are excluded from
    /// averages, never counted as zero.
    pub pct: Option<f64>,
}

impl MetricStat {
    pub fn new(total: u64, covered: u64, pct: Option<f64>) -> Self {
        Self {
            total,
            covered,
            skipped: 0,
            pct,
        }
    }

    /// Sum the counters of two stats and recompute the percentage from them.
    #[must_use]
    pub fn combine(&self, other: &MetricStat) -> MetricStat {
        let total = self.total.saturating_add(other.total);
        let covered = self.covered.saturating_add(other.covered);
        let pct = (total > 0).then(|| rate(covered, total) * 100.0);
        MetricStat {
            total,
            covered,
            skipped: self.skipped.saturating_add(other.skipped),
            pct,
        }
    }
}

/// Per-metric breakdown for a single file or for the aggregate total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileCoverage {
    pub metrics: BTreeMap<Metric, MetricStat>,
}

impl FileCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when assembling maps by hand.
    #[must_use]
    pub fn with(mut self, metric: Metric, stat: MetricStat) -> Self {
        self.metrics.insert(metric, stat);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.metrics.contains_key(&metric)
    }

    /// Numeric percentage for `metric`, if the metric is present and numeric.
    pub fn pct(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).and_then(|s| s.pct)
    }

    /// All numeric percentages, in canonical metric order.
    pub fn pcts(&self) -> impl Iterator<Item = f64> + '_ {
        self.metrics.values().filter_map(|s| s.pct)
    }
}

/// A full coverage summary: per-file breakdowns plus the aggregate total.
///
/// Files are keyed by path in a `BTreeMap`, so every iteration is in sorted
/// order regardless of how the input was encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageMap {
    pub per_file: BTreeMap<String, FileCoverage>,
    pub total: FileCoverage,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.per_file.is_empty() && self.total.is_empty()
    }

    pub fn insert_file(&mut self, path: impl Into<String>, file: FileCoverage) {
        self.per_file.insert(path.into(), file);
    }

    /// Fold another summary into this one. Files from `other` replace files
    /// with the same path; totals are summed per metric.
    pub fn merge(&mut self, other: CoverageMap) {
        self.per_file.extend(other.per_file);

        for (metric, stat) in other.total.metrics {
            let merged = match self.total.metrics.get(&metric) {
                Some(existing) => existing.combine(&stat),
                None => stat,
            };
            self.total.metrics.insert(metric, merged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_zero_total() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 4), 0.25);
    }

    #[test]
    fn test_metric_from_key() {
        assert_eq!(Metric::from_key("lines"), Some(Metric::Lines));
        assert_eq!(Metric::from_key("branchesTrue"), None);
        assert_eq!(Metric::from_key("Lines"), None);
    }

    #[test]
    fn test_metric_order_is_canonical() {
        let mut metrics = vec![
            Metric::Lines,
            Metric::Statements,
            Metric::Functions,
            Metric::Branches,
        ];
        metrics.sort();
        assert_eq!(metrics, Metric::ALL.to_vec());
    }

    #[test]
    fn test_pcts_skips_non_numeric() {
        let file = FileCoverage::new()
            .with(Metric::Lines, MetricStat::new(10, 8, Some(80.0)))
            .with(Metric::Branches, MetricStat::new(0, 0, None));
        assert_eq!(file.pcts().collect::<Vec<_>>(), vec![80.0]);
        assert_eq!(file.pct(Metric::Branches), None);
        assert!(file.contains(Metric::Branches));
    }

    fn lines(total: u64, covered: u64, pct: f64) -> FileCoverage {
        FileCoverage::new().with(Metric::Lines, MetricStat::new(total, covered, Some(pct)))
    }

    #[test]
    fn test_merge_replaces_files_and_sums_totals() {
        let mut a = CoverageMap::new();
        a.insert_file("a.js", lines(4, 1, 25.0));
        a.total = lines(4, 1, 25.0);

        let mut b = CoverageMap::new();
        b.insert_file("a.js", lines(4, 4, 100.0));
        b.insert_file("b.js", lines(4, 3, 75.0));
        b.total = lines(4, 3, 75.0).with(Metric::Branches, MetricStat::new(0, 0, None));

        a.merge(b);

        assert_eq!(a.per_file.len(), 2);
        assert_eq!(a.per_file["a.js"].pct(Metric::Lines), Some(100.0));
        let lines = &a.total.metrics[&Metric::Lines];
        assert_eq!(lines.total, 8);
        assert_eq!(lines.covered, 4);
        assert_eq!(lines.pct, Some(50.0));
        assert_eq!(a.total.pct(Metric::Branches), None);
    }

    #[test]
    fn test_combine_saturates_huge_counters() {
        let huge = MetricStat {
            total: u64::MAX - 1,
            covered: u64::MAX - 1,
            skipped: u64::MAX,
            pct: Some(100.0),
        };
        let merged = huge.combine(&huge);
        assert_eq!(merged.total, u64::MAX);
        assert_eq!(merged.covered, u64::MAX);
        assert_eq!(merged.skipped, u64::MAX);
        assert_eq!(merged.pct, Some(100.0));
    }

    #[test]
    fn test_combine_zero_total_has_no_pct() {
        let empty = MetricStat::new(0, 0, None);
        assert_eq!(empty.combine(&empty).pct, None);
    }
}
