use covdiff::model::{CoverageMap, FileCoverage, Metric, MetricStat};

/// Load a JSON fixture from `tests/fixtures`.
pub fn fixture(name: &str) -> CoverageMap {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    covdiff::ingest::load(&path).unwrap()
}

/// A file (or total) with only a `lines` metric.
pub fn lines(pct: f64) -> FileCoverage {
    FileCoverage::new().with(Metric::Lines, MetricStat::new(100, pct as u64, Some(pct)))
}
