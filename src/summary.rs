/// Parser for the coverage-summary JSON format (`coverage-summary.json`,
/// written by Istanbul / NYC / Jest with the `json-summary` reporter).
///
/// The format is a JSON object keyed by file path, plus a `"total"` entry:
///
/// ```json
/// {
///   "total": { "lines": { "total": 10, "covered": 8, "skipped": 0, "pct": 80 }, ... },
///   "/src/lib.js": { "lines": { ... }, "statements": { ... }, ... }
/// }
/// ```
///
/// `pct` is `"Unknown"` for metrics with nothing to cover; such values are
/// kept as "no percentage" rather than zero.
use serde_json::{Map, Value};

use crate::error::{CovdiffError, Result};
use crate::model::{CoverageMap, FileCoverage, Metric, MetricStat};

/// Key of the aggregate entry in the summary object.
pub const TOTAL_KEY: &str = "total";

/// Parse a coverage summary from raw bytes. Empty input is an empty summary.
pub fn parse(input: &[u8]) -> Result<CoverageMap> {
    if input.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(CoverageMap::new());
    }
    let value: Value = serde_json::from_slice(input)?;
    parse_value(&value)
}

/// Convert an already-decoded JSON document into a [`CoverageMap`].
pub fn parse_value(value: &Value) -> Result<CoverageMap> {
    let root = value.as_object().ok_or_else(|| {
        CovdiffError::InvalidInput(format!("expected a JSON object, found {}", kind(value)))
    })?;

    let mut map = CoverageMap::new();
    for (key, entry) in root {
        let entry = entry.as_object().ok_or_else(|| {
            CovdiffError::InvalidInput(format!(
                "entry '{key}' should be an object, found {}",
                kind(entry)
            ))
        })?;
        let file = parse_file_entry(entry);
        if key == TOTAL_KEY {
            map.total = file;
        } else {
            map.insert_file(key.clone(), file);
        }
    }
    Ok(map)
}

/// Parse the metric breakdown of one entry. Unknown metrics and metric
/// values that are not objects are skipped.
fn parse_file_entry(entry: &Map<String, Value>) -> FileCoverage {
    let mut file = FileCoverage::new();
    for (name, stat) in entry {
        let Some(metric) = Metric::from_key(name) else {
            log::trace!("ignoring non-canonical metric '{name}'");
            continue;
        };
        let Some(stat) = stat.as_object() else {
            continue;
        };
        file.metrics.insert(metric, parse_metric(stat));
    }
    file
}

fn parse_metric(stat: &Map<String, Value>) -> MetricStat {
    let count = |field: &str| stat.get(field).and_then(|v| v.as_u64()).unwrap_or(0);
    MetricStat {
        total: count("total"),
        covered: count("covered"),
        skipped: count("skipped"),
        pct: stat.get("pct").and_then(|v| v.as_f64()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
