//! Command handler functions for the covdiff CLI.
//!
//! Each `cmd_*` function returns its output as a `String` (or the computed
//! result), making them easy to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::aggregate::total_pct;
use crate::badge::{shield_url, Badge, Thresholds};
use crate::diff::{compute_diff, DiffOptions, DiffResult};
use crate::ingest;
use crate::model::Metric;
use crate::report::format_pct;

/// Output style for the `diff` command.
#[derive(Clone, Debug, ValueEnum)]
pub enum Style {
    Text,
    Markdown,
    Json,
}

/// Compare the summary at `base` against the summaries matching
/// `head_pattern`. Returns `None` when there is no base summary yet.
pub fn cmd_diff(
    base: &Path,
    head_pattern: &str,
    options: &DiffOptions,
) -> Result<Option<DiffResult>> {
    let Some(base_map) = ingest::load_optional(base)
        .with_context(|| format!("Failed to read base summary {}", base.display()))?
    else {
        return Ok(None);
    };
    let head_map = ingest::load_glob(head_pattern)
        .with_context(|| format!("Failed to read head summaries '{head_pattern}'"))?;

    Ok(Some(compute_diff(&base_map, &head_map, options)))
}

/// Render a diff result in the requested style.
pub fn render(result: &DiffResult, style: &Style) -> Result<String> {
    let output = match style {
        Style::Text => result.results.clone(),
        Style::Markdown => result.markdown.clone(),
        Style::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
    };
    Ok(output)
}

/// Build the endpoint badge for the summaries matching `pattern`. The JSON
/// is written to `output` when given, otherwise returned for printing.
pub fn cmd_badge(
    pattern: &str,
    thresholds: Thresholds,
    decimals: usize,
    output: Option<&Path>,
    url: Option<&str>,
) -> Result<String> {
    let map = ingest::load_glob(pattern)?;
    let badge = Badge::new(total_pct(&map), thresholds, decimals);
    let json = badge.to_json()?;

    let mut out = String::new();
    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write badge to {}", path.display()))?;
            writeln!(out, "Badge written to {} ({})", path.display(), badge.message).unwrap();
        }
        None => writeln!(out, "{json}").unwrap(),
    }
    if let Some(url) = url {
        writeln!(out, "Badge URL: {}", shield_url(url)).unwrap();
    }
    Ok(out)
}

/// Per-metric totals of the summaries matching `pattern`.
pub fn cmd_summary(pattern: &str, decimals: usize) -> Result<String> {
    let map = ingest::load_glob(pattern)?;

    let mut out = String::new();
    writeln!(out, "Files:      {}", map.per_file.len()).unwrap();
    for metric in Metric::ALL {
        let Some(stat) = map.total.metrics.get(&metric) else {
            continue;
        };
        let pct = stat
            .pct
            .map(|p| format_pct(p, decimals))
            .unwrap_or_else(|| "n/a".to_string());
        let label = format!("{}:", metric.title());
        writeln!(out, "{label:<11} {}/{} ({pct})", stat.covered, stat.total).unwrap();
    }
    writeln!(out, "Overall:    {}", format_pct(total_pct(&map), decimals)).unwrap();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"{
        "total": {
            "lines": { "total": 10, "covered": 8, "skipped": 0, "pct": 80 },
            "branches": { "total": 0, "covered": 0, "skipped": 0, "pct": "Unknown" }
        },
        "src/a.js": { "lines": { "total": 10, "covered": 8, "skipped": 0, "pct": 80 } }
    }"#;

    const HEAD: &str = r#"{
        "total": {
            "lines": { "total": 10, "covered": 7, "skipped": 0, "pct": 70 },
            "branches": { "total": 0, "covered": 0, "skipped": 0, "pct": "Unknown" }
        },
        "src/a.js": { "lines": { "total": 10, "covered": 7, "skipped": 0, "pct": 70 } }
    }"#;

    fn write_pair(dir: &Path) -> (std::path::PathBuf, String) {
        let base = dir.join("base-summary.json");
        let head = dir.join("coverage-summary.json");
        std::fs::write(&base, BASE).unwrap();
        std::fs::write(&head, HEAD).unwrap();
        (base, head.display().to_string())
    }

    #[test]
    fn test_cmd_diff() {
        let dir = tempfile::tempdir().unwrap();
        let (base, head) = write_pair(dir.path());

        let result = cmd_diff(&base, &head, &DiffOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(result.base_pct, 80.0);
        assert_eq!(result.head_pct, 70.0);
        assert!(result.should_fail_build);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_cmd_diff_without_base() {
        let dir = tempfile::tempdir().unwrap();
        let (_, head) = write_pair(dir.path());

        let missing = dir.path().join("missing.json");
        let result = cmd_diff(&missing, &head, &DiffOptions::default());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_cmd_diff_missing_head() {
        let dir = tempfile::tempdir().unwrap();
        let (base, _) = write_pair(dir.path());
        let pattern = format!("{}/nothing-*.json", dir.path().display());

        let err = cmd_diff(&base, &pattern, &DiffOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("No coverage summary matches"));
    }

    #[test]
    fn test_render_styles() {
        let dir = tempfile::tempdir().unwrap();
        let (base, head) = write_pair(dir.path());
        let result = cmd_diff(&base, &head, &DiffOptions::default())
            .unwrap()
            .unwrap();

        let text = render(&result, &Style::Text).unwrap();
        assert!(text.starts_with("Coverage decreased: 80.00% -> 70.00% (-10.00)"));

        let md = render(&result, &Style::Markdown).unwrap();
        assert!(md.starts_with("### Coverage decreased"));

        let json: serde_json::Value =
            serde_json::from_str(&render(&result, &Style::Json).unwrap()).unwrap();
        assert_eq!(json["dropped_below_base"], true);
        assert_eq!(json["rows"][0]["classification"], "regressed");
        assert_eq!(json["rows"][0]["metrics"]["lines"]["delta"], -10.0);
        assert!(json.get("markdown").is_none());
    }

    #[test]
    fn test_cmd_badge_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let (_, head) = write_pair(dir.path());
        let output = dir.path().join("badge.json");

        let out = cmd_badge(
            &head,
            Thresholds::default(),
            2,
            Some(&output),
            Some("https://example.com/badge.json"),
        )
        .unwrap();

        assert!(out.contains("Badge written to"));
        assert!(out.contains("70.00%"));
        assert!(out.contains("https://img.shields.io/endpoint?url="));

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains(r#""color":"orange""#));
    }

    #[test]
    fn test_cmd_badge_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let (_, head) = write_pair(dir.path());

        let out = cmd_badge(&head, Thresholds::default(), 0, None, None).unwrap();
        assert_eq!(
            out,
            "{\"schemaVersion\":1,\"label\":\"coverage\",\"message\":\"70%\",\"color\":\"orange\"}\n"
        );
    }

    #[test]
    fn test_cmd_summary() {
        let dir = tempfile::tempdir().unwrap();
        let (_, head) = write_pair(dir.path());

        let out = cmd_summary(&head, 2).unwrap();

        assert!(out.contains("Files:      1"));
        assert!(out.contains("Branches:   0/0 (n/a)"));
        assert!(out.contains("Lines:      7/10 (70.00%)"));
        assert!(out.contains("Overall:    70.00%"));
    }
}
