//! shields.io endpoint badge for the total coverage of a summary.
//!
//! The JSON written by [`Badge`] follows the endpoint schema
//! (https://shields.io/badges/endpoint-badge); publish it somewhere public
//! and point [`shield_url`] at it.

use serde::Serialize;

use crate::report::format_pct;

pub const DEFAULT_THRESHOLD_GREEN: f64 = 80.0;
pub const DEFAULT_THRESHOLD_ORANGE: f64 = 65.0;

/// Color thresholds, compared with a strict "greater than".
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub green: f64,
    pub orange: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            green: DEFAULT_THRESHOLD_GREEN,
            orange: DEFAULT_THRESHOLD_ORANGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
    pub color: String,
}

impl Badge {
    pub fn new(pct: f64, thresholds: Thresholds, decimals: usize) -> Self {
        Self {
            schema_version: 1,
            label: "coverage".to_string(),
            message: format_pct(pct, decimals),
            color: badge_color(pct, thresholds).to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[must_use]
pub fn badge_color(pct: f64, thresholds: Thresholds) -> &'static str {
    if pct > thresholds.green {
        "brightgreen"
    } else if pct > thresholds.orange {
        "orange"
    } else {
        "red"
    }
}

/// Image URL rendering the endpoint JSON hosted at `json_url`.
#[must_use]
pub fn shield_url(json_url: &str) -> String {
    format!(
        "https://img.shields.io/endpoint?url={}",
        urlencoding::encode(json_url)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_color() {
        let t = Thresholds::default();
        assert_eq!(badge_color(95.0, t), "brightgreen");
        assert_eq!(badge_color(80.0, t), "orange");
        assert_eq!(badge_color(70.0, t), "orange");
        assert_eq!(badge_color(65.0, t), "red");
        assert_eq!(badge_color(0.0, t), "red");
    }

    #[test]
    fn test_badge_json() {
        let badge = Badge::new(82.456, Thresholds::default(), 2);
        assert_eq!(
            badge.to_json().unwrap(),
            r#"{"schemaVersion":1,"label":"coverage","message":"82.46%","color":"brightgreen"}"#
        );
    }

    #[test]
    fn test_shield_url() {
        assert_eq!(
            shield_url("https://example.com/wiki/badge.json"),
            "https://img.shields.io/endpoint?url=https%3A%2F%2Fexample.com%2Fwiki%2Fbadge.json"
        );
    }
}
