//! Aggregate quality report: overall score, grade, severity rollup.

#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::checks::{CheckResult, Dimension, Severity};
use crate::error::Result;

/// Letter grade derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Overall score of 90 or above.
    Excellent,
    /// Overall score of 70 or above.
    Good,
    /// Overall score of 50 or above.
    Fair,
    /// Everything below 50.
    Poor,
}

impl Grade {
    /// Grades an overall score.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Lowercase grade name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Issue counts per severity across all dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    /// High-severity issues.
    pub high: usize,
    /// Medium-severity issues.
    pub medium: usize,
    /// Low-severity issues.
    pub low: usize,
}

impl SeveritySummary {
    /// Total issues across severities.
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Assessment outcome across all requested dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Seconds since the Unix epoch when the report was produced.
    pub timestamp: u64,
    /// Mean of the dimension scores, rounded to two decimals.
    pub overall_score: f64,
    /// Letter grade for the overall score.
    pub grade: Grade,
    /// Per-dimension results, keyed by dimension.
    pub results: BTreeMap<Dimension, CheckResult>,
}

impl AggregateReport {
    /// Builds the report from per-dimension results.
    ///
    /// The overall score is the mean of the dimension scores present; an
    /// empty result set scores 0 and grades poor.
    pub fn from_results(results: BTreeMap<Dimension, CheckResult>) -> Self {
        let overall_score = if results.is_empty() {
            0.0
        } else {
            let sum: f64 = results.values().map(|r| r.score).sum();
            let mean = sum / results.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        Self {
            timestamp: unix_timestamp(),
            overall_score,
            grade: Grade::from_score(overall_score),
            results,
        }
    }

    /// Rolls issue counts up by severity.
    pub fn severity_summary(&self) -> SeveritySummary {
        let mut summary = SeveritySummary::default();
        for result in self.results.values() {
            for issue in &result.issues {
                match issue.severity {
                    Severity::High => summary.high += 1,
                    Severity::Medium => summary.medium += 1,
                    Severity::Low => summary.low += 1,
                }
            }
        }
        summary
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builds the report for a set of dimension results.
pub fn aggregate(results: &BTreeMap<Dimension, CheckResult>) -> AggregateReport {
    AggregateReport::from_results(results.clone())
}

fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
