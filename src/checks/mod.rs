//! Dimension checkers and the assessment engine.
//!
//! Each quality dimension is a [`Checker`] that inspects an immutable
//! [`Table`] snapshot and produces a [`CheckResult`]: a 0-100 score, a
//! list of [`Issue`]s, and a metrics map. Checkers never fail and never
//! see each other's output; the engine runs the requested set in parallel
//! over one shared snapshot.

mod accuracy;
mod completeness;
mod consistency;
mod security;
mod timeliness;
mod usability;

pub use accuracy::AccuracyChecker;
pub use completeness::CompletenessChecker;
pub use consistency::ConsistencyChecker;
pub use security::SecurityChecker;
pub use timeliness::TimelinessChecker;
pub use usability::UsabilityChecker;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::table::Table;

/// The six assessed quality dimensions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Nulls, blanks, unusable placeholder values.
    Completeness,
    /// Duplicates and format uniformity.
    Consistency,
    /// Domain validity of typed values.
    Accuracy,
    /// Exposed PII and sensitive data.
    Security,
    /// Data freshness and temporal plausibility.
    Timeliness,
    /// Fitness of the dataset for analysis.
    Usability,
}

impl Dimension {
    /// All dimensions, in report order.
    pub const ALL: [Dimension; 6] = [
        Dimension::Completeness,
        Dimension::Consistency,
        Dimension::Accuracy,
        Dimension::Security,
        Dimension::Timeliness,
        Dimension::Usability,
    ];

    /// Lowercase dimension name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::Consistency => "consistency",
            Self::Accuracy => "accuracy",
            Self::Security => "security",
            Self::Timeliness => "timeliness",
            Self::Usability => "usability",
        }
    }

    fn checker(&self) -> Box<dyn Checker> {
        match self {
            Self::Completeness => Box::new(CompletenessChecker::new()),
            Self::Consistency => Box::new(ConsistencyChecker::new()),
            Self::Accuracy => Box::new(AccuracyChecker::new()),
            Self::Security => Box::new(SecurityChecker::new()),
            Self::Timeliness => Box::new(TimelinessChecker::new()),
            Self::Usability => Box::new(UsabilityChecker::new()),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "completeness" => Ok(Self::Completeness),
            "consistency" => Ok(Self::Consistency),
            "accuracy" => Ok(Self::Accuracy),
            "security" => Ok(Self::Security),
            "timeliness" => Ok(Self::Timeliness),
            "usability" => Ok(Self::Usability),
            other => Err(Error::unknown_dimension(other)),
        }
    }
}

/// Severity of a detected issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be addressed before the data is used.
    High,
    /// Should be reviewed.
    Medium,
    /// Informational.
    Low,
}

impl Severity {
    /// Lowercase severity name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One detected problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Short issue title.
    pub title: String,
    /// Severity classification.
    pub severity: Severity,
    /// Human-readable description, usually naming the affected column.
    pub description: String,
    /// Structured detail values (counts, rates, offending columns).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl Issue {
    /// Creates an issue with empty details.
    pub fn new(
        title: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            severity,
            description: description.into(),
            details: BTreeMap::new(),
        }
    }

    /// Attaches one detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one dimension check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The dimension this result belongs to.
    #[serde(rename = "name")]
    pub dimension: Dimension,
    /// Score in `[0, 100]`, rounded to two decimals.
    pub score: f64,
    /// Detected issues, in detection order.
    pub issues: Vec<Issue>,
    /// Dimension-specific metrics.
    pub metrics: BTreeMap<String, serde_json::Value>,
}

impl CheckResult {
    /// Creates a result; the score is clamped to `[0, 100]` and rounded.
    pub fn new(
        dimension: Dimension,
        score: f64,
        issues: Vec<Issue>,
        metrics: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            dimension,
            score: round2(score.clamp(0.0, 100.0)),
            issues,
            metrics,
        }
    }

    /// Number of issues at the given severity.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// A quality dimension checker.
///
/// Implementations are pure functions of the snapshot: same table, same
/// result.
pub trait Checker: Send + Sync {
    /// The dimension this checker assesses.
    fn dimension(&self) -> Dimension;

    /// Runs the assessment over one snapshot.
    fn check(&self, table: &Table) -> CheckResult;
}

/// Runs the requested dimensions over a dataset.
///
/// The dataset is snapshotted once; checkers then run in parallel on
/// scoped threads, one per dimension. Duplicate dimensions in the request
/// collapse into a single run.
pub fn run_checks(
    dataset: &dyn Dataset,
    dimensions: &[Dimension],
) -> BTreeMap<Dimension, CheckResult> {
    let table = Table::from_dataset(dataset);
    run_checks_on(&table, dimensions)
}

/// Runs the requested dimensions over an existing snapshot.
pub fn run_checks_on(
    table: &Table,
    dimensions: &[Dimension],
) -> BTreeMap<Dimension, CheckResult> {
    let unique: Vec<Dimension> = {
        let mut seen = std::collections::BTreeSet::new();
        dimensions
            .iter()
            .copied()
            .filter(|d| seen.insert(*d))
            .collect()
    };

    let mut results = BTreeMap::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = unique
            .iter()
            .map(|dimension| {
                let checker = dimension.checker();
                scope.spawn(move || checker.check(table))
            })
            .collect();

        for handle in handles {
            if let Ok(result) = handle.join() {
                results.insert(result.dimension, result);
            }
        }
    });
    results
}

/// Runs dimensions given by name, failing fast on the first unknown name.
///
/// An empty name list runs all six dimensions.
pub fn run_named_checks(
    dataset: &dyn Dataset,
    names: &[impl AsRef<str>],
) -> Result<BTreeMap<Dimension, CheckResult>> {
    let dimensions = if names.is_empty() {
        Dimension::ALL.to_vec()
    } else {
        names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<Dimension>>>()?
    };
    Ok(run_checks(dataset, &dimensions))
}

/// Rounds to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnKind};

    fn tiny_table() -> Table {
        Table::from_columns(vec![Column::new(
            "value",
            ColumnKind::Numeric,
            vec![Some("1".to_string()), Some("2".to_string()), None],
        )])
    }

    #[test]
    fn test_dimension_parse_roundtrip() {
        for dimension in Dimension::ALL {
            let parsed: Dimension = dimension.name().parse().expect("parse");
            assert_eq!(parsed, dimension);
        }
    }

    #[test]
    fn test_dimension_parse_is_case_insensitive() {
        let parsed: Dimension = " Completeness ".parse().expect("parse");
        assert_eq!(parsed, Dimension::Completeness);
    }

    #[test]
    fn test_dimension_parse_unknown() {
        let err = "velocity".parse::<Dimension>().unwrap_err();
        assert!(matches!(err, Error::UnknownDimension { .. }));
    }

    #[test]
    fn test_check_result_clamps_and_rounds() {
        let result = CheckResult::new(
            Dimension::Accuracy,
            123.456,
            Vec::new(),
            BTreeMap::new(),
        );
        assert_eq!(result.score, 100.0);

        let result =
            CheckResult::new(Dimension::Accuracy, -5.0, Vec::new(), BTreeMap::new());
        assert_eq!(result.score, 0.0);

        let result =
            CheckResult::new(Dimension::Accuracy, 87.654, Vec::new(), BTreeMap::new());
        assert_eq!(result.score, 87.65);
    }

    #[test]
    fn test_issue_builder() {
        let issue = Issue::new("High null rate", Severity::High, "Column 'x' is 60% null")
            .with_detail("column", "x")
            .with_detail("null_rate", 60.0);
        assert_eq!(issue.details.len(), 2);
        assert_eq!(issue.details["column"], serde_json::json!("x"));
    }

    #[test]
    fn test_run_checks_covers_requested_dimensions() {
        let results = run_checks_on(&tiny_table(), &Dimension::ALL);
        assert_eq!(results.len(), 6);
        for (dimension, result) in &results {
            assert_eq!(*dimension, result.dimension);
            assert!(result.score >= 0.0 && result.score <= 100.0);
        }
    }

    #[test]
    fn test_run_checks_deduplicates_request() {
        let results = run_checks_on(
            &tiny_table(),
            &[Dimension::Accuracy, Dimension::Accuracy],
        );
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_run_checks_is_deterministic() {
        let table = tiny_table();
        let first = run_checks_on(&table, &Dimension::ALL);
        let second = run_checks_on(&table, &Dimension::ALL);
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_named_checks_unknown_name_fails_fast() {
        let dataset = crate::dataset::ArrowDataset::from_csv_str("a\n1\n").expect("dataset");
        let err = run_named_checks(&dataset, &["accuracy", "velocity"]).unwrap_err();
        assert!(matches!(err, Error::UnknownDimension { .. }));
    }

    #[test]
    fn test_run_named_checks_empty_means_all() {
        let dataset = crate::dataset::ArrowDataset::from_csv_str("a\n1\n2\n").expect("dataset");
        let names: [&str; 0] = [];
        let results = run_named_checks(&dataset, &names).expect("results");
        assert_eq!(results.len(), 6);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
    }
}
