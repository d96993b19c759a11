//! Completeness: missing values, dead columns, misfiled types, outliers.

#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use serde_json::json;

use crate::stats;
use crate::table::{Column, ColumnKind, Table};

use super::{round2, CheckResult, Checker, Dimension, Issue, Severity};

/// Assesses how completely the dataset is populated.
#[derive(Debug, Default)]
pub struct CompletenessChecker;

impl CompletenessChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_duplicate_records(&self, table: &Table) -> Option<Issue> {
        let duplicates = table.duplicate_row_count();
        if duplicates == 0 {
            return None;
        }
        Some(
            Issue::new(
                "Undefined primary key or duplicated records",
                Severity::High,
                format!(
                    "{duplicates} duplicated records found; rows need a unique identifier"
                ),
            )
            .with_detail("duplicate_count", duplicates)
            .with_detail("total_rows", table.row_count()),
        )
    }

    fn check_missing_values(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();
        let total_rows = table.row_count();
        if total_rows == 0 {
            return issues;
        }

        for column in table.columns() {
            let null_count = column.null_count();
            if null_count == 0 {
                continue;
            }

            let blank_count = if column.kind == ColumnKind::Textual {
                column.blank_count()
            } else {
                0
            };

            // Nulls and blanks mixed in one column is its own problem
            if blank_count > 0 {
                let total_empty = null_count + blank_count;
                let empty_rate = percent(total_empty, total_rows);
                issues.push(
                    Issue::new(
                        format!("Column '{}' mixes NULL and blank values", column.name),
                        Severity::High,
                        format!(
                            "{null_count} nulls and {blank_count} blanks ({empty_rate:.2}% \
                             empty in total); empty-value representation should be unified"
                        ),
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("null_count", null_count)
                    .with_detail("blank_count", blank_count)
                    .with_detail("total_empty", total_empty)
                    .with_detail("empty_rate", round2(empty_rate))
                    .with_detail("total_rows", total_rows),
                );
                continue;
            }

            let null_rate = percent(null_count, total_rows);
            let severity = if null_rate > 50.0 {
                Severity::High
            } else if null_rate > 20.0 {
                Severity::Medium
            } else {
                Severity::Low
            };

            issues.push(
                Issue::new(
                    format!("Column '{}' is missing required values", column.name),
                    severity,
                    format!(
                        "{null_count} of {total_rows} values are missing ({null_rate:.2}%)"
                    ),
                )
                .with_detail("column", column.name.clone())
                .with_detail("null_count", null_count)
                .with_detail("missing_rate", round2(null_rate))
                .with_detail("total_rows", total_rows),
            );
        }

        issues
    }

    fn check_unused_columns(&self, table: &Table) -> Option<Issue> {
        let unused: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| c.is_all_null() || c.distinct_count() <= 1)
            .map(|c| c.name.clone())
            .collect();

        if unused.is_empty() {
            return None;
        }
        Some(
            Issue::new(
                "Unused or constant columns found",
                Severity::Medium,
                format!("{} columns carry no information", unused.len()),
            )
            .with_detail("count", unused.len())
            .with_detail("unused_columns", json!(unused)),
        )
    }

    fn check_misfiled_types(&self, table: &Table) -> Option<Issue> {
        let misfiled: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| c.kind == ColumnKind::Textual)
            .filter(|c| is_numeric_in_disguise(c))
            .map(|c| c.name.clone())
            .collect();

        if misfiled.is_empty() {
            return None;
        }
        Some(
            Issue::new(
                "Numeric data stored as text",
                Severity::Medium,
                format!(
                    "{} columns parse fully as numbers but are stored as text",
                    misfiled.len()
                ),
            )
            .with_detail("count", misfiled.len())
            .with_detail("columns", json!(misfiled)),
        )
    }

    fn check_outliers(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();
        let total_rows = table.row_count();
        if total_rows == 0 {
            return issues;
        }

        for column in table.columns() {
            if column.kind != ColumnKind::Numeric {
                continue;
            }
            let values = column.numeric_values();

            if let Some(report) = stats::detect_outliers_iqr(&values) {
                if report.count > 0 {
                    issues.push(outlier_issue(column, "IQR", &report, &values, total_rows));
                    continue;
                }
            }
            // Fall back to z-scores when the IQR collapses or finds nothing
            if let Some(report) = stats::detect_outliers_zscore(&values) {
                if report.count > 0 {
                    issues.push(outlier_issue(
                        column, "z-score", &report, &values, total_rows,
                    ));
                }
            }
        }

        issues
    }

    fn score(&self, completeness_rate: f64, issue_count: usize) -> f64 {
        let base = completeness_rate * 0.6;
        let penalty = (issue_count as f64 * 8.0).min(40.0);
        let mut total = base + (40.0 - penalty);

        if completeness_rate < 50.0 {
            total *= 0.5;
        } else if completeness_rate < 70.0 {
            total *= 0.7;
        }

        round2(total.max(0.0))
    }
}

impl Checker for CompletenessChecker {
    fn dimension(&self) -> Dimension {
        Dimension::Completeness
    }

    fn check(&self, table: &Table) -> CheckResult {
        let mut issues = Vec::new();

        if let Some(issue) = self.check_duplicate_records(table) {
            issues.push(issue);
        }
        issues.extend(self.check_missing_values(table));
        if let Some(issue) = self.check_unused_columns(table) {
            issues.push(issue);
        }
        if let Some(issue) = self.check_misfiled_types(table) {
            issues.push(issue);
        }
        issues.extend(self.check_outliers(table));

        let total_cells = table.cell_count();
        let null_cells = table.null_cell_count();
        let completeness_rate = if total_cells > 0 {
            (total_cells - null_cells) as f64 / total_cells as f64 * 100.0
        } else {
            0.0
        };

        let mut metrics = BTreeMap::new();
        metrics.insert(
            "completeness_rate".to_string(),
            json!(round2(completeness_rate)),
        );
        metrics.insert("null_cells".to_string(), json!(null_cells));
        metrics.insert("total_cells".to_string(), json!(total_cells));

        let score = self.score(completeness_rate, issues.len());
        CheckResult::new(Dimension::Completeness, score, issues, metrics)
    }
}

fn outlier_issue(
    column: &Column,
    method: &str,
    report: &stats::OutlierReport,
    values: &[f64],
    total_rows: usize,
) -> Issue {
    let count = report.count;
    let rate = percent(count, total_rows);
    let severity = if rate > 10.0 {
        Severity::High
    } else if rate > 5.0 {
        Severity::Medium
    } else {
        Severity::Low
    };

    let examples: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && (*v < report.lower || *v > report.upper))
        .take(10)
        .collect();

    Issue::new(
        format!("Outliers in column '{}' ({method})", column.name),
        severity,
        format!("{count} outliers detected ({rate:.2}%) with the {method} method"),
    )
    .with_detail("column", column.name.clone())
    .with_detail("method", method)
    .with_detail("outlier_count", count)
    .with_detail("outlier_rate", round2(rate))
    .with_detail("outlier_values", json!(examples))
}

fn is_numeric_in_disguise(column: &Column) -> bool {
    let non_null = column.non_null();
    !non_null.is_empty()
        && non_null
            .iter()
            .all(|v| !v.trim().is_empty() && v.trim().parse::<f64>().is_ok())
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
