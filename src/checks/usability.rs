//! Usability: is there enough data, and is it worth analyzing.

#![allow(clippy::cast_precision_loss)]

use std::collections::{BTreeMap, HashMap};

use serde_json::json;

use crate::roles::{Role, RoleTable};
use crate::table::Table;

use super::{round2, CheckResult, Checker, Dimension, Issue, Severity};

/// Assesses the analytical usefulness of the dataset.
#[derive(Debug, Default)]
pub struct UsabilityChecker {
    roles: RoleTable,
}

impl UsabilityChecker {
    /// Creates the checker with the default role keywords.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_row_sufficiency(&self, table: &Table) -> Option<Issue> {
        let total_rows = table.row_count();
        if total_rows < 10 {
            Some(
                Issue::new(
                    "Too few records",
                    Severity::High,
                    format!(
                        "Only {total_rows} records exist; statistical analysis will be \
                         unreliable"
                    ),
                )
                .with_detail("total_rows", total_rows)
                .with_detail("recommended_min", 100),
            )
        } else if total_rows < 100 {
            Some(
                Issue::new(
                    "Few records",
                    Severity::Medium,
                    format!(
                        "{total_rows} records exist; more data is recommended for \
                         statistical confidence"
                    ),
                )
                .with_detail("total_rows", total_rows)
                .with_detail("recommended_min", 100),
            )
        } else {
            None
        }
    }

    fn check_fill_rates(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();
        let total_rows = table.row_count();
        if total_rows == 0 {
            return issues;
        }

        for column in table.columns() {
            let non_null = total_rows - column.null_count();
            let fill_rate = non_null as f64 / total_rows as f64 * 100.0;

            let (severity, title) = if fill_rate < 10.0 {
                (
                    Severity::High,
                    format!("Column '{}' is nearly empty", column.name),
                )
            } else if fill_rate < 30.0 {
                (
                    Severity::Medium,
                    format!("Column '{}' has a low fill rate", column.name),
                )
            } else {
                continue;
            };

            issues.push(
                Issue::new(
                    title,
                    severity,
                    format!(
                        "Only {non_null} of {total_rows} rows hold a value ({fill_rate:.1}%)"
                    ),
                )
                .with_detail("column", column.name.clone())
                .with_detail("fill_rate", round2(fill_rate))
                .with_detail("non_null_count", non_null)
                .with_detail("total_count", total_rows),
            );
        }

        issues
    }

    fn check_diversity(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            let non_null = column.non_null();
            if non_null.is_empty() {
                continue;
            }
            let total = non_null.len();
            let unique = column.distinct_count();
            let diversity_rate = unique as f64 / total as f64 * 100.0;

            if diversity_rate < 1.0 && total > 10 {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for value in &non_null {
                    *counts.entry(value).or_insert(0) += 1;
                }
                let mut top: Vec<(&str, usize)> = counts.into_iter().collect();
                top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
                top.truncate(5);
                let top: BTreeMap<String, usize> =
                    top.into_iter().map(|(v, c)| (v.to_string(), c)).collect();

                issues.push(
                    Issue::new(
                        format!("Low value diversity in column '{}'", column.name),
                        Severity::Medium,
                        format!(
                            "Only {unique} distinct values among {total} \
                             ({diversity_rate:.2}%)"
                        ),
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("unique_count", unique)
                    .with_detail("total_count", total)
                    .with_detail("diversity_rate", round2(diversity_rate))
                    .with_detail("top_values", json!(top)),
                );
            } else if diversity_rate > 95.0
                && total > 100
                && !self.roles.infer(&column.name).contains(&Role::Identifier)
            {
                issues.push(
                    Issue::new(
                        format!("Excessive cardinality in column '{}'", column.name),
                        Severity::Low,
                        format!(
                            "{unique} distinct values among {total} ({diversity_rate:.2}%); \
                             grouping will be difficult"
                        ),
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("unique_count", unique)
                    .with_detail("total_count", total)
                    .with_detail("diversity_rate", round2(diversity_rate)),
                );
            }
        }

        issues
    }

    fn score(
        &self,
        total_rows: usize,
        usable_cols: usize,
        total_cols: usize,
        issue_count: usize,
    ) -> f64 {
        let mut base = 100.0;

        if total_rows < 10 {
            base -= 40.0;
        } else if total_rows < 100 {
            base -= 20.0;
        } else if total_rows < 1000 {
            base -= 10.0;
        }

        if total_cols > 0 {
            let col_usability = usable_cols as f64 / total_cols as f64 * 100.0;
            if col_usability < 50.0 {
                base -= 30.0;
            } else if col_usability < 75.0 {
                base -= 15.0;
            }
        }

        let penalty = (issue_count as f64 * 8.0).min(40.0);
        let mut total = base - penalty;

        if total_rows < 10 {
            total *= 0.6;
        }

        round2(total.max(0.0))
    }
}

impl Checker for UsabilityChecker {
    fn dimension(&self) -> Dimension {
        Dimension::Usability
    }

    fn check(&self, table: &Table) -> CheckResult {
        let mut issues = Vec::new();
        if let Some(issue) = self.check_row_sufficiency(table) {
            issues.push(issue);
        }
        issues.extend(self.check_fill_rates(table));
        issues.extend(self.check_diversity(table));

        let total_rows = table.row_count();
        let total_cols = table.column_count();
        let usable_cols = table
            .columns()
            .iter()
            .filter(|c| !c.is_all_null())
            .count();
        let col_usability = if total_cols > 0 {
            usable_cols as f64 / total_cols as f64 * 100.0
        } else {
            0.0
        };

        let mut metrics = BTreeMap::new();
        metrics.insert("total_rows".to_string(), json!(total_rows));
        metrics.insert("total_columns".to_string(), json!(total_cols));
        metrics.insert("usable_columns".to_string(), json!(usable_cols));
        metrics.insert(
            "column_usability".to_string(),
            json!(round2(col_usability)),
        );

        let score = self.score(total_rows, usable_cols, total_cols, issues.len());
        CheckResult::new(Dimension::Usability, score, issues, metrics)
    }
}
