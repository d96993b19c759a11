//! Security: exposed PII, sensitive columns, values that want encryption.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::roles::{Role, RoleTable, SensitiveCategory};
use crate::table::{ColumnKind, Table};

use super::{round2, CheckResult, Checker, Dimension, Issue, Severity};

/// PII content patterns, scanned in order; the first match per column wins.
#[allow(clippy::unwrap_used)]
static PII_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("national ID", r"\d{6}-\d{7}"),
        ("email", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
        ("phone number", r"01\d-\d{3,4}-\d{4}"),
        ("card number", r"\d{4}-\d{4}-\d{4}-\d{4}"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

#[allow(clippy::unwrap_used)]
static LONG_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10,}$").unwrap());

const SENSITIVE_ORDER: [SensitiveCategory; 5] = [
    SensitiveCategory::Password,
    SensitiveCategory::Account,
    SensitiveCategory::Income,
    SensitiveCategory::Health,
    SensitiveCategory::Location,
];

/// Assesses exposure of personal and otherwise sensitive data.
#[derive(Debug, Default)]
pub struct SecurityChecker {
    roles: RoleTable,
}

impl SecurityChecker {
    /// Creates the checker with the default role keywords.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_exposed_pii(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            if !self.roles.infer(&column.name).contains(&Role::Pii) {
                continue;
            }
            if column.kind != ColumnKind::Textual {
                continue;
            }
            let non_null = column.non_null();
            if non_null.is_empty() {
                continue;
            }

            for (pii_type, pattern) in PII_PATTERNS.iter() {
                let matches = non_null.iter().filter(|v| pattern.is_match(v)).count();
                if matches > 0 {
                    issues.push(
                        Issue::new(
                            format!("Plaintext {pii_type} in column '{}'", column.name),
                            Severity::High,
                            format!(
                                "{matches} values hold an unmasked {pii_type}; masking or \
                                 encryption is required"
                            ),
                        )
                        .with_detail("column", column.name.clone())
                        .with_detail("pii_type", *pii_type)
                        .with_detail("count", matches),
                    );
                    break;
                }
            }
        }

        issues
    }

    fn check_sensitive_columns(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            let roles = self.roles.infer(&column.name);
            let category = SENSITIVE_ORDER
                .iter()
                .find(|c| roles.contains(&Role::Sensitive(**c)));
            let Some(category) = category else {
                continue;
            };

            if *category == SensitiveCategory::Password {
                if column.kind != ColumnKind::Textual {
                    continue;
                }
                // Anything shorter than a modern hash is suspect
                let short = column
                    .non_null()
                    .iter()
                    .filter(|v| v.chars().count() < 20)
                    .count();
                if short > 0 {
                    issues.push(
                        Issue::new(
                            format!("Weak password storage in column '{}'", column.name),
                            Severity::High,
                            format!(
                                "{short} values are short enough to be plaintext or weakly \
                                 hashed passwords"
                            ),
                        )
                        .with_detail("column", column.name.clone())
                        .with_detail("category", category.name())
                        .with_detail("count", short),
                    );
                }
            } else {
                issues.push(
                    Issue::new(
                        format!("Sensitive data in column '{}'", column.name),
                        Severity::Medium,
                        format!(
                            "The column appears to hold {} data; review access and \
                             encryption policy",
                            category.name()
                        ),
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("category", category.name()),
                );
            }
        }

        issues
    }

    fn check_long_digit_runs(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            if column.kind != ColumnKind::Textual {
                continue;
            }
            let count = column
                .non_null()
                .iter()
                .filter(|v| LONG_DIGIT_RUN.is_match(v))
                .count();
            if count > 0 {
                issues.push(
                    Issue::new(
                        format!("Possible account numbers in column '{}'", column.name),
                        Severity::Medium,
                        format!(
                            "{count} values are 10+ digit numbers; if these are account or \
                             card numbers they need encryption"
                        ),
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("count", count),
                );
            }
        }

        issues
    }

    fn score(&self, sensitive_count: usize, issue_count: usize) -> f64 {
        let sensitive_penalty = (sensitive_count as f64 * 15.0).min(60.0);
        let issue_penalty = (issue_count as f64 * 8.0).min(40.0);
        let mut total = 100.0 - sensitive_penalty - issue_penalty;

        if sensitive_count > 5 {
            total *= 0.6;
        } else if sensitive_count > 3 {
            total *= 0.8;
        }

        round2(total.max(0.0))
    }
}

impl Checker for SecurityChecker {
    fn dimension(&self) -> Dimension {
        Dimension::Security
    }

    fn check(&self, table: &Table) -> CheckResult {
        let pii_issues = self.check_exposed_pii(table);
        let sensitive_issues = self.check_sensitive_columns(table);

        // Distinct columns flagged as carrying personal or sensitive data
        let sensitive_columns: BTreeSet<&str> = pii_issues
            .iter()
            .chain(&sensitive_issues)
            .filter_map(|i| i.details.get("column"))
            .filter_map(serde_json::Value::as_str)
            .collect();
        let sensitive_count = sensitive_columns.len();

        let mut issues = pii_issues;
        issues.extend(sensitive_issues);
        issues.extend(self.check_long_digit_runs(table));

        let risk = if sensitive_count > 3 {
            "high"
        } else if sensitive_count > 0 {
            "medium"
        } else {
            "low"
        };

        let mut metrics = BTreeMap::new();
        metrics.insert("sensitive_column_count".to_string(), json!(sensitive_count));
        metrics.insert("column_count".to_string(), json!(table.column_count()));
        metrics.insert("security_risk".to_string(), json!(risk));

        let score = self.score(sensitive_count, issues.len());
        CheckResult::new(Dimension::Security, score, issues, metrics)
    }
}
