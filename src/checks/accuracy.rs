//! Accuracy: domain, range, format and cross-column validity.

#![allow(clippy::cast_precision_loss)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use serde_json::json;

use crate::roles::{Role, RoleTable};
use crate::stats;
use crate::table::{Column, ColumnKind, Table};

use super::{round2, CheckResult, Checker, Dimension, Issue, Severity};

#[allow(clippy::unwrap_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

#[allow(clippy::unwrap_used)]
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\-\(\)\+\s]+$").unwrap());

const VALID_FLAG_VALUES: [&str; 10] =
    ["Y", "N", "y", "n", "1", "0", "true", "false", "True", "False"];

/// Assesses whether values are valid for what their column claims to hold.
#[derive(Debug, Default)]
pub struct AccuracyChecker {
    roles: RoleTable,
}

impl AccuracyChecker {
    /// Creates the checker with the default role keywords.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_flag_domains(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            if !self.roles.infer(&column.name).contains(&Role::Flag) {
                continue;
            }

            let invalid: Vec<&str> = column
                .non_null()
                .into_iter()
                .filter(|v| !VALID_FLAG_VALUES.contains(v))
                .collect();
            if invalid.is_empty() {
                continue;
            }

            let error_count = invalid.len();
            let distinct: BTreeSet<&str> = invalid.into_iter().collect();
            let examples: Vec<&str> = distinct.into_iter().take(10).collect();

            issues.push(
                Issue::new(
                    format!("Invalid flag values in column '{}'", column.name),
                    Severity::High,
                    format!("{error_count} values fall outside the Y/N flag domain"),
                )
                .with_detail("column", column.name.clone())
                .with_detail("error_count", error_count)
                .with_detail("invalid_values", json!(examples))
                .with_detail("valid_values", json!(VALID_FLAG_VALUES)),
            );
        }

        issues
    }

    fn check_ranges(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();
        let current_year = chrono::Local::now().year();

        for column in table.columns() {
            if column.kind != ColumnKind::Numeric {
                continue;
            }
            let roles = self.roles.infer(&column.name);
            let values = column.numeric_values();
            if values.is_empty() {
                continue;
            }
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            if roles.contains(&Role::Count) || roles.contains(&Role::Age) {
                let negatives = values.iter().filter(|v| **v < 0.0).count();
                if negatives > 0 {
                    issues.push(
                        Issue::new(
                            format!("Negative values in column '{}'", column.name),
                            Severity::High,
                            format!("{negatives} negative values in a quantity column"),
                        )
                        .with_detail("column", column.name.clone())
                        .with_detail("error_count", negatives)
                        .with_detail("min_value", min),
                    );
                }
            }

            if roles.contains(&Role::Percentage) {
                let out = values.iter().filter(|v| **v < 0.0 || **v > 100.0).count();
                if out > 0 {
                    issues.push(
                        Issue::new(
                            format!("Out-of-range ratio in column '{}'", column.name),
                            Severity::High,
                            format!("{out} values fall outside the valid 0-100 range"),
                        )
                        .with_detail("column", column.name.clone())
                        .with_detail("error_count", out)
                        .with_detail("min_value", min)
                        .with_detail("max_value", max),
                    );
                }
            }

            if roles.contains(&Role::Age) {
                let out = values.iter().filter(|v| **v < 0.0 || **v > 150.0).count();
                if out > 0 {
                    issues.push(
                        Issue::new(
                            format!("Out-of-range age in column '{}'", column.name),
                            Severity::High,
                            format!("{out} ages fall outside the valid 0-150 range"),
                        )
                        .with_detail("column", column.name.clone())
                        .with_detail("error_count", out)
                        .with_detail("min_value", min)
                        .with_detail("max_value", max),
                    );
                }
            }

            if roles.contains(&Role::Year) {
                let (min_year, max_year, window) = if roles.contains(&Role::BirthYear) {
                    (1900, current_year, "1900 to this year")
                } else if roles.contains(&Role::EnrollmentYear) {
                    (current_year - 10, current_year, "the last ten years")
                } else {
                    (1900, current_year + 1, "1900 to next year")
                };

                let too_old = values.iter().filter(|v| **v < f64::from(min_year)).count();
                let too_new = values.iter().filter(|v| **v > f64::from(max_year)).count();
                let out = too_old + too_new;
                if out > 0 {
                    issues.push(
                        Issue::new(
                            format!("Out-of-range year in column '{}'", column.name),
                            Severity::High,
                            format!("{out} years fall outside {window}"),
                        )
                        .with_detail("column", column.name.clone())
                        .with_detail("error_count", out)
                        .with_detail("too_old_count", too_old)
                        .with_detail("too_new_count", too_new)
                        .with_detail("min_value", min)
                        .with_detail("max_value", max),
                    );
                }
            }
        }

        issues
    }

    fn check_formats(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            if column.kind != ColumnKind::Textual {
                continue;
            }
            let roles = self.roles.infer(&column.name);

            if roles.contains(&Role::NameText) {
                if let Some(issue) = check_name_text(column) {
                    issues.push(issue);
                }
            }

            if roles.contains(&Role::Email) {
                if let Some(issue) = check_pattern(
                    column,
                    &EMAIL_PATTERN,
                    "Invalid email format",
                    Severity::Medium,
                ) {
                    issues.push(issue);
                }
            }

            if roles.contains(&Role::Phone) {
                if let Some(issue) = check_pattern(
                    column,
                    &PHONE_PATTERN,
                    "Invalid phone format",
                    Severity::Medium,
                ) {
                    issues.push(issue);
                }
            }
        }

        issues
    }

    fn check_date_validity(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            if column.kind != ColumnKind::Textual {
                continue;
            }
            if !self.roles.infer(&column.name).contains(&Role::Date) {
                continue;
            }

            let invalid: Vec<&str> = column
                .non_null()
                .into_iter()
                .filter(|v| stats::parse_date(v).is_none())
                .collect();
            if invalid.is_empty() {
                continue;
            }

            let error_count = invalid.len();
            let examples: Vec<&str> = invalid.into_iter().take(10).collect();
            issues.push(
                Issue::new(
                    format!("Invalid dates in column '{}'", column.name),
                    Severity::High,
                    format!("{error_count} values do not parse as dates"),
                )
                .with_detail("column", column.name.clone())
                .with_detail("error_count", error_count)
                .with_detail("examples", json!(examples)),
            );
        }

        issues
    }

    fn check_cross_column_logic(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        let columns_with = |role: Role| -> Vec<&Column> {
            table
                .columns()
                .iter()
                .filter(|c| self.roles.infer(&c.name).contains(&role))
                .collect()
        };

        // Range order: start must not be after end
        for start in columns_with(Role::RangeStart) {
            for end in columns_with(Role::RangeEnd) {
                let error_count = (0..table.row_count())
                    .filter(|row| {
                        let start_date = start.values[*row]
                            .as_deref()
                            .and_then(stats::parse_date);
                        let end_date =
                            end.values[*row].as_deref().and_then(stats::parse_date);
                        matches!((start_date, end_date), (Some(s), Some(e)) if s > e)
                    })
                    .count();

                if error_count > 0 {
                    issues.push(
                        Issue::new(
                            "Start date after end date",
                            Severity::High,
                            format!(
                                "'{}' is later than '{}' in {error_count} rows",
                                start.name, end.name
                            ),
                        )
                        .with_detail("start_column", start.name.clone())
                        .with_detail("end_column", end.name.clone())
                        .with_detail("error_count", error_count),
                    );
                }
            }
        }

        // A disposal date without a disposal reason is incomplete
        for date in columns_with(Role::DiscardDate) {
            for reason in columns_with(Role::DiscardReason) {
                let error_count = (0..table.row_count())
                    .filter(|row| {
                        let has_date = date.values[*row].is_some();
                        let missing_reason = reason.values[*row]
                            .as_deref()
                            .map_or(true, |v| v.trim().is_empty());
                        has_date && missing_reason
                    })
                    .count();

                if error_count > 0 {
                    issues.push(
                        Issue::new(
                            "Disposal date without disposal reason",
                            Severity::High,
                            format!(
                                "'{}' is set but '{}' is missing in {error_count} rows",
                                date.name, reason.name
                            ),
                        )
                        .with_detail("date_column", date.name.clone())
                        .with_detail("reason_column", reason.name.clone())
                        .with_detail("error_count", error_count),
                    );
                }
            }
        }

        issues
    }

    fn score(&self, accuracy_rate: f64, issue_count: usize) -> f64 {
        let base = accuracy_rate * 0.6;
        let penalty = (issue_count as f64 * 10.0).min(40.0);
        let mut total = base + (40.0 - penalty);

        if accuracy_rate < 50.0 {
            total *= 0.5;
        } else if accuracy_rate < 70.0 {
            total *= 0.7;
        }

        round2(total.max(0.0))
    }
}

impl Checker for AccuracyChecker {
    fn dimension(&self) -> Dimension {
        Dimension::Accuracy
    }

    fn check(&self, table: &Table) -> CheckResult {
        let mut issues = Vec::new();
        issues.extend(self.check_flag_domains(table));
        issues.extend(self.check_ranges(table));
        issues.extend(self.check_formats(table));
        issues.extend(self.check_date_validity(table));
        issues.extend(self.check_cross_column_logic(table));

        let total_cells = table.cell_count();
        let invalid_count: usize = issues
            .iter()
            .filter_map(|i| i.details.get("error_count"))
            .filter_map(serde_json::Value::as_u64)
            .map(|c| c as usize)
            .sum();
        let accuracy_rate = if total_cells > 0 {
            (total_cells.saturating_sub(invalid_count)) as f64 / total_cells as f64 * 100.0
        } else {
            0.0
        };

        let mut metrics = BTreeMap::new();
        metrics.insert("accuracy_rate".to_string(), json!(round2(accuracy_rate)));
        metrics.insert("invalid_count".to_string(), json!(invalid_count));
        metrics.insert("total_cells".to_string(), json!(total_cells));

        let score = self.score(accuracy_rate, issues.len());
        CheckResult::new(Dimension::Accuracy, score, issues, metrics)
    }
}

fn check_pattern(
    column: &Column,
    pattern: &Regex,
    title: &str,
    severity: Severity,
) -> Option<Issue> {
    let invalid: Vec<&str> = column
        .non_null()
        .into_iter()
        .filter(|v| !pattern.is_match(v))
        .collect();
    if invalid.is_empty() {
        return None;
    }

    let error_count = invalid.len();
    let examples: Vec<&str> = invalid.into_iter().take(5).collect();
    Some(
        Issue::new(
            format!("{title} in column '{}'", column.name),
            severity,
            format!("{error_count} values do not match the expected format"),
        )
        .with_detail("column", column.name.clone())
        .with_detail("error_count", error_count)
        .with_detail("examples", json!(examples)),
    )
}

fn check_name_text(column: &Column) -> Option<Issue> {
    let invalid: Vec<&str> = column
        .non_null()
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .filter(|v| has_incomplete_hangul(v) || is_nonsense_text(v))
        .collect();
    if invalid.is_empty() {
        return None;
    }

    let error_count = invalid.len();
    let distinct: BTreeSet<&str> = invalid.into_iter().collect();
    let examples: Vec<&str> = distinct.into_iter().take(10).collect();
    Some(
        Issue::new(
            format!("Malformed name text in column '{}'", column.name),
            Severity::High,
            format!("{error_count} values contain stray jamo or no letters at all"),
        )
        .with_detail("column", column.name.clone())
        .with_detail("error_count", error_count)
        .with_detail("examples", json!(examples)),
    )
}

/// Detects isolated Hangul jamo, which indicate truncated or corrupted text.
fn has_incomplete_hangul(value: &str) -> bool {
    value
        .chars()
        .any(|c| ('ㄱ'..='ㅎ').contains(&c) || ('ㅏ'..='ㅣ').contains(&c))
}

/// A name value made of neither letters nor Hangul syllables, and not a
/// plain number, holds no usable name.
fn is_nonsense_text(value: &str) -> bool {
    let no_letters = value
        .chars()
        .all(|c| !c.is_ascii_alphabetic() && !('가'..='힣').contains(&c));
    no_letters && !value.chars().all(|c| c.is_ascii_digit())
}
