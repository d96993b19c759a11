//! Consistency: naming rules, duplicates, code and date-format uniformity.

#![allow(clippy::cast_precision_loss)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::roles::{Role, RoleTable};
use crate::stats;
use crate::table::{Column, ColumnKind, Table};

use super::{round2, CheckResult, Checker, Dimension, Issue, Severity};

#[allow(clippy::unwrap_used)]
static NAME_SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_가-힣]").unwrap());

/// Date layout patterns recognized when checking format uniformity.
#[allow(clippy::unwrap_used)]
static DATE_FORMATS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("YYYY-MM-DD", r"^\d{4}-\d{2}-\d{2}"),
        ("YYYY/MM/DD", r"^\d{4}/\d{2}/\d{2}"),
        ("YYYYMMDD", r"^\d{8}$"),
        ("DD-MM-YYYY", r"^\d{2}-\d{2}-\d{4}"),
        ("DD/MM/YYYY", r"^\d{2}/\d{2}/\d{4}"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

/// Assesses structural and value-level uniformity.
#[derive(Debug, Default)]
pub struct ConsistencyChecker {
    roles: RoleTable,
}

impl ConsistencyChecker {
    /// Creates the checker with the default role keywords.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_column_naming(&self, table: &Table) -> Option<Issue> {
        let mut violations = Vec::new();

        for column in table.columns() {
            let name = &column.name;
            if name.contains(' ') {
                violations.push(format!("'{name}': contains whitespace"));
            }
            if NAME_SPECIAL_CHARS.is_match(name) {
                violations.push(format!("'{name}': contains special characters"));
            }
            if *name != name.to_lowercase() && *name != name.to_uppercase() {
                violations.push(format!("'{name}': mixes upper and lower case"));
            }
        }

        if violations.is_empty() {
            return None;
        }
        let total = violations.len();
        violations.truncate(10);
        Some(
            Issue::new(
                "Column naming rule violations",
                Severity::Medium,
                format!("{total} column names violate the naming rules"),
            )
            .with_detail("violations", json!(violations))
            .with_detail("total_count", total),
        )
    }

    fn check_kind_groups(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        // Each column lands in at most one group, first match wins
        let mut groups: BTreeMap<&str, Vec<&Column>> = BTreeMap::new();
        for column in table.columns() {
            let roles = self.roles.infer(&column.name);
            let group = if roles.contains(&Role::Date) {
                Some("date")
            } else if roles.contains(&Role::Amount) {
                Some("amount")
            } else if roles.contains(&Role::Code) {
                Some("code")
            } else {
                None
            };
            if let Some(group) = group {
                groups.entry(group).or_default().push(column);
            }
        }

        for (group, columns) in groups {
            let kinds: HashSet<ColumnKind> = columns.iter().map(|c| c.kind).collect();
            if kinds.len() > 1 {
                issues.push(
                    Issue::new(
                        format!("Mixed types among {group} columns"),
                        Severity::Medium,
                        format!("{group} columns use more than one data type"),
                    )
                    .with_detail("group", group)
                    .with_detail(
                        "columns",
                        json!(columns
                            .iter()
                            .map(|c| [c.name.as_str(), c.kind.name()])
                            .collect::<Vec<_>>()),
                    ),
                );
            }
        }

        issues
    }

    fn check_similar_names(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        let mut groups: BTreeMap<String, Vec<&Column>> = BTreeMap::new();
        for column in table.columns() {
            if let Some(key) = name_key(&column.name) {
                groups.entry(key).or_default().push(column);
            }
        }

        for (key, columns) in groups {
            if columns.len() < 2 {
                continue;
            }

            let kinds: HashSet<ColumnKind> = columns.iter().map(|c| c.kind).collect();
            if kinds.len() > 1 {
                issues.push(
                    Issue::new(
                        "Similarly named columns with mixed types",
                        Severity::Medium,
                        format!("Columns sharing the stem '{key}' use different data types"),
                    )
                    .with_detail("stem", key.clone())
                    .with_detail(
                        "columns",
                        json!(columns
                            .iter()
                            .map(|c| [c.name.as_str(), c.kind.name()])
                            .collect::<Vec<_>>()),
                    ),
                );
            }

            // Textual twins whose widths differ by 2x or more
            let widths: Vec<(&str, usize)> = columns
                .iter()
                .filter(|c| c.kind == ColumnKind::Textual)
                .filter_map(|c| {
                    c.non_null()
                        .iter()
                        .map(|v| v.chars().count())
                        .max()
                        .map(|w| (c.name.as_str(), w))
                })
                .filter(|(_, w)| *w > 0)
                .collect();
            if widths.len() > 1 {
                let min = widths.iter().map(|(_, w)| *w).min().unwrap_or(0);
                let max = widths.iter().map(|(_, w)| *w).max().unwrap_or(0);
                if min > 0 && max / min >= 2 {
                    issues.push(
                        Issue::new(
                            "Similarly named columns with mismatched widths",
                            Severity::Low,
                            format!(
                                "Columns sharing the stem '{key}' have max widths {min} vs {max}"
                            ),
                        )
                        .with_detail("stem", key)
                        .with_detail("min_length", min)
                        .with_detail("max_length", max),
                    );
                }
            }
        }

        issues
    }

    fn check_duplicates(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();
        let total_rows = table.row_count();

        let duplicate_count = table.duplicate_row_count();
        if duplicate_count > 0 && total_rows > 0 {
            let rate = duplicate_count as f64 / total_rows as f64 * 100.0;
            issues.push(
                Issue::new(
                    "Duplicated records",
                    duplicate_severity(rate),
                    format!("{duplicate_count} of {total_rows} records are duplicates ({rate:.2}%)"),
                )
                .with_detail("duplicate_count", duplicate_count)
                .with_detail("duplicate_rate", round2(rate))
                .with_detail("total_rows", total_rows),
            );
        }

        for column in table.columns() {
            let roles = self.roles.infer(&column.name);
            if !roles.contains(&Role::Identifier) && !roles.contains(&Role::Code) {
                continue;
            }

            let non_null = column.non_null();
            if non_null.is_empty() {
                continue;
            }
            let metrics = stats::uniqueness_metrics(&non_null);
            let duplicates = metrics.beyond_first_count();
            if duplicates == 0 {
                continue;
            }

            let rate = duplicates as f64 / metrics.total as f64 * 100.0;

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for value in &non_null {
                *counts.entry(value).or_insert(0) += 1;
            }
            let mut repeated: Vec<(&str, usize)> =
                counts.into_iter().filter(|(_, c)| *c > 1).collect();
            repeated.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
            repeated.truncate(5);
            let top: BTreeMap<String, usize> = repeated
                .into_iter()
                .map(|(v, c)| (v.to_string(), c))
                .collect();

            issues.push(
                Issue::new(
                    format!("Duplicated identifiers in column '{}'", column.name),
                    duplicate_severity(rate),
                    format!(
                        "{duplicates} duplicated values ({rate:.2}%) in a column expected \
                         to be unique"
                    ),
                )
                .with_detail("column", column.name.clone())
                .with_detail("duplicate_count", duplicates)
                .with_detail("duplicate_rate", round2(rate))
                .with_detail("duplicate_values", json!(top)),
            );
        }

        issues
    }

    fn check_code_casing(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            let roles = self.roles.infer(&column.name);
            if !roles.contains(&Role::Code) && !roles.contains(&Role::Flag) {
                continue;
            }
            if column.kind != ColumnKind::Textual {
                continue;
            }

            let distinct: HashSet<&str> = column.non_null().into_iter().collect();
            // Too many values for a code list, probably not codes at all
            if distinct.is_empty() || distinct.len() > 20 {
                continue;
            }

            let folded: HashSet<String> =
                distinct.iter().map(|v| v.to_lowercase()).collect();
            if folded.len() < distinct.len() {
                let mut values: Vec<&str> = distinct.into_iter().collect();
                values.sort_unstable();
                values.truncate(20);
                issues.push(
                    Issue::new(
                        format!("Inconsistent code casing in column '{}'", column.name),
                        Severity::Medium,
                        "The same code value is stored with differing letter case",
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("values", json!(values)),
                );
            }
        }

        issues
    }

    fn check_date_formats(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            if !self.roles.infer(&column.name).contains(&Role::Date) {
                continue;
            }
            if column.kind != ColumnKind::Textual {
                continue;
            }
            let non_null = column.non_null();
            if non_null.is_empty() {
                continue;
            }

            let mut format_counts: BTreeMap<&str, usize> = BTreeMap::new();
            for (format_name, pattern) in DATE_FORMATS.iter() {
                let count = non_null.iter().filter(|v| pattern.is_match(v)).count();
                if count > 0 {
                    format_counts.insert(format_name, count);
                }
            }

            if format_counts.len() > 1 {
                issues.push(
                    Issue::new(
                        format!("Mixed date formats in column '{}'", column.name),
                        Severity::Medium,
                        "More than one date layout is in use",
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("format_counts", json!(format_counts)),
                );
            }
        }

        issues
    }

    fn id_duplicate_rate(&self, table: &Table) -> f64 {
        table
            .columns()
            .iter()
            .filter(|c| self.roles.infer(&c.name).contains(&Role::Identifier))
            .filter_map(|c| {
                let non_null = c.non_null();
                if non_null.is_empty() {
                    return None;
                }
                let metrics = stats::uniqueness_metrics(&non_null);
                Some(metrics.beyond_first_count() as f64 / metrics.total as f64 * 100.0)
            })
            .fold(0.0, f64::max)
    }

    fn score(&self, duplicate_rate: f64, id_duplicate_rate: f64, issue_count: usize) -> f64 {
        let duplicate_score = (100.0 - duplicate_rate * 5.0).max(0.0) * 0.25;
        let id_duplicate_score = (100.0 - id_duplicate_rate * 10.0).max(0.0) * 0.25;
        let penalty = (issue_count as f64 * 10.0).min(50.0);
        let mut total = duplicate_score + id_duplicate_score + (50.0 - penalty);

        if duplicate_rate >= 20.0 || id_duplicate_rate >= 20.0 {
            total *= 0.5;
        } else if duplicate_rate >= 10.0 || id_duplicate_rate >= 10.0 {
            total *= 0.7;
        }

        round2(total.max(0.0))
    }
}

impl Checker for ConsistencyChecker {
    fn dimension(&self) -> Dimension {
        Dimension::Consistency
    }

    fn check(&self, table: &Table) -> CheckResult {
        let mut issues = Vec::new();

        if let Some(issue) = self.check_column_naming(table) {
            issues.push(issue);
        }
        issues.extend(self.check_kind_groups(table));
        issues.extend(self.check_similar_names(table));
        issues.extend(self.check_duplicates(table));
        issues.extend(self.check_code_casing(table));
        issues.extend(self.check_date_formats(table));

        let duplicate_rate = if table.row_count() > 0 {
            table.duplicate_row_count() as f64 / table.row_count() as f64 * 100.0
        } else {
            0.0
        };
        let id_duplicate_rate = self.id_duplicate_rate(table);

        let mut metrics = BTreeMap::new();
        metrics.insert("duplicate_rate".to_string(), json!(round2(duplicate_rate)));
        metrics.insert(
            "id_duplicate_rate".to_string(),
            json!(round2(id_duplicate_rate)),
        );
        metrics.insert("column_count".to_string(), json!(table.column_count()));
        metrics.insert(
            "distinct_row_count".to_string(),
            json!(table.distinct_row_count()),
        );

        let score = self.score(duplicate_rate, id_duplicate_rate, issues.len());
        CheckResult::new(Dimension::Consistency, score, issues, metrics)
    }
}

fn duplicate_severity(rate: f64) -> Severity {
    if rate > 10.0 {
        Severity::High
    } else if rate > 5.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Splits a column name into lowercase word stems and joins the ones that
/// carry meaning.
///
/// Handles `snake_case`, `camelCase`, digit runs and Hangul runs. Generic
/// tokens (`cd`, `code`, `id`, `no`, `nm`, `name`) are dropped so that
/// `customer_id` and `customer_nm` share the stem `customer`.
fn name_key(name: &str) -> Option<String> {
    const STOP_WORDS: [&str; 6] = ["cd", "code", "id", "no", "nm", "name"];

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_class = CharClass::Other;

    for c in name.chars() {
        let class = CharClass::of(c);
        match (current_class, class) {
            // Capitalized word: the capital belongs to the lowercase run
            (CharClass::Upper, CharClass::Lower) => {
                if current.chars().count() > 1 {
                    // Acronym followed by a word, keep the last capital
                    let split_at = current.len() - current.chars().last().map_or(0, char::len_utf8);
                    words.push(current[..split_at].to_string());
                    current = current[split_at..].to_string();
                }
            }
            (a, b) if a != b => {
                if !current.is_empty() {
                    words.push(current.clone());
                    current.clear();
                }
            }
            _ => {}
        }
        if class != CharClass::Other {
            current.push(c);
        }
        current_class = class;
    }
    if !current.is_empty() {
        words.push(current);
    }

    let key_words: Vec<String> = words
        .into_iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect();

    if key_words.is_empty() {
        None
    } else {
        Some(key_words.join("_"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Hangul,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_lowercase() {
            Self::Lower
        } else if c.is_ascii_uppercase() {
            Self::Upper
        } else if c.is_ascii_digit() {
            Self::Digit
        } else if ('가'..='힣').contains(&c) {
            Self::Hangul
        } else {
            Self::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnKind, Table};

    fn text(name: &str, values: &[Option<&str>]) -> Column {
        Column::new(
            name,
            ColumnKind::Textual,
            values.iter().map(|v| v.map(str::to_string)).collect(),
        )
    }

    #[test]
    fn test_name_key_splits_cases() {
        assert_eq!(name_key("customer_id"), Some("customer".to_string()));
        assert_eq!(name_key("customerNm"), Some("customer".to_string()));
        assert_eq!(name_key("OrderAmount2"), Some("order_amount_2".to_string()));
        assert_eq!(name_key("고객명칭"), Some("고객명칭".to_string()));
        assert_eq!(name_key("id"), None);
    }

    #[test]
    fn test_naming_violations() {
        let table = Table::from_columns(vec![
            text("plain_name", &[Some("a")]),
            text("has space", &[Some("a")]),
            text("weird!", &[Some("a")]),
            text("MixedCase", &[Some("a")]),
        ]);
        let result = ConsistencyChecker::new().check(&table);
        let naming = result
            .issues
            .iter()
            .find(|i| i.title.contains("naming"))
            .expect("naming issue");
        // "has space" violates twice (space is also a special character)
        assert_eq!(naming.details["total_count"], serde_json::json!(4));
    }

    #[test]
    fn test_duplicate_records_severity() {
        // 2 duplicates in 8 rows = 25% -> high
        let values: Vec<Option<&str>> = vec![
            Some("a"),
            Some("a"),
            Some("a"),
            Some("b"),
            Some("c"),
            Some("d"),
            Some("e"),
            Some("f"),
        ];
        let table = Table::from_columns(vec![text("v", &values)]);
        let result = ConsistencyChecker::new().check(&table);
        let dup = result
            .issues
            .iter()
            .find(|i| i.title == "Duplicated records")
            .expect("duplicate issue");
        assert_eq!(dup.severity, Severity::High);
        assert_eq!(dup.details["duplicate_count"], serde_json::json!(2));
    }

    #[test]
    fn test_duplicate_identifier_column() {
        let table = Table::from_columns(vec![
            text("user_id", &[Some("1"), Some("1"), Some("2"), Some("3")]),
            text("note", &[Some("a"), Some("b"), Some("c"), Some("d")]),
        ]);
        let result = ConsistencyChecker::new().check(&table);
        let dup = result
            .issues
            .iter()
            .find(|i| i.title.contains("identifiers"))
            .expect("id duplicate issue");
        assert_eq!(dup.details["duplicate_count"], serde_json::json!(1));
        assert_eq!(
            dup.details["duplicate_values"],
            serde_json::json!({"1": 2})
        );
        assert_eq!(result.metrics["id_duplicate_rate"], serde_json::json!(25.0));
    }

    #[test]
    fn test_code_casing_mismatch() {
        let table = Table::from_columns(vec![text(
            "status_code",
            &[Some("OK"), Some("ok"), Some("FAIL")],
        )]);
        let result = ConsistencyChecker::new().check(&table);
        assert!(result.issues.iter().any(|i| i.title.contains("casing")));
    }

    #[test]
    fn test_code_casing_skips_high_cardinality() {
        let values: Vec<String> = (0..30).map(|i| format!("c{i}")).collect();
        let refs: Vec<Option<&str>> = values.iter().map(|v| Some(v.as_str())).collect();
        let table = Table::from_columns(vec![text("item_code", &refs)]);
        let result = ConsistencyChecker::new().check(&table);
        assert!(!result.issues.iter().any(|i| i.title.contains("casing")));
    }

    #[test]
    fn test_mixed_date_formats() {
        let table = Table::from_columns(vec![text(
            "reg_date",
            &[Some("2024-01-01"), Some("2024/01/02"), Some("2024-01-03")],
        )]);
        let result = ConsistencyChecker::new().check(&table);
        let mixed = result
            .issues
            .iter()
            .find(|i| i.title.contains("date formats"))
            .expect("format issue");
        assert_eq!(
            mixed.details["format_counts"],
            serde_json::json!({"YYYY-MM-DD": 2, "YYYY/MM/DD": 1})
        );
    }

    #[test]
    fn test_uniform_date_format_passes() {
        let table = Table::from_columns(vec![text(
            "reg_date",
            &[Some("2024-01-01"), Some("2024-01-02")],
        )]);
        let result = ConsistencyChecker::new().check(&table);
        assert!(!result.issues.iter().any(|i| i.title.contains("date formats")));
    }

    #[test]
    fn test_similar_name_width_mismatch() {
        let table = Table::from_columns(vec![
            text("customer_cd", &[Some("ab")]),
            text("customer_nm", &[Some("abcdefgh")]),
        ]);
        let result = ConsistencyChecker::new().check(&table);
        assert!(result
            .issues
            .iter()
            .any(|i| i.title.contains("mismatched widths")));
    }

    #[test]
    fn test_clean_table_scores_full() {
        let table = Table::from_columns(vec![
            text("city", &[Some("lima"), Some("quito")]),
            text("country", &[Some("pe"), Some("ec")]),
        ]);
        let result = ConsistencyChecker::new().check(&table);
        assert!(result.issues.is_empty());
        assert_eq!(result.score, 100.0);
    }
}
