//! Timeliness: freshness, update cadence, future-dated values.

#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::json;

use crate::roles::{Role, RoleTable};
use crate::stats;
use crate::table::{Column, ColumnKind, Table};

use super::{round2, CheckResult, Checker, Dimension, Issue, Severity};

/// Assesses how current the dataset is.
#[derive(Debug)]
pub struct TimelinessChecker {
    roles: RoleTable,
    today: NaiveDate,
}

impl Default for TimelinessChecker {
    fn default() -> Self {
        Self {
            roles: RoleTable::default(),
            today: chrono::Local::now().date_naive(),
        }
    }
}

impl TimelinessChecker {
    /// Creates the checker anchored to the current date.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the checker anchored to a fixed date.
    ///
    /// Freshness and future-date decisions become reproducible, which the
    /// tests rely on.
    #[must_use]
    pub fn anchored_at(today: NaiveDate) -> Self {
        Self {
            roles: RoleTable::default(),
            today,
        }
    }

    fn date_columns<'a>(&self, table: &'a Table) -> Vec<&'a Column> {
        table
            .columns()
            .iter()
            .filter(|c| {
                c.kind == ColumnKind::Temporal
                    || self.roles.infer(&c.name).contains(&Role::Date)
            })
            .collect()
    }

    fn parsed_dates(column: &Column) -> Vec<NaiveDate> {
        column
            .non_null()
            .into_iter()
            .filter_map(stats::parse_date)
            .collect()
    }

    fn check_freshness(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in self.date_columns(table) {
            if !self.roles.infer(&column.name).contains(&Role::Updated) {
                continue;
            }
            let dates = Self::parsed_dates(column);
            let Some(latest) = dates.into_iter().max() else {
                continue;
            };
            let days_old = (self.today - latest).num_days();

            let (severity, description) = if days_old > 180 {
                (
                    Severity::High,
                    format!("The latest update is {days_old} days old; the data has gone stale"),
                )
            } else if days_old > 90 {
                (
                    Severity::Medium,
                    format!("The latest update is {days_old} days old; a refresh may be due"),
                )
            } else {
                continue;
            };

            issues.push(
                Issue::new(
                    format!("Stale data in column '{}'", column.name),
                    severity,
                    description,
                )
                .with_detail("column", column.name.clone())
                .with_detail("latest_date", latest.to_string())
                .with_detail("days_old", days_old),
            );
        }

        issues
    }

    fn check_update_cadence(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in self.date_columns(table) {
            let mut dates = Self::parsed_dates(column);
            if dates.len() < 2 {
                continue;
            }
            dates.sort_unstable();

            let intervals: Vec<f64> = dates
                .windows(2)
                .map(|w| (w[1] - w[0]).num_days() as f64)
                .collect();
            let avg = stats::mean(&intervals);
            let std = stats::std_dev(&intervals);

            if std > avg * 0.5 {
                issues.push(
                    Issue::new(
                        format!("Irregular update cadence in column '{}'", column.name),
                        Severity::Medium,
                        format!(
                            "Update intervals vary widely: {avg:.1} days on average with a \
                             standard deviation of {std:.1} days"
                        ),
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("avg_interval_days", round2(avg))
                    .with_detail("std_interval_days", round2(std)),
                );
            }
        }

        issues
    }

    fn check_future_dates(&self, table: &Table) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in self.date_columns(table) {
            // Scheduled dates are allowed to be in the future
            if self.roles.infer(&column.name).contains(&Role::Scheduled) {
                continue;
            }
            let future = Self::parsed_dates(column)
                .into_iter()
                .filter(|d| *d > self.today)
                .count();
            if future > 0 {
                issues.push(
                    Issue::new(
                        format!("Future dates in column '{}'", column.name),
                        Severity::Medium,
                        format!("{future} dates lie in the future"),
                    )
                    .with_detail("column", column.name.clone())
                    .with_detail("future_count", future),
                );
            }
        }

        issues
    }

    fn latest_date(&self, table: &Table) -> Option<NaiveDate> {
        self.date_columns(table)
            .into_iter()
            .filter_map(|c| Self::parsed_dates(c).into_iter().max())
            .max()
    }

    fn score(&self, days_old: Option<i64>, issue_count: usize) -> f64 {
        let mut base = 100.0;
        if let Some(days) = days_old {
            if days > 365 {
                base -= 40.0;
            } else if days > 180 {
                base -= 25.0;
            } else if days > 90 {
                base -= 15.0;
            }
        }

        let penalty = (issue_count as f64 * 10.0).min(40.0);
        let mut total = base - penalty;

        if days_old.is_some_and(|days| days > 730) {
            total *= 0.5;
        }

        round2(total.max(0.0))
    }
}

impl Checker for TimelinessChecker {
    fn dimension(&self) -> Dimension {
        Dimension::Timeliness
    }

    fn check(&self, table: &Table) -> CheckResult {
        let mut issues = Vec::new();
        issues.extend(self.check_freshness(table));
        issues.extend(self.check_update_cadence(table));
        issues.extend(self.check_future_dates(table));

        let latest = self.latest_date(table);
        let days_old = latest.map(|d| (self.today - d).num_days());

        let mut metrics = BTreeMap::new();
        metrics.insert(
            "latest_date".to_string(),
            latest.map_or(json!(null), |d| json!(d.to_string())),
        );
        metrics.insert(
            "days_old".to_string(),
            days_old.map_or(json!(null), |d| json!(d)),
        );
        metrics.insert(
            "date_column_count".to_string(),
            json!(self.date_columns(table).len()),
        );

        let score = self.score(days_old, issues.len());
        CheckResult::new(Dimension::Timeliness, score, issues, metrics)
    }
}
