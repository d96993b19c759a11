//! Statistical helpers shared by the dimension checkers.
//!
//! All functions here degrade gracefully: too-small or zero-variance
//! samples yield "nothing detected" rather than errors, so checkers never
//! fail on degenerate columns.

#![allow(clippy::cast_precision_loss)]

use chrono::NaiveDate;

/// Outcome of an outlier scan over one numeric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    /// Number of values outside the accepted band.
    pub count: usize,
    /// Lower bound of the accepted band.
    pub lower: f64,
    /// Upper bound of the accepted band.
    pub upper: f64,
}

/// Uniqueness profile of one column's non-null values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquenessMetrics {
    /// Non-null values considered.
    pub total: usize,
    /// Distinct values.
    pub unique_count: usize,
    /// Values occurring exactly once.
    pub unique_once_count: usize,
    /// Total occurrences of every value that appears more than once.
    pub duplicate_occurrences: usize,
}

impl UniquenessMetrics {
    /// Share of values occurring exactly once, as a percentage.
    pub fn uniqueness_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.unique_once_count as f64 / self.total as f64 * 100.0
    }

    /// Occurrences beyond the first of each value.
    ///
    /// A value appearing three times contributes 2, so a fully duplicated
    /// pair counts as 1.
    pub fn beyond_first_count(&self) -> usize {
        self.total - self.unique_count
    }
}

/// Arithmetic mean. Empty input yields 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Fewer than two values yield 0.0.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Quantile with linear interpolation between closest ranks.
///
/// `q` is in `[0, 1]`. Empty input yields 0.0.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = pos - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// IQR outlier detection with the 1.5 fence.
///
/// Needs at least four finite values and a positive IQR; otherwise no
/// report is produced.
pub fn detect_outliers_iqr(values: &[f64]) -> Option<OutlierReport> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 4 {
        return None;
    }
    finite.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&finite, 0.25);
    let q3 = quantile(&finite, 0.75);
    let iqr = q3 - q1;
    if iqr <= 0.0 {
        return None;
    }

    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;
    let count = finite.iter().filter(|v| **v < lower || **v > upper).count();

    Some(OutlierReport {
        count,
        lower,
        upper,
    })
}

/// Z-score outlier detection, used as a fallback when the IQR collapses.
///
/// The threshold loosens to 1.5 for samples of ten or fewer values, 2.0
/// otherwise. Needs more than three values and a positive sample standard
/// deviation.
pub fn detect_outliers_zscore(values: &[f64]) -> Option<OutlierReport> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() <= 3 {
        return None;
    }

    let m = mean(&finite);
    let sd = std_dev(&finite);
    if sd <= 0.0 {
        return None;
    }

    let threshold = if finite.len() <= 10 { 1.5 } else { 2.0 };
    let lower = m - threshold * sd;
    let upper = m + threshold * sd;
    let count = finite.iter().filter(|v| **v < lower || **v > upper).count();

    Some(OutlierReport {
        count,
        lower,
        upper,
    })
}

/// Uniqueness profile over one column's non-null values.
pub fn uniqueness_metrics(values: &[&str]) -> UniquenessMetrics {
    use std::collections::HashMap;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let unique_count = counts.len();
    let unique_once_count = counts.values().filter(|c| **c == 1).count();
    let duplicate_occurrences = counts.values().filter(|c| **c > 1).sum();

    UniquenessMetrics {
        total: values.len(),
        unique_count,
        unique_once_count,
        duplicate_occurrences,
    }
}

/// Number of values whose z-score magnitude exceeds 3.
///
/// Numeric samples are scored directly; text samples are scored by their
/// character lengths. Zero-variance samples report zero deviations.
pub fn pattern_deviation_count(values: &[&str]) -> usize {
    let numeric: Vec<f64> = values.iter().filter_map(|v| parse_number(v)).collect();

    let sample: Vec<f64> = if numeric.len() == values.len() && !numeric.is_empty() {
        numeric
    } else {
        values.iter().map(|v| v.chars().count() as f64).collect()
    };

    if sample.len() < 2 {
        return 0;
    }
    let m = mean(&sample);
    let sd = std_dev(&sample);
    if sd <= 0.0 {
        return 0;
    }

    sample.iter().filter(|v| ((*v - m) / sd).abs() > 3.0).count()
}

/// Parses a cell as a finite number, tolerating surrounding whitespace and
/// thousands separators.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = if trimmed.contains(',') {
        trimmed.chars().filter(|c| *c != ',').collect()
    } else {
        trimmed.to_string()
    };
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a cell as a calendar date.
///
/// Accepts the common date layouts plus ISO datetime variants, taking the
/// date part of any datetime.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d-%m-%Y", "%d/%m/%Y"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}
