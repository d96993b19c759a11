//! calidad - Heuristic Data Quality Assessment in Pure Rust
//!
//! Scores tabular datasets across six quality dimensions -- completeness,
//! consistency, accuracy, security, timeliness and usability -- using
//! column-name heuristics and value statistics. No configuration is
//! required: checkers infer column roles from names and degrade gracefully
//! on data they cannot interpret.
//!
//! # Design Principles
//!
//! 1. **Heuristic-first** - Column roles come from names, not schemas
//! 2. **Pure Rust** - No Python, no FFI
//! 3. **Arrow-backed** - `RecordBatch` in, one string snapshot per run
//! 4. **Never fails mid-assessment** - Bad values degrade to issues, not
//!    errors
//!
//! # Quick Start
//!
//! ```no_run
//! use calidad::{aggregate, run_checks, ArrowDataset, Dimension};
//!
//! // Load a CSV file
//! let dataset = ArrowDataset::from_csv("data/customers.csv").unwrap();
//!
//! // Run all six dimension checks
//! let results = run_checks(&dataset, &Dimension::ALL);
//!
//! // Roll the results up into a graded report
//! let report = aggregate(&results);
//! println!("{} ({})", report.overall_score, report.grade);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::redundant_clone,
        clippy::too_many_lines,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]

pub mod checks;
/// CLI module for command-line interface
#[cfg(feature = "cli")]
pub mod cli;
pub mod dataset;
pub mod error;
pub mod report;
pub mod roles;
pub mod stats;
pub mod table;

pub use checks::{
    run_checks, run_named_checks, AccuracyChecker, CheckResult, Checker,
    CompletenessChecker, ConsistencyChecker, Dimension, Issue, SecurityChecker, Severity,
    TimelinessChecker, UsabilityChecker,
};
pub use dataset::{ArrowDataset, CsvOptions, Dataset};
pub use error::{Error, Result};
pub use report::{aggregate, AggregateReport, Grade, SeveritySummary};
pub use roles::{infer_roles, Role, RoleTable, SensitiveCategory};
pub use table::{Column, ColumnKind, Table};
