//! Integration tests for calidad.

#![allow(clippy::cast_precision_loss, clippy::uninlined_format_args)]

use std::sync::Arc;

use arrow::{
    array::{Float64Array, Int64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema},
};
use calidad::{
    aggregate, run_checks, run_named_checks, ArrowDataset, Dimension, Error, Grade, Severity,
};

/// A small but healthy dataset: unique ids, full columns, valid values.
fn healthy_dataset(rows: usize) -> ArrowDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("user_id", DataType::Int64, false),
        Field::new("segment", DataType::Utf8, false),
        Field::new("score", DataType::Float64, false),
    ]));

    let ids: Vec<i64> = (0..rows as i64).collect();
    let segments: Vec<String> = ids.iter().map(|i| format!("group{}", i % 7)).collect();
    let scores: Vec<f64> = ids.iter().map(|i| 40.0 + (*i % 20) as f64).collect();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(ids)),
            Arc::new(StringArray::from(segments)),
            Arc::new(Float64Array::from(scores)),
        ],
    )
    .expect("batch");
    ArrowDataset::from_batch(batch).expect("dataset")
}

#[test]
fn test_scores_stay_in_range() {
    let csv = "user_id,email,active_yn,amount\n\
               1,a@example.com,Y,10\n\
               1,b@example.com,maybe,-5\n\
               2,,N,99999\n\
               3,not-an-email,N,20\n";
    let dataset = ArrowDataset::from_csv_str(csv).expect("dataset");
    let results = run_checks(&dataset, &Dimension::ALL);

    assert_eq!(results.len(), 6);
    for result in results.values() {
        assert!(
            (0.0..=100.0).contains(&result.score),
            "{} score out of range: {}",
            result.dimension,
            result.score
        );
    }
}

#[test]
fn test_overall_score_is_mean_of_dimensions() {
    let dataset = healthy_dataset(500);
    let results = run_checks(&dataset, &Dimension::ALL);
    let report = aggregate(&results);

    let mean: f64 =
        results.values().map(|r| r.score).sum::<f64>() / results.len() as f64;
    assert!((report.overall_score - (mean * 100.0).round() / 100.0).abs() < 1e-9);
}

#[test]
fn test_assessment_is_idempotent() {
    let dataset = healthy_dataset(200);
    let first = run_checks(&dataset, &Dimension::ALL);
    let second = run_checks(&dataset, &Dimension::ALL);
    assert_eq!(first, second);
}

#[test]
fn test_healthy_dataset_grades_well() {
    let dataset = healthy_dataset(2000);
    let report = aggregate(&run_checks(&dataset, &Dimension::ALL));
    assert!(report.overall_score >= 70.0, "got {}", report.overall_score);
    assert!(matches!(report.grade, Grade::Excellent | Grade::Good));
}

#[test]
fn test_unknown_dimension_name_fails_fast() {
    let dataset = healthy_dataset(10);
    let err = run_named_checks(&dataset, &["accuracy", "velocity"]).unwrap_err();
    assert!(matches!(err, Error::UnknownDimension { .. }));
}

#[test]
fn test_duplicate_pair_counted_once_in_both_dimensions() {
    // Rows 1 and 2 are identical: a fully duplicated pair counts as one
    // duplicate, in completeness and consistency alike
    let csv = "name,city,amount\n\
               ana,lima,10\n\
               ana,lima,10\n\
               luis,quito,20\n\
               rosa,bogota,30\n\
               ines,cusco,40\n";
    let dataset = ArrowDataset::from_csv_str(csv).expect("dataset");
    let results = run_checks(&dataset, &[Dimension::Completeness, Dimension::Consistency]);

    let completeness = &results[&Dimension::Completeness];
    let dup = completeness
        .issues
        .iter()
        .find(|i| i.title.contains("duplicated records"))
        .expect("completeness duplicate issue");
    assert_eq!(dup.details["duplicate_count"], serde_json::json!(1));

    let consistency = &results[&Dimension::Consistency];
    let dup = consistency
        .issues
        .iter()
        .find(|i| i.title == "Duplicated records")
        .expect("consistency duplicate issue");
    assert_eq!(dup.details["duplicate_count"], serde_json::json!(1));
    assert_eq!(
        consistency.metrics["distinct_row_count"],
        serde_json::json!(4)
    );
}

#[test]
fn test_unused_columns_lists_all_null_and_constant() {
    let csv = "id,empty,constant,varied\n\
               1,,x,a\n\
               2,,x,b\n\
               3,,x,c\n";
    let dataset = ArrowDataset::from_csv_str(csv).expect("dataset");
    let results = run_checks(&dataset, &[Dimension::Completeness]);

    let unused = results[&Dimension::Completeness]
        .issues
        .iter()
        .find(|i| i.title.contains("Unused"))
        .expect("unused issue");
    let listed = unused.details["unused_columns"]
        .as_array()
        .expect("array");
    assert!(listed.contains(&serde_json::json!("empty")));
    assert!(listed.contains(&serde_json::json!("constant")));
    assert!(!listed.contains(&serde_json::json!("varied")));
}

#[test]
fn test_flag_domain_error_count() {
    let csv = "use_yn\nY\nN\nmaybe\nY\n";
    let dataset = ArrowDataset::from_csv_str(csv).expect("dataset");
    let results = run_checks(&dataset, &[Dimension::Accuracy]);

    let issue = results[&Dimension::Accuracy]
        .issues
        .iter()
        .find(|i| i.title.contains("flag"))
        .expect("flag issue");
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.details["error_count"], serde_json::json!(1));
}

#[test]
fn test_exposed_email_count() {
    let csv = "email\nana@example.com\nluis@example.org\nmasked\n";
    let dataset = ArrowDataset::from_csv_str(csv).expect("dataset");
    let results = run_checks(&dataset, &[Dimension::Security]);

    let security = &results[&Dimension::Security];
    let issue = security
        .issues
        .iter()
        .find(|i| i.title.contains("email"))
        .expect("pii issue");
    assert_eq!(issue.details["count"], serde_json::json!(2));
    assert_eq!(
        security.metrics["sensitive_column_count"],
        serde_json::json!(1)
    );
}

#[test]
fn test_start_after_end_detected() {
    let csv = "start_date,end_date\n\
               2024-01-10,2024-01-05\n\
               2024-02-01,2024-02-28\n";
    let dataset = ArrowDataset::from_csv_str(csv).expect("dataset");
    let results = run_checks(&dataset, &[Dimension::Accuracy]);

    let issue = results[&Dimension::Accuracy]
        .issues
        .iter()
        .find(|i| i.title.contains("Start date after end"))
        .expect("order issue");
    assert_eq!(issue.details["error_count"], serde_json::json!(1));
}

#[test]
fn test_report_json_export() {
    let dataset = healthy_dataset(50);
    let report = aggregate(&run_checks(&dataset, &Dimension::ALL));
    let json = report.to_json().expect("json");

    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
    assert!(value["timestamp"].as_u64().is_some());
    assert_eq!(value["results"].as_object().expect("results map").len(), 6);
    for dimension in Dimension::ALL {
        let result = &value["results"][dimension.name()];
        assert!(result["score"].is_number());
        assert_eq!(result["name"], serde_json::json!(dimension.name()));
    }
}

#[test]
fn test_subset_of_dimensions_runs_only_those() {
    let dataset = healthy_dataset(20);
    let results = run_checks(&dataset, &[Dimension::Security, Dimension::Usability]);
    assert_eq!(results.len(), 2);
    assert!(results.contains_key(&Dimension::Security));
    assert!(results.contains_key(&Dimension::Usability));

    let report = aggregate(&results);
    assert_eq!(report.results.len(), 2);
}

#[test]
fn test_single_row_dataset_degrades_gracefully() {
    let csv = "id,name,amount\n1,ana,10\n";
    let dataset = ArrowDataset::from_csv_str(csv).expect("dataset");
    let results = run_checks(&dataset, &Dimension::ALL);

    for result in results.values() {
        assert!((0.0..=100.0).contains(&result.score));
    }
    // One row cannot be an outlier or a duplicate
    assert!(!results[&Dimension::Completeness]
        .issues
        .iter()
        .any(|i| i.title.contains("Outliers") || i.title.contains("duplicated")));
}
