//! Immutable tabular snapshot consumed by the dimension checkers.
//!
//! A [`Table`] is collected once per assessment run from a [`Dataset`]: an
//! ordered list of equally sized columns whose cells are either null or the
//! canonical string rendering of a typed scalar. Everything the checkers
//! derive from it (issues, metrics) is an independent copy, so the caller
//! may drop or mutate the source dataset after a run without affecting
//! results.

// Statistical computation and cell rendering
#![allow(clippy::cast_precision_loss)]

use std::collections::HashSet;

use arrow::datatypes::DataType;

use crate::dataset::Dataset;

/// Primitive kind of a column, inferred from the Arrow data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Integer or floating point values.
    Numeric,
    /// True/false values.
    Boolean,
    /// Dates and timestamps.
    Temporal,
    /// Strings and everything else.
    Textual,
}

impl ColumnKind {
    /// Human-readable kind name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Temporal => "temporal",
            Self::Textual => "textual",
        }
    }

    fn from_data_type(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64 => Self::Numeric,
            DataType::Boolean => Self::Boolean,
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => Self::Temporal,
            _ => Self::Textual,
        }
    }
}

/// A single named column of the snapshot.
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name, unique within the table.
    pub name: String,
    /// Inferred primitive kind.
    pub kind: ColumnKind,
    /// Cells in row order; `None` is a null.
    pub values: Vec<Option<String>>,
}

impl Column {
    /// Creates a column from name, kind and cells.
    pub fn new(
        name: impl Into<String>,
        kind: ColumnKind,
        values: Vec<Option<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Non-null cell values in row order.
    pub fn non_null(&self) -> Vec<&str> {
        self.values.iter().filter_map(|v| v.as_deref()).collect()
    }

    /// Number of non-null cells whose trimmed value is empty.
    ///
    /// Only meaningful for textual columns; numeric renderings are never
    /// blank.
    pub fn blank_count(&self) -> usize {
        self.values
            .iter()
            .filter_map(|v| v.as_deref())
            .filter(|v| v.trim().is_empty())
            .count()
    }

    /// Number of distinct non-null values.
    pub fn distinct_count(&self) -> usize {
        self.non_null().into_iter().collect::<HashSet<_>>().len()
    }

    /// True if every cell is null.
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(|v| v.is_none())
    }

    /// Non-null cells parsed as finite numbers, in row order.
    ///
    /// Values that fail to parse are skipped, never reported.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| v.as_deref())
            .filter_map(crate::stats::parse_number)
            .collect()
    }
}

/// The snapshot of one dataset: ordered columns of equal length.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table directly from columns.
    ///
    /// Columns shorter than the longest one are padded with nulls so the
    /// equal-length invariant always holds.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let row_count = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        let mut columns = columns;
        for column in &mut columns {
            column.values.resize(row_count, None);
        }
        Self { columns, row_count }
    }

    /// Collects a snapshot from a dataset.
    ///
    /// Cells are rendered to canonical strings per Arrow type; unsupported
    /// types render as `"?"` so row-level duplicate detection stays total.
    pub fn from_dataset(dataset: &dyn Dataset) -> Self {
        use arrow::array::{
            Array, BooleanArray, Date32Array, Date64Array, Float32Array, Float64Array,
            Int16Array, Int32Array, Int64Array, Int8Array, LargeStringArray, StringArray,
            TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
            TimestampSecondArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
        };

        let schema = dataset.schema();
        let mut columns: Vec<Column> = schema
            .fields()
            .iter()
            .map(|field| Column {
                name: field.name().clone(),
                kind: ColumnKind::from_data_type(field.data_type()),
                values: Vec::with_capacity(dataset.len()),
            })
            .collect();

        for batch in dataset.iter() {
            for (col_idx, column) in columns.iter_mut().enumerate() {
                let array = batch.column(col_idx);

                for i in 0..array.len() {
                    // NullArray carries no validity buffer, every cell is null
                    if array.is_null(i) || array.data_type() == &DataType::Null {
                        column.values.push(None);
                    } else if let Some(arr) = array.as_any().downcast_ref::<StringArray>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<LargeStringArray>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<Int8Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<Int16Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<Int32Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<Int64Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<UInt8Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<UInt16Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<UInt32Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<UInt64Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<Float32Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<Float64Array>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<BooleanArray>() {
                        column.values.push(Some(arr.value(i).to_string()));
                    } else if let Some(arr) = array.as_any().downcast_ref::<Date32Array>() {
                        column.values.push(Some(render_date32(arr.value(i))));
                    } else if let Some(arr) = array.as_any().downcast_ref::<Date64Array>() {
                        column.values.push(Some(render_date64(arr.value(i))));
                    } else if let Some(arr) =
                        array.as_any().downcast_ref::<TimestampSecondArray>()
                    {
                        column.values.push(Some(render_timestamp(arr.value(i), 1)));
                    } else if let Some(arr) =
                        array.as_any().downcast_ref::<TimestampMillisecondArray>()
                    {
                        column
                            .values
                            .push(Some(render_timestamp(arr.value(i), 1_000)));
                    } else if let Some(arr) =
                        array.as_any().downcast_ref::<TimestampMicrosecondArray>()
                    {
                        column
                            .values
                            .push(Some(render_timestamp(arr.value(i), 1_000_000)));
                    } else if let Some(arr) =
                        array.as_any().downcast_ref::<TimestampNanosecondArray>()
                    {
                        column
                            .values
                            .push(Some(render_timestamp(arr.value(i), 1_000_000_000)));
                    } else {
                        column.values.push(Some("?".to_string()));
                    }
                }
            }
        }

        let row_count = columns.first().map_or(0, |c| c.values.len());
        Self { columns, row_count }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of cells (rows x columns).
    pub fn cell_count(&self) -> usize {
        self.row_count * self.columns.len()
    }

    /// Columns in dataset order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Total null cells across all columns.
    pub fn null_cell_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Number of rows identical to an earlier row.
    ///
    /// A fully duplicated pair counts as 1: only occurrences beyond the
    /// first are duplicates. The same convention applies everywhere in the
    /// crate.
    pub fn duplicate_row_count(&self) -> usize {
        if self.columns.is_empty() || self.row_count == 0 {
            return 0;
        }

        let mut seen: HashSet<String> = HashSet::with_capacity(self.row_count);
        let mut duplicates = 0;

        for i in 0..self.row_count {
            let key = self.row_key(i);
            if !seen.insert(key) {
                duplicates += 1;
            }
        }

        duplicates
    }

    /// Number of distinct rows.
    pub fn distinct_row_count(&self) -> usize {
        self.row_count - self.duplicate_row_count()
    }

    fn row_key(&self, row: usize) -> String {
        use std::fmt::Write;

        // Length-prefixed cells: no cell content can forge a null or a
        // cell boundary
        let mut key = String::new();
        for column in &self.columns {
            match column.values.get(row).and_then(|v| v.as_deref()) {
                Some(v) => {
                    let _ = write!(key, "{}:{v}", v.len());
                }
                None => key.push('n'),
            }
        }
        key
    }
}

fn render_date32(days: i32) -> String {
    arrow::temporal_conversions::date32_to_datetime(days)
        .map(|dt| dt.date().to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn render_date64(millis: i64) -> String {
    arrow::temporal_conversions::date64_to_datetime(millis)
        .map(|dt| dt.date().to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn render_timestamp(value: i64, per_second: i64) -> String {
    let secs = value.div_euclid(per_second);
    let subsec = value.rem_euclid(per_second);
    let nanos = match per_second {
        1 => 0,
        1_000 => subsec * 1_000_000,
        1_000_000 => subsec * 1_000,
        _ => subsec,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    chrono::DateTime::from_timestamp(secs, nanos as u32)
        .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Date32Array, Float64Array, Int64Array, RecordBatch, StringArray},
        datatypes::{DataType, Field, Schema},
    };

    use super::*;
    use crate::dataset::ArrowDataset;

    fn text_column(name: &str, values: &[Option<&str>]) -> Column {
        Column::new(
            name,
            ColumnKind::Textual,
            values.iter().map(|v| v.map(str::to_string)).collect(),
        )
    }

    #[test]
    fn test_from_columns_pads_to_equal_length() {
        let table = Table::from_columns(vec![
            text_column("a", &[Some("1"), Some("2"), Some("3")]),
            text_column("b", &[Some("x")]),
        ]);

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column("b").map(Column::null_count), Some(2));
    }

    #[test]
    fn test_from_dataset_collects_all_kinds() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("score", DataType::Float64, true),
            Field::new("name", DataType::Utf8, true),
            Field::new("joined", DataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(Float64Array::from(vec![Some(1.5), None])),
                Arc::new(StringArray::from(vec![Some("ana"), Some("luis")])),
                Arc::new(Date32Array::from(vec![Some(19723), None])),
            ],
        )
        .expect("batch");
        let dataset = ArrowDataset::from_batch(batch).expect("dataset");

        let table = Table::from_dataset(&dataset);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.cell_count(), 8);
        assert_eq!(table.null_cell_count(), 2);

        let id = table.column("id").expect("id column");
        assert_eq!(id.kind, ColumnKind::Numeric);
        assert_eq!(id.values, vec![Some("1".to_string()), Some("2".to_string())]);

        let joined = table.column("joined").expect("joined column");
        assert_eq!(joined.kind, ColumnKind::Temporal);
        // 19723 days after the epoch is 2024-01-01
        assert_eq!(joined.values[0].as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_duplicate_rows_beyond_first_occurrence() {
        let table = Table::from_columns(vec![
            text_column("a", &[Some("1"), Some("1"), Some("1"), Some("2")]),
            text_column("b", &[Some("x"), Some("x"), Some("x"), Some("y")]),
        ]);

        // Three identical rows count as 2 duplicates, not 3
        assert_eq!(table.duplicate_row_count(), 2);
        assert_eq!(table.distinct_row_count(), 2);
    }

    #[test]
    fn test_duplicate_rows_distinguish_null_from_text() {
        // A cell spelling out a null marker is not a null
        let table = Table::from_columns(vec![
            text_column("a", &[None, Some("\u{0}NULL"), Some("n")]),
            text_column("b", &[Some("x"), Some("x"), Some("x")]),
        ]);

        assert_eq!(table.duplicate_row_count(), 0);
    }

    #[test]
    fn test_duplicate_rows_distinguish_shifted_cell_content() {
        // Rows whose concatenated text is identical are still distinct rows
        let table = Table::from_columns(vec![
            text_column("a", &[Some("ab"), Some("a")]),
            text_column("b", &[Some("c"), Some("bc")]),
        ]);

        assert_eq!(table.duplicate_row_count(), 0);
        assert_eq!(table.distinct_row_count(), 2);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::from_columns(vec![]);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.cell_count(), 0);
        assert_eq!(table.duplicate_row_count(), 0);
    }

    #[test]
    fn test_column_helpers() {
        let column = text_column("c", &[Some("a"), Some(" "), Some(""), None, Some("a")]);
        assert_eq!(column.null_count(), 1);
        assert_eq!(column.blank_count(), 2);
        assert_eq!(column.non_null().len(), 4);
        assert_eq!(column.distinct_count(), 3);
        assert!(!column.is_all_null());
    }

    #[test]
    fn test_numeric_values_skip_unparseable() {
        let column = text_column("n", &[Some("1"), Some("2.5"), Some("abc"), None]);
        assert_eq!(column.numeric_values(), vec![1.0, 2.5]);
    }
}
