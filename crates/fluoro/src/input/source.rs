//! Data source abstraction and metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{ColumnType, TableSchema};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// Represents parsed tabular data with declared column types.
///
/// Cells are `None` when the value is missing or one of the recognised null
/// tokens; see [`DataTable::is_null_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Declared type of each column, parallel to `headers`.
    pub column_types: Vec<ColumnType>,
    /// Row data (row-major order).
    pub rows: Vec<Vec<Option<String>>>,
    /// The delimiter used.
    pub delimiter: u8,
}

impl DataTable {
    /// Create a new data table, inferring column types from the data.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>, delimiter: u8) -> Self {
        let column_types = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                ColumnType::infer(h, rows.iter().map(|r| r.get(i).and_then(|c| c.as_deref())))
            })
            .collect();

        Self {
            headers,
            column_types,
            rows,
            delimiter,
        }
    }

    /// Build a table from string cells, mapping null tokens to `None`.
    pub fn from_rows<S: AsRef<str>>(headers: &[&str], rows: &[Vec<Option<S>>]) -> Self {
        let headers = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().and_then(|c| Self::normalize_cell(c.as_ref())))
                    .collect()
            })
            .collect();
        Self::new(headers, rows, b'\t')
    }

    /// Override the declared type of a column.
    pub fn with_column_type(mut self, name: &str, column_type: ColumnType) -> Self {
        if let Some(index) = self.column_index(name) {
            self.column_types[index] = column_type;
        }
        self
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|c| c.as_deref()))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    /// The column catalogue of this table.
    pub fn schema(&self) -> TableSchema {
        TableSchema::from_pairs(
            self.headers
                .iter()
                .map(String::as_str)
                .zip(self.column_types.iter().copied()),
        )
    }

    /// Map a raw cell to `None` when it represents a missing value.
    pub fn normalize_cell(value: &str) -> Option<String> {
        if Self::is_null_value(value) {
            None
        } else {
            Some(value.trim().to_string())
        }
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null_value() {
        assert!(DataTable::is_null_value(""));
        assert!(DataTable::is_null_value("  "));
        assert!(DataTable::is_null_value("NA"));
        assert!(DataTable::is_null_value("NaN"));
        assert!(DataTable::is_null_value("None"));
        assert!(!DataTable::is_null_value("CCO"));
        assert!(!DataTable::is_null_value("C"));
    }

    #[test]
    fn test_from_rows_and_schema() {
        let table = DataTable::from_rows(
            &["id", "SMILES"],
            &[
                vec![Some("1"), Some("CCO")],
                vec![Some("2"), Some("NA")],
                vec![Some("3"), None],
            ],
        );

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.get(0, 1), Some("CCO"));
        assert_eq!(table.get(1, 1), None);
        assert_eq!(table.column_values(1).collect::<Vec<_>>(), vec![Some("CCO"), None, None]);

        let schema = table.schema();
        assert_eq!(schema.get_column("id").unwrap().column_type, ColumnType::Integer);
        assert_eq!(schema.get_column("SMILES").unwrap().column_type, ColumnType::Smiles);
    }

    #[test]
    fn test_with_column_type_override() {
        let table = DataTable::from_rows(&["mol"], &[vec![Some("CCO")]])
            .with_column_type("mol", ColumnType::Smiles);
        assert_eq!(table.column_types, vec![ColumnType::Smiles]);
    }
}
