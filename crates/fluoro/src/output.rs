//! Assembly and export of the output table.
//!
//! The output keeps every input column untouched and appends one `f64` column
//! per property: requested properties first in canonical order, then (only
//! with [`UnrequestedColumns::EmitNull`]) the remaining properties as
//! all-null columns.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use log::error;
use serde_json::Value;

use crate::config::{ExecutionConfig, UnrequestedColumns};
use crate::error::{FluoroError, Result};
use crate::input::DataTable;
use crate::orchestrator::RowOutcome;
use crate::property::Property;
use crate::schema::{ColumnType, TableSchema};

/// Properties appended to the output, in column order.
pub fn appended_properties(config: &ExecutionConfig) -> Vec<Property> {
    let mut properties: Vec<Property> = config.properties.iter().collect();
    if config.unrequested == UnrequestedColumns::EmitNull {
        properties.extend(config.properties.missing());
    }
    properties
}

fn check_collisions<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    appended: &[Property],
) -> Result<()> {
    for name in existing {
        if let Some(property) = appended.iter().find(|p| p.column_name() == name) {
            error!("Input table already has a '{}' column", name);
            return Err(FluoroError::Configuration(format!(
                "input already contains a '{}' column; rename it before predicting {}",
                name, property
            )));
        }
    }
    Ok(())
}

/// Schema of the output table, computed without running predictions.
pub fn output_schema(input: &TableSchema, config: &ExecutionConfig) -> Result<TableSchema> {
    let appended = appended_properties(config);
    check_collisions(input.columns.iter().map(|c| c.name.as_str()), &appended)?;

    Ok(appended
        .into_iter()
        .fold(input.clone(), |schema, p| schema.append(p.column_name(), ColumnType::Float)))
}

/// Merge per-row outcomes into the output table.
pub fn assemble(
    table: &DataTable,
    rows: Vec<RowOutcome>,
    config: &ExecutionConfig,
) -> Result<PredictionTable> {
    if rows.len() != table.row_count() {
        return Err(FluoroError::Internal(format!(
            "{} outcomes for {} input rows",
            rows.len(),
            table.row_count()
        )));
    }

    let appended = appended_properties(config);
    check_collisions(table.headers.iter().map(String::as_str), &appended)?;

    let mut columns: IndexMap<Property, Vec<Option<f64>>> = appended
        .iter()
        .map(|p| (*p, Vec::with_capacity(rows.len())))
        .collect();

    for (index, row) in rows.iter().enumerate() {
        if row.row != index {
            return Err(FluoroError::Internal(format!(
                "outcome for row {} arrived at position {}",
                row.row, index
            )));
        }
        for (property, values) in columns.iter_mut() {
            values.push(row.get(*property).and_then(|o| o.value()));
        }
    }

    Ok(PredictionTable {
        input: table.clone(),
        columns,
    })
}

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Csv,
    Json,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// The input table with predicted property columns appended.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTable {
    /// Original table, unchanged.
    pub input: DataTable,
    /// Appended columns in output order.
    pub columns: IndexMap<Property, Vec<Option<f64>>>,
}

impl PredictionTable {
    /// Number of rows, always equal to the input row count.
    pub fn row_count(&self) -> usize {
        self.input.row_count()
    }

    /// All column names: input columns, then appended property columns.
    pub fn column_names(&self) -> Vec<&str> {
        self.input
            .headers
            .iter()
            .map(String::as_str)
            .chain(self.columns.keys().map(|p| p.column_name()))
            .collect()
    }

    /// Schema of this table.
    pub fn schema(&self) -> TableSchema {
        self.columns.keys().fold(self.input.schema(), |schema, p| {
            schema.append(p.column_name(), ColumnType::Float)
        })
    }

    /// Values of an appended property column.
    pub fn property_values(&self, property: Property) -> Option<&[Option<f64>]> {
        self.columns.get(&property).map(Vec::as_slice)
    }

    /// Predicted value for one row.
    pub fn value(&self, row: usize, property: Property) -> Option<f64> {
        self.columns.get(&property)?.get(row).copied().flatten()
    }

    /// Cell text for an input column, or the formatted value of an appended one.
    pub fn get(&self, row: usize, column: &str) -> Option<String> {
        if let Some(index) = self.input.column_index(column) {
            return self.input.get(row, index).map(str::to_string);
        }
        let property = self.columns.keys().find(|p| p.column_name() == column)?;
        self.value(row, *property).map(|v| v.to_string())
    }

    /// Write the table as delimited text with a header row. Nulls are empty.
    pub fn write_delimited<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        out.write_record(self.column_names())?;

        for row in 0..self.row_count() {
            let input = self.input.rows[row]
                .iter()
                .map(|cell| cell.clone().unwrap_or_default());
            let appended = self
                .columns
                .values()
                .map(|values| values[row].map(|v| v.to_string()).unwrap_or_default());
            out.write_record(input.chain(appended))?;
        }

        out.flush()
            .map_err(|e| FluoroError::Persistence(format!("Failed to flush output: {}", e)))?;
        Ok(())
    }

    /// Rows as JSON objects with columns in output order.
    pub fn to_json_records(&self) -> Vec<IndexMap<String, Value>> {
        (0..self.row_count())
            .map(|row| {
                let mut record = IndexMap::new();
                for (index, header) in self.input.headers.iter().enumerate() {
                    let cell = self.input.get(row, index);
                    record.insert(
                        header.clone(),
                        cell.map_or(Value::Null, |s| Value::String(s.to_string())),
                    );
                }
                for (property, values) in &self.columns {
                    record.insert(
                        property.column_name().to_string(),
                        values[row].map_or(Value::Null, Value::from),
                    );
                }
                record
            })
            .collect()
    }

    /// Save to a file in the given format.
    pub fn save(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| FluoroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let writer = BufWriter::new(file);

        match format {
            OutputFormat::Tsv => self.write_delimited(writer, b'\t'),
            OutputFormat::Csv => self.write_delimited(writer, b','),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(writer, &self.to_json_records())?;
                Ok(())
            }
        }
    }
}
