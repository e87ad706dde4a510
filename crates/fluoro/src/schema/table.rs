//! Table-level schema definition.

use serde::{Deserialize, Serialize};

use super::column::ColumnSchema;
use super::types::ColumnType;

/// Schema for an entire table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Schemas for each column, in position order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a new empty table schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table schema with the given columns.
    pub fn with_columns(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    /// Build a schema from `(name, type)` pairs, assigning positions in order.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, ColumnType)>) -> Self {
        let columns = pairs
            .into_iter()
            .enumerate()
            .map(|(position, (name, ty))| ColumnSchema::new(name, position, ty))
            .collect();
        Self { columns }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check whether a column exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Append a column at the end of the table.
    pub fn append(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        let position = self.columns.len();
        self.columns.push(ColumnSchema::new(name, position, column_type));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_position() {
        let schema =
            TableSchema::from_pairs([("id", ColumnType::Integer), ("SMILES", ColumnType::Smiles)])
                .append("logP", ColumnType::Float);

        assert_eq!(schema.column_names(), vec!["id", "SMILES", "logP"]);
        assert_eq!(schema.get_column("logP").map(|c| c.position), Some(2));
        assert!(!schema.contains("pKa"));
    }
}
