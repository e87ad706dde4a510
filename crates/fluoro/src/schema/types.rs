//! Declared element types for table columns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared data type of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Molecule identifiers in SMILES notation.
    Smiles,
    /// Text/string values.
    String,
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Float,
    /// Boolean values (true/false).
    Boolean,
    /// Unable to determine type.
    #[default]
    Unknown,
}

impl ColumnType {
    /// Returns true if this type denotes molecule identifiers.
    pub fn is_molecule(&self) -> bool {
        matches!(self, ColumnType::Smiles)
    }

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Infer the declared type of a column from its header and values.
    ///
    /// A header mentioning `smiles` declares a molecule column. Otherwise the
    /// narrowest type that accepts every non-null value wins.
    pub fn infer<'a>(header: &str, values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        if header.to_lowercase().contains("smiles") {
            return ColumnType::Smiles;
        }

        let mut seen = false;
        let mut integer = true;
        let mut float = true;
        let mut boolean = true;

        for value in values.into_iter().flatten() {
            seen = true;
            let v = value.trim();
            integer &= v.parse::<i64>().is_ok();
            float &= v.parse::<f64>().is_ok();
            boolean &= matches!(v.to_lowercase().as_str(), "true" | "false");
            if !integer && !float && !boolean {
                return ColumnType::String;
            }
        }

        if !seen {
            ColumnType::Unknown
        } else if integer {
            ColumnType::Integer
        } else if float {
            ColumnType::Float
        } else if boolean {
            ColumnType::Boolean
        } else {
            ColumnType::String
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Smiles => "smiles",
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(ColumnType::default(), ColumnType::Unknown);
    }

    #[test]
    fn test_smiles_header_declares_molecule() {
        let ty = ColumnType::infer("Canonical SMILES", [Some("CCO"), None]);
        assert_eq!(ty, ColumnType::Smiles);
        assert!(ty.is_molecule());
    }

    #[test]
    fn test_infer_value_types() {
        assert_eq!(ColumnType::infer("n", [Some("1"), Some("2")]), ColumnType::Integer);
        assert_eq!(ColumnType::infer("x", [Some("1.5"), None, Some("2")]), ColumnType::Float);
        assert_eq!(ColumnType::infer("b", [Some("true"), Some("FALSE")]), ColumnType::Boolean);
        assert_eq!(ColumnType::infer("s", [Some("CCO"), Some("1")]), ColumnType::String);
        assert_eq!(ColumnType::infer("e", [None, None]), ColumnType::Unknown);
    }
}
