//! Resolution of the column that supplies molecule identifiers.

use log::{error, info};

use crate::config::{ColumnCheck, ExecutionConfig};
use crate::error::{FluoroError, Result};
use crate::schema::TableSchema;

/// The validated identifier column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub name: String,
    pub position: usize,
}

/// Determine and validate which column holds SMILES identifiers.
pub fn resolve_identifier_column(
    config: &ExecutionConfig,
    schema: &TableSchema,
) -> Result<ResolvedColumn> {
    let Some(name) = config.configured_column() else {
        error!("No identifier column is selected");
        return Err(FluoroError::Configuration(
            "no column selected, please specify the column that contains SMILES".to_string(),
        ));
    };

    let Some(column) = schema.get_column(name) else {
        error!("Column '{}' is not present in the input table", name);
        return Err(FluoroError::Configuration(format!(
            "column absent: input schema does not contain the '{}' column",
            name
        )));
    };

    if config.column_check == ColumnCheck::RequireMolecule && !column.column_type.is_molecule() {
        error!(
            "Column '{}' is declared {} instead of SMILES",
            name, column.column_type
        );
        return Err(FluoroError::TypeMismatch {
            column: name.to_string(),
            declared: column.column_type,
        });
    }

    info!(
        "SMILES column: {} (position {}, selected: {:?})",
        column.name, column.position, config.identifier_column
    );

    Ok(ResolvedColumn {
        name: column.name.clone(),
        position: column.position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn schema() -> TableSchema {
        TableSchema::from_pairs([
            ("name", ColumnType::String),
            ("SMILES", ColumnType::Smiles),
            ("structure", ColumnType::String),
        ])
    }

    #[test]
    fn test_no_column_selected() {
        let err = resolve_identifier_column(&ExecutionConfig::new(), &schema()).unwrap_err();
        match err {
            FluoroError::Configuration(msg) => assert!(msg.contains("no column selected")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_absent() {
        let config = ExecutionConfig::new().with_identifier_column("smiles");
        let err = resolve_identifier_column(&config, &schema()).unwrap_err();
        match err {
            FluoroError::Configuration(msg) => {
                assert!(msg.contains("column absent"));
                assert!(msg.contains("'smiles'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolves_explicit_and_fallback() {
        let config = ExecutionConfig::new().with_identifier_column("structure");
        let resolved = resolve_identifier_column(&config, &schema()).unwrap();
        assert_eq!(resolved.name, "structure");
        assert_eq!(resolved.position, 2);

        let resolved = resolve_identifier_column(&ExecutionConfig::pka_node(), &schema()).unwrap();
        assert_eq!(resolved.position, 1);
    }

    #[test]
    fn test_require_molecule_type() {
        let config = ExecutionConfig::logp_node().with_identifier_column("structure");
        let err = resolve_identifier_column(&config, &schema()).unwrap_err();
        assert!(matches!(
            err,
            FluoroError::TypeMismatch {
                ref column,
                declared: ColumnType::String,
            } if column == "structure"
        ));

        let config = ExecutionConfig::logp_node().with_identifier_column("SMILES");
        assert!(resolve_identifier_column(&config, &schema()).is_ok());
    }
}
