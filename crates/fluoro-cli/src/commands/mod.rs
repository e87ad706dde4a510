//! CLI command implementations.

pub mod predict;
pub mod schema;

use fluoro::{ColumnCheck, ExecutionConfig, Property, PropertySet};

use crate::cli::RunArgs;

/// Column used when neither the settings file nor `--column` names one.
const DEFAULT_COLUMN: &str = "SMILES";

/// Build the execution settings from an optional settings file and flags.
pub fn build_config(args: &RunArgs) -> Result<ExecutionConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.settings {
        Some(path) => ExecutionConfig::load(path)?,
        None => ExecutionConfig::new(),
    };

    if config.fallback_column.is_none() {
        config.fallback_column = Some(DEFAULT_COLUMN.to_string());
    }

    if args.logp || args.pka {
        let mut properties = PropertySet::empty();
        if args.logp {
            properties = properties.with(Property::LogP);
        }
        if args.pka {
            properties = properties.with(Property::PKa);
        }
        config.properties = properties;
    }

    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(column) = &args.column {
        config.identifier_column = Some(column.clone());
    }
    if let Some(policy) = args.null_policy {
        config.null_policy = policy.into();
    }
    if let Some(unrequested) = args.unrequested {
        config.unrequested = unrequested.into();
    }
    if let Some(accounting) = args.progress_accounting {
        config.accounting = accounting.into();
    }
    if args.require_smiles_type {
        config.column_check = ColumnCheck::RequireMolecule;
    }

    config.validate()?;
    Ok(config)
}
