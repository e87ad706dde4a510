//! Execution configuration for a prediction run.
//!
//! An [`ExecutionConfig`] is built once per invocation, validated, and passed
//! by reference through the pipeline. Nothing in the pipeline mutates it.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FluoroError, Result};
use crate::mode::ExecutionMode;
use crate::property::{Property, PropertySet};

/// What to do with a row whose identifier is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Abort the whole batch.
    FailBatch,
    /// Emit nulls for the row and continue.
    #[default]
    SkipRow,
}

/// Whether the identifier column must be declared as a molecule column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnCheck {
    /// Any column type is accepted; the engine validates identifiers.
    #[default]
    AnyType,
    /// The column must be declared as SMILES.
    RequireMolecule,
}

/// How properties that were not requested appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnrequestedColumns {
    /// Leave them out of the output table.
    #[default]
    Omit,
    /// Append them after the requested columns, entirely null.
    EmitNull,
}

/// How progress steps are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressAccounting {
    /// Two phases per requested property per row.
    #[default]
    PerProperty,
    /// Two phases per row, shared by all properties.
    PerRow,
}

impl ProgressAccounting {
    /// Steps one row occupies for a given number of requested properties.
    pub fn steps_per_row(&self, property_count: usize) -> usize {
        match self {
            ProgressAccounting::PerProperty => 2 * property_count,
            ProgressAccounting::PerRow => 2,
        }
    }
}

/// Immutable settings for one prediction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Properties to predict.
    pub properties: PropertySet,
    /// Speed/accuracy trade-off.
    pub mode: ExecutionMode,
    /// Column holding SMILES identifiers.
    pub identifier_column: Option<String>,
    /// Column used when `identifier_column` is unset.
    pub fallback_column: Option<String>,
    /// Handling of missing identifiers.
    pub null_policy: NullPolicy,
    /// Declared-type check on the identifier column.
    pub column_check: ColumnCheck,
    /// Layout of properties that were not requested.
    pub unrequested: UnrequestedColumns,
    /// Progress step accounting.
    pub accounting: ProgressAccounting,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            properties: PropertySet::all(),
            mode: ExecutionMode::default(),
            identifier_column: None,
            fallback_column: None,
            null_policy: NullPolicy::default(),
            column_check: ColumnCheck::default(),
            unrequested: UnrequestedColumns::default(),
            accounting: ProgressAccounting::default(),
        }
    }
}

impl ExecutionConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings of the standalone logP node: experimental model, SMILES-typed
    /// column, empty cells skipped.
    pub fn logp_node() -> Self {
        Self {
            properties: PropertySet::only(Property::LogP),
            mode: ExecutionMode::default_for(Property::LogP),
            column_check: ColumnCheck::RequireMolecule,
            null_policy: NullPolicy::SkipRow,
            ..Self::default()
        }
    }

    /// Settings of the standalone pKa node: slow mode, `SMILES` column by
    /// default, empty cells abort the batch.
    pub fn pka_node() -> Self {
        Self {
            properties: PropertySet::only(Property::PKa),
            mode: ExecutionMode::default_for(Property::PKa),
            fallback_column: Some("SMILES".to_string()),
            null_policy: NullPolicy::FailBatch,
            ..Self::default()
        }
    }

    /// Settings of the combined node: both properties, `SMILES` column,
    /// unrequested properties kept as null columns.
    pub fn combined() -> Self {
        Self {
            properties: PropertySet::all(),
            fallback_column: Some("SMILES".to_string()),
            null_policy: NullPolicy::FailBatch,
            unrequested: UnrequestedColumns::EmitNull,
            ..Self::default()
        }
    }

    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_identifier_column(mut self, column: impl Into<String>) -> Self {
        self.identifier_column = Some(column.into());
        self
    }

    pub fn with_fallback_column(mut self, column: impl Into<String>) -> Self {
        self.fallback_column = Some(column.into());
        self
    }

    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    pub fn with_column_check(mut self, check: ColumnCheck) -> Self {
        self.column_check = check;
        self
    }

    pub fn with_unrequested(mut self, unrequested: UnrequestedColumns) -> Self {
        self.unrequested = unrequested;
        self
    }

    pub fn with_accounting(mut self, accounting: ProgressAccounting) -> Self {
        self.accounting = accounting;
        self
    }

    /// The column name the resolver will look for, if any.
    pub fn configured_column(&self) -> Option<&str> {
        fn selected(name: &Option<String>) -> Option<&str> {
            name.as_deref().filter(|name| !name.trim().is_empty())
        }
        selected(&self.identifier_column).or_else(|| selected(&self.fallback_column))
    }

    /// Check settings that can be validated without a table.
    pub fn validate(&self) -> Result<()> {
        if self.properties.is_empty() {
            return Err(FluoroError::Configuration(
                "no property selected, enable logP and/or pKa".to_string(),
            ));
        }
        for property in self.properties.iter() {
            self.mode.parameters(property)?;
        }
        Ok(())
    }

    /// Save the settings to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    FluoroError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            FluoroError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            FluoroError::Persistence(format!("Failed to serialize settings: {}", e))
        })?;

        Ok(())
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            FluoroError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            FluoroError::Persistence(format!(
                "Failed to parse settings '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
