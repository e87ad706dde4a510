//! Execution modes and the engine parameters they select.
//!
//! A mode trades prediction speed against accuracy, or switches to the
//! alternate model. The mapping is a pure function of `(mode, property)`:
//!
//! | mode           | conformer search | model           |
//! |----------------|------------------|-----------------|
//! | `Fast`         | reduced          | primary (h2o)   |
//! | `Slow`         | exhaustive       | primary (h2o)   |
//! | `Experimental` | reduced          | alternate (gnn) |
//!
//! `Experimental` is only defined for logP.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FluoroError, Result};
use crate::property::Property;

/// How thoroughly the engine enumerates conformers during feature generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConformerSearch {
    /// A small, fixed conformer budget.
    Reduced,
    /// `3^(double bonds)` conformers; cost grows quickly with molecule size.
    Exhaustive,
}

impl ConformerSearch {
    /// Whether the engine should run in its fast mode.
    pub fn is_fast(&self) -> bool {
        matches!(self, ConformerSearch::Reduced)
    }
}

/// Which trained model the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Gradient-boosted models over generated descriptors.
    Primary,
    /// Graph neural network over quickly generated features.
    Alternate,
}

impl ModelVariant {
    /// Model name understood by external engines.
    pub fn engine_name(&self) -> &'static str {
        match self {
            ModelVariant::Primary => "h2o",
            ModelVariant::Alternate => "gnn",
        }
    }
}

/// Engine parameters selected by an execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModeParameters {
    pub conformers: ConformerSearch,
    pub model: ModelVariant,
}

/// Speed/accuracy trade-off for a prediction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Fewer conformers: faster, less accurate.
    Fast,
    /// Exhaustive conformers: slower, more accurate.
    #[default]
    Slow,
    /// Alternate graph model (logP only).
    Experimental,
}

impl ExecutionMode {
    /// Default mode of the single-property node for `property`.
    pub fn default_for(property: Property) -> Self {
        match property {
            Property::LogP => ExecutionMode::Experimental,
            Property::PKa => ExecutionMode::Slow,
        }
    }

    /// Whether this mode can be used to predict `property`.
    pub fn supports(&self, property: Property) -> bool {
        !matches!((self, property), (ExecutionMode::Experimental, Property::PKa))
    }

    /// Engine parameters for predicting `property` in this mode.
    pub fn parameters(&self, property: Property) -> Result<ModeParameters> {
        let params = match self {
            ExecutionMode::Fast => ModeParameters {
                conformers: ConformerSearch::Reduced,
                model: ModelVariant::Primary,
            },
            ExecutionMode::Slow => ModeParameters {
                conformers: ConformerSearch::Exhaustive,
                model: ModelVariant::Primary,
            },
            ExecutionMode::Experimental if property == Property::LogP => ModeParameters {
                // The graph model skips conformer search entirely
                conformers: ConformerSearch::Reduced,
                model: ModelVariant::Alternate,
            },
            ExecutionMode::Experimental => {
                return Err(FluoroError::Configuration(format!(
                    "{} mode is only available for logP, not {}",
                    self.label(),
                    property
                )));
            }
        };
        Ok(params)
    }

    /// Human-readable option label.
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionMode::Fast => "Fast/Inaccurate",
            ExecutionMode::Slow => "Slow/Accurate",
            ExecutionMode::Experimental => "Experimental - Fast/Accurate",
        }
    }

    /// Longer description of the trade-off.
    pub fn description(&self) -> &'static str {
        match self {
            ExecutionMode::Fast => {
                "Generates fewer conformers for feature generation. Faster, but less accurate."
            }
            ExecutionMode::Slow => {
                "Generates 3^(number of double bonds) conformers for feature generation. \
                 Slower, but more accurate."
            }
            ExecutionMode::Experimental => {
                "Uses a graph neural network with quickly generated features (logP only)."
            }
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Fast => write!(f, "fast"),
            ExecutionMode::Slow => write!(f, "slow"),
            ExecutionMode::Experimental => write!(f, "experimental"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(ExecutionMode::Fast),
            "slow" | "accurate" => Ok(ExecutionMode::Slow),
            "experimental" | "gnn" => Ok(ExecutionMode::Experimental),
            _ => Err(format!(
                "Unknown execution mode: {}. Use fast, slow, or experimental.",
                s
            )),
        }
    }
}
