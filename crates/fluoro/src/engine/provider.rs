//! Inference engine trait and request types.

use serde::Serialize;
use thiserror::Error;

use crate::mode::ModeParameters;
use crate::property::Property;

/// Failure reported by an inference engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The identifier could not be parsed as a molecule.
    #[error("couldn't parse, invalid SMILES: {0}")]
    MalformedIdentifier(String),

    /// The engine could not be reached or started.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The engine answered with something that is not a prediction.
    #[error("invalid engine response: {0}")]
    InvalidResponse(String),

    /// Any other failure inside the engine.
    #[error("engine failure: {0}")]
    Internal(String),
}

/// One prediction to perform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRequest<'a> {
    /// SMILES identifier of the molecule.
    pub identifier: &'a str,
    /// Target property.
    pub property: Property,
    /// Conformer search and model selection.
    pub parameters: ModeParameters,
}

impl<'a> PredictionRequest<'a> {
    pub fn new(identifier: &'a str, property: Property, parameters: ModeParameters) -> Self {
        Self {
            identifier,
            property,
            parameters,
        }
    }
}

/// Trait for inference engines.
///
/// Implementations must be thread-safe (Send + Sync) so a host can share one
/// engine between runs. Each call blocks until the prediction is available.
pub trait InferenceEngine: Send + Sync {
    /// Predict `request.property` for `request.identifier`.
    ///
    /// Malformed identifiers must be reported as
    /// [`EngineError::MalformedIdentifier`], never as a value.
    fn predict(&self, request: &PredictionRequest<'_>) -> Result<f64, EngineError>;

    /// Get the name of this engine (for logging/debugging).
    fn name(&self) -> &str;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for std::sync::Arc<E> {
    fn predict(&self, request: &PredictionRequest<'_>) -> Result<f64, EngineError> {
        (**self).predict(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
