//! Mock inference engine for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::mode::{ModeParameters, ModelVariant};
use crate::property::Property;

use super::provider::{EngineError, InferenceEngine, PredictionRequest};

/// A call received by [`MockEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub identifier: String,
    pub property: Property,
    pub parameters: ModeParameters,
}

/// Mock engine that returns predictable values and records every call.
///
/// Values are a cheap function of the atoms in the identifier, so the same
/// SMILES always yields the same prediction. Identifiers with unbalanced
/// parentheses or brackets are rejected as malformed.
#[derive(Debug, Default)]
pub struct MockEngine {
    overrides: HashMap<(String, Property), f64>,
    failures: HashMap<String, EngineError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockEngine {
    /// Create a new mock engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fixed value for one identifier and property.
    pub fn with_value(
        mut self,
        identifier: impl Into<String>,
        property: Property,
        value: f64,
    ) -> Self {
        self.overrides.insert((identifier.into(), property), value);
        self
    }

    /// Fail every prediction for `identifier` with `error`.
    pub fn with_failure(mut self, identifier: impl Into<String>, error: EngineError) -> Self {
        self.failures.insert(identifier.into(), error);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// The value this engine predicts for a well-formed identifier.
    pub fn expected_value(identifier: &str, property: Property, parameters: ModeParameters) -> f64 {
        let count = |pattern: &str| identifier.matches(pattern).count() as f64;
        let chlorine = count("Cl");
        let carbon =
            identifier.chars().filter(|c| *c == 'C' || *c == 'c').count() as f64 - chlorine;
        let fluorine = count("F");
        let oxygen = count("O") + count("o");
        let nitrogen = count("N") + count("n");

        let value = match property {
            Property::LogP => {
                0.5 * carbon + 0.14 * fluorine + 0.7 * chlorine - 0.6 * oxygen - 0.9 * nitrogen
            }
            Property::PKa => 10.5 - 1.2 * fluorine - 0.4 * oxygen + 0.3 * nitrogen,
        };

        // The alternate model is biased slightly differently
        match parameters.model {
            ModelVariant::Primary => value,
            ModelVariant::Alternate => value + 0.05,
        }
    }
}

fn is_balanced(identifier: &str) -> bool {
    let mut depth: i64 = 0;
    let mut in_bracket = false;
    for ch in identifier.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            '[' if !in_bracket => in_bracket = true,
            ']' if in_bracket => in_bracket = false,
            '[' | ']' => return false,
            _ => {}
        }
    }
    depth == 0 && !in_bracket
}

impl InferenceEngine for MockEngine {
    fn predict(&self, request: &PredictionRequest<'_>) -> Result<f64, EngineError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                identifier: request.identifier.to_string(),
                property: request.property,
                parameters: request.parameters,
            });
        }

        if let Some(error) = self.failures.get(request.identifier) {
            return Err(error.clone());
        }

        if let Some(value) = self
            .overrides
            .get(&(request.identifier.to_string(), request.property))
        {
            return Ok(*value);
        }

        if request.identifier.trim().is_empty() || !is_balanced(request.identifier) {
            return Err(EngineError::MalformedIdentifier(request.identifier.to_string()));
        }

        Ok(Self::expected_value(
            request.identifier,
            request.property,
            request.parameters,
        ))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ExecutionMode;

    fn request(identifier: &str) -> PredictionRequest<'_> {
        PredictionRequest::new(
            identifier,
            Property::LogP,
            ExecutionMode::Fast.parameters(Property::LogP).unwrap(),
        )
    }

    #[test]
    fn test_deterministic_values() {
        let engine = MockEngine::new();
        let a = engine.predict(&request("FC(F)(F)C(=O)O")).unwrap();
        let b = engine.predict(&request("FC(F)(F)C(=O)O")).unwrap();
        assert_eq!(a, b);
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn test_rejects_unbalanced() {
        let engine = MockEngine::new();
        assert!(matches!(
            engine.predict(&request("C(C")),
            Err(EngineError::MalformedIdentifier(_))
        ));
        assert!(engine.predict(&request("[NH4+]")).is_ok());
        assert!(engine.predict(&request("C]")).is_err());
    }

    #[test]
    fn test_overrides_and_failures() {
        let engine = MockEngine::new()
            .with_value("CCO", Property::LogP, -0.31)
            .with_failure("CCN", EngineError::Internal("model not loaded".to_string()));

        assert_eq!(engine.predict(&request("CCO")).unwrap(), -0.31);
        assert!(matches!(
            engine.predict(&request("CCN")),
            Err(EngineError::Internal(_))
        ));

        let calls = engine.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].identifier, "CCO");
        assert_eq!(calls[1].property, Property::LogP);
    }
}
