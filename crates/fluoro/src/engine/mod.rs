//! Inference engines that turn a SMILES identifier into a predicted value.
//!
//! Feature generation, conformer enumeration and the trained models all live
//! behind [`InferenceEngine`]. Fluoro ships three implementations:
//!
//! - [`CommandEngine`] - runs an external predictor program per molecule
//!   (configured via `FLUORO_ENGINE_CMD`)
//! - [`HttpEngine`] - posts to a prediction service (`FLUORO_ENGINE_URL`)
//! - [`MockEngine`] - deterministic values, for tests and dry runs
//!
//! # Example
//!
//! ```
//! use fluoro::{ExecutionMode, InferenceEngine, MockEngine, PredictionRequest, Property};
//!
//! let engine = MockEngine::new();
//! let params = ExecutionMode::Fast.parameters(Property::LogP).unwrap();
//! let value = engine
//!     .predict(&PredictionRequest::new("CCO", Property::LogP, params))
//!     .unwrap();
//! assert!(value.is_finite());
//! ```

mod command;
mod http;
mod mock;
mod provider;

pub use command::{CommandEngine, CommandEngineConfig, ENGINE_CMD_ENV, parse_prediction};
pub use http::{ENGINE_URL_ENV, HttpEngine, HttpEngineConfig};
pub use mock::{MockEngine, RecordedCall};
pub use provider::{EngineError, InferenceEngine, PredictionRequest};
