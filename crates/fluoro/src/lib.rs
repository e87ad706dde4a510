//! Fluoro: batch pKa and logP prediction over molecule tables.
//!
//! Fluoro reads a table with a column of SMILES identifiers, asks an inference
//! engine for one or both properties row by row, and returns the table with a
//! `f64` column appended per property.
//!
//! # Core Principles
//!
//! - **Non-destructive**: input columns and row order are never changed
//! - **Fail early**: configuration problems surface before the first engine call
//! - **Observable**: progress is reported per phase and never goes backwards
//!
//! # Example
//!
//! ```
//! use fluoro::{DataTable, ExecutionConfig, MockEngine, Predictor, Property, PropertySet};
//!
//! let table = DataTable::from_rows(
//!     &["SMILES"],
//!     &[vec![Some("FC(F)(F)C(=O)O")], vec![None], vec![Some("CCO")]],
//! );
//!
//! let config = ExecutionConfig::new()
//!     .with_identifier_column("SMILES")
//!     .with_properties(PropertySet::only(Property::LogP));
//! let predictor = Predictor::with_config(config).with_engine(MockEngine::new());
//!
//! let output = predictor.predict(&table).unwrap();
//! let logp = output.property_values(Property::LogP).unwrap();
//! assert!(logp[0].is_some() && logp[1].is_none() && logp[2].is_some());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod mode;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod property;
pub mod resolve;
pub mod schema;

mod predictor;

pub use crate::predictor::{PredictionResult, Predictor, RunSummary};
pub use config::{ColumnCheck, ExecutionConfig, NullPolicy, ProgressAccounting, UnrequestedColumns};
pub use engine::{
    CommandEngine, CommandEngineConfig, EngineError, HttpEngine, HttpEngineConfig, InferenceEngine,
    MockEngine, PredictionRequest,
};
pub use error::{FluoroError, Result};
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata};
pub use mode::{ConformerSearch, ExecutionMode, ModeParameters, ModelVariant};
pub use orchestrator::{CancellationToken, Outcome, PredictionRun, RowOutcome, RunEvent, RunStats};
pub use output::{OutputFormat, PredictionTable};
pub use progress::{NoProgress, ProgressEvent, ProgressReporter, ProgressSink, RecordingSink};
pub use property::{Property, PropertySet};
pub use resolve::{ResolvedColumn, resolve_identifier_column};
pub use schema::{ColumnSchema, ColumnType, TableSchema};
