//! Main Predictor struct and public API.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ExecutionConfig;
use crate::engine::{InferenceEngine, MockEngine};
use crate::error::Result;
use crate::input::{DataTable, Parser, ParserConfig, SourceMetadata};
use crate::orchestrator::{CancellationToken, PredictionRun, RunStats};
use crate::output::{self, PredictionTable};
use crate::progress::{NoProgress, ProgressSink};
use crate::resolve::resolve_identifier_column;
use crate::schema::TableSchema;

/// Result of a prediction run.
#[derive(Debug, Clone)]
pub struct PredictionResult {
    /// Input table with the property columns appended.
    pub table: PredictionTable,
    /// What happened during the run.
    pub summary: RunSummary,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Input rows.
    pub rows: usize,
    /// Rows with predicted values.
    pub predicted_rows: usize,
    /// Rows skipped for a missing identifier.
    pub skipped_rows: usize,
    /// Inference engine invocations.
    pub engine_calls: usize,
    /// Identifier column used.
    pub identifier_column: String,
    /// Engine that produced the values.
    pub engine: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Source file, when the table was read from disk.
    pub source: Option<SourceMetadata>,
}

impl RunSummary {
    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Batch pKa/logP predictor.
///
/// Holds an immutable [`ExecutionConfig`] and a shared inference engine.
/// Without an engine configured, predictions come from [`MockEngine`].
pub struct Predictor {
    config: ExecutionConfig,
    parser: Parser,
    engine: Arc<dyn InferenceEngine>,
}

impl Predictor {
    /// Create a predictor with default settings.
    pub fn new() -> Self {
        Self::with_config(ExecutionConfig::default())
    }

    /// Create a predictor with custom settings.
    pub fn with_config(config: ExecutionConfig) -> Self {
        Self {
            config,
            parser: Parser::new(),
            engine: Arc::new(MockEngine::new()),
        }
    }

    /// Use `engine` for predictions.
    pub fn with_engine(mut self, engine: impl InferenceEngine + 'static) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Share an engine with other predictors.
    pub fn with_shared_engine(mut self, engine: Arc<dyn InferenceEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Parser settings used by [`Predictor::predict_file`].
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser = Parser::with_config(config);
        self
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Output schema for an input schema, without running predictions.
    ///
    /// Fails on the same configuration problems a run would fail on before
    /// its first engine call.
    pub fn output_schema(&self, input: &TableSchema) -> Result<TableSchema> {
        self.config.validate()?;
        resolve_identifier_column(&self.config, input)?;
        output::output_schema(input, &self.config)
    }

    /// Start a lazy run over `table`.
    ///
    /// Use this to consume progress and row outcomes as they are produced;
    /// [`Predictor::predict_table`] drives a run to completion.
    pub fn run<'a>(&'a self, table: &'a DataTable) -> Result<PredictionRun<'a>> {
        let schema = table.schema();
        let column = resolve_identifier_column(&self.config, &schema)?;
        output::output_schema(&schema, &self.config)?;
        PredictionRun::new(table, column, &self.config, self.engine.as_ref())
    }

    /// Predict every requested property for every row of `table`.
    pub fn predict_table(
        &self,
        table: &DataTable,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<PredictionResult> {
        let started_at = Utc::now();

        let run = self.run(table)?.with_cancellation(cancel.clone());
        let (rows, stats) = run.collect_outcomes(progress)?;
        let output = output::assemble(table, rows, &self.config)?;

        let summary = self.summarize(table, stats, started_at);
        info!(
            "Predicted {} of {} rows ({} skipped, {} engine calls)",
            summary.predicted_rows, summary.rows, summary.skipped_rows, summary.engine_calls
        );

        Ok(PredictionResult {
            table: output,
            summary,
        })
    }

    /// Read a CSV/TSV file and predict on it.
    pub fn predict_file(
        &self,
        path: impl AsRef<Path>,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<PredictionResult> {
        let (table, source) = self.parser.parse_file(path)?;
        info!(
            "Read {} ({} rows, {} columns, sha256 {})",
            source.file, source.row_count, source.column_count, source.hash
        );

        let mut result = self.predict_table(&table, progress, cancel)?;
        result.summary.source = Some(source);
        Ok(result)
    }

    /// Predict on `table` without progress reporting or cancellation.
    pub fn predict(&self, table: &DataTable) -> Result<PredictionTable> {
        self.predict_table(table, &NoProgress, &CancellationToken::new())
            .map(|result| result.table)
    }

    fn summarize(
        &self,
        table: &DataTable,
        stats: RunStats,
        started_at: DateTime<Utc>,
    ) -> RunSummary {
        let identifier_column = self
            .config
            .configured_column()
            .unwrap_or_default()
            .to_string();

        RunSummary {
            rows: table.row_count(),
            predicted_rows: stats.predicted_rows,
            skipped_rows: stats.skipped_rows,
            engine_calls: stats.engine_calls,
            identifier_column,
            engine: self.engine.name().to_string(),
            started_at,
            finished_at: Utc::now(),
            source: None,
        }
    }
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FluoroError;
    use crate::progress::RecordingSink;
    use crate::property::{Property, PropertySet};
    use crate::schema::ColumnType;

    fn table() -> DataTable {
        DataTable::from_rows(
            &["name", "SMILES"],
            &[
                vec![Some("tfa"), Some("FC(F)(F)C(=O)O")],
                vec![Some("ethanol"), Some("CCO")],
            ],
        )
    }

    #[test]
    fn test_predict_table_summary() {
        let engine = Arc::new(MockEngine::new());
        let config = ExecutionConfig::new().with_identifier_column("SMILES");
        let predictor = Predictor::with_config(config).with_shared_engine(engine.clone());
        let sink = RecordingSink::new();

        let result = predictor
            .predict_table(&table(), &sink, &CancellationToken::new())
            .unwrap();

        assert_eq!(result.table.column_names(), vec!["name", "SMILES", "logP", "pKa"]);
        assert_eq!(result.summary.rows, 2);
        assert_eq!(result.summary.predicted_rows, 2);
        assert_eq!(result.summary.engine_calls, 4);
        assert_eq!(result.summary.engine, "mock");
        assert_eq!(result.summary.identifier_column, "SMILES");
        assert!(result.summary.elapsed() >= chrono::Duration::zero());
        assert_eq!(engine.call_count(), 4);
        assert_eq!(sink.last().map(|(f, _)| f), Some(1.0));
    }

    #[test]
    fn test_output_schema_without_engine_calls() {
        let engine = Arc::new(MockEngine::new());
        let config = ExecutionConfig::logp_node().with_identifier_column("SMILES");
        let predictor = Predictor::with_config(config).with_shared_engine(engine.clone());

        let schema = predictor.output_schema(&table().schema()).unwrap();
        assert_eq!(schema.column_names(), vec!["name", "SMILES", "logP"]);
        assert_eq!(schema.get_column("logP").unwrap().column_type, ColumnType::Float);
        assert_eq!(engine.call_count(), 0);
    }

    #[test]
    fn test_output_schema_reports_configuration_errors() {
        let predictor = Predictor::new();
        assert!(matches!(
            predictor.output_schema(&table().schema()),
            Err(FluoroError::Configuration(_))
        ));

        let predictor = Predictor::with_config(
            ExecutionConfig::pka_node().with_mode(crate::mode::ExecutionMode::Experimental),
        );
        assert!(predictor.output_schema(&table().schema()).is_err());
    }

    #[test]
    fn test_cancelled_before_start() {
        let predictor = Predictor::with_config(
            ExecutionConfig::new()
                .with_identifier_column("SMILES")
                .with_properties(PropertySet::only(Property::PKa)),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = predictor
            .predict_table(&table(), &NoProgress, &cancel)
            .unwrap_err();
        assert!(matches!(err, FluoroError::Cancelled { row: 0 }));
    }
}
