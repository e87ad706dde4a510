//! Row-by-row prediction driver.
//!
//! [`PredictionRun`] walks the input table in order and yields a finite,
//! non-restartable stream of [`RunEvent`]s: progress updates interleaved with
//! one [`RowOutcome`] per row. Engine calls happen lazily as the stream is
//! consumed, so a host that stops pulling stops predicting.
//!
//! The first error ends the stream. Nothing is retried.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{ExecutionConfig, NullPolicy, ProgressAccounting};
use crate::engine::{InferenceEngine, PredictionRequest};
use crate::error::{FluoroError, Result};
use crate::input::DataTable;
use crate::mode::ModeParameters;
use crate::progress::{ProgressEvent, ProgressReporter, ProgressSink};
use crate::property::Property;
use crate::resolve::ResolvedColumn;

/// Result of one (row, property) prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Value(f64),
    Null,
}

impl Outcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            Outcome::Value(v) => Some(*v),
            Outcome::Null => None,
        }
    }
}

/// Outcomes of every requested property for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    /// Zero-based row index in the input table.
    pub row: usize,
    /// Requested properties in canonical order.
    pub outcomes: Vec<(Property, Outcome)>,
}

impl RowOutcome {
    /// Outcome for `property`, if it was requested.
    pub fn get(&self, property: Property) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, o)| *o)
    }

    /// True when the row was skipped for a missing identifier.
    pub fn is_skipped(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| *o == Outcome::Null)
    }
}

/// Item of a [`PredictionRun`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Progress(ProgressEvent),
    Row(RowOutcome),
}

/// Cooperative cancellation flag shared between a host and a run.
///
/// Checked before each row; an engine call in flight is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Counters collected while a run is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Rows with at least one predicted value.
    pub predicted_rows: usize,
    /// Rows skipped for a missing identifier.
    pub skipped_rows: usize,
    /// Inference engine invocations.
    pub engine_calls: usize,
}

#[derive(Debug, Clone, Copy)]
enum Cursor {
    RowStart(usize),
    Features { row: usize, index: usize },
    Predict { row: usize, index: usize },
    Done,
}

/// A single pass over a table, producing outcomes lazily.
pub struct PredictionRun<'a> {
    table: &'a DataTable,
    column: ResolvedColumn,
    properties: Vec<(Property, ModeParameters)>,
    null_policy: NullPolicy,
    accounting: ProgressAccounting,
    engine: &'a dyn InferenceEngine,
    cancel: Option<CancellationToken>,
    reporter: ProgressReporter,
    cursor: Cursor,
    step: usize,
    current: Vec<(Property, Outcome)>,
    pending: VecDeque<Result<RunEvent>>,
    stats: RunStats,
}

impl<'a> PredictionRun<'a> {
    /// Prepare a run over `table`.
    ///
    /// Mode parameters are resolved for every requested property up front.
    /// Under [`NullPolicy::FailBatch`] the identifier column is scanned first,
    /// so a batch with a missing identifier fails before any engine call.
    pub fn new(
        table: &'a DataTable,
        column: ResolvedColumn,
        config: &ExecutionConfig,
        engine: &'a dyn InferenceEngine,
    ) -> Result<Self> {
        config.validate()?;

        let properties = config
            .properties
            .iter()
            .map(|p| config.mode.parameters(p).map(|params| (p, params)))
            .collect::<Result<Vec<_>>>()?;

        if config.null_policy == NullPolicy::FailBatch {
            if let Some(row) = table.column_values(column.position).position(|v| v.is_none()) {
                error!("SMILES value cannot be empty (row {}, column '{}')", row, column.name);
                return Err(FluoroError::NullIdentifier {
                    row,
                    column: column.name.clone(),
                });
            }
        }

        let total = table.row_count() * config.accounting.steps_per_row(properties.len());

        info!(
            "Execution mode: {} ({} rows, {} properties, engine: {})",
            config.mode,
            table.row_count(),
            properties.len(),
            engine.name()
        );

        Ok(Self {
            table,
            column,
            properties,
            null_policy: config.null_policy,
            accounting: config.accounting,
            engine,
            cancel: None,
            reporter: ProgressReporter::new(total),
            cursor: Cursor::RowStart(0),
            step: 0,
            current: Vec::new(),
            pending: VecDeque::new(),
            stats: RunStats::default(),
        })
    }

    /// Check `token` before each row.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Total progress steps of this run.
    pub fn total_steps(&self) -> usize {
        self.reporter.total()
    }

    /// Counters so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Consume the run, forwarding progress to `sink` and collecting outcomes.
    pub fn collect_outcomes(
        mut self,
        sink: &dyn ProgressSink,
    ) -> Result<(Vec<RowOutcome>, RunStats)> {
        let mut rows = Vec::with_capacity(self.table.row_count());
        for event in self.by_ref() {
            match event? {
                RunEvent::Progress(progress) => progress.forward(sink),
                RunEvent::Row(row) => rows.push(row),
            }
        }
        Ok((rows, self.stats))
    }

    fn progress(&mut self, steps: usize, message: String) -> RunEvent {
        self.step += steps;
        RunEvent::Progress(self.reporter.report(self.step, message))
    }

    fn fail(&mut self, err: FluoroError) -> Option<Result<RunEvent>> {
        self.cursor = Cursor::Done;
        self.pending.push_back(Err(err));
        self.pending.pop_front()
    }

    fn identifier(&self, row: usize) -> Option<&'a str> {
        let table: &'a DataTable = self.table;
        table.get(row, self.column.position)
    }

    fn start_row(&mut self, row: usize) -> Option<Result<RunEvent>> {
        if row >= self.table.row_count() {
            self.cursor = Cursor::Done;
            return None;
        }

        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            info!("Run cancelled before row {}", row);
            return self.fail(FluoroError::Cancelled { row });
        }

        if self.identifier(row).is_some() {
            self.current.clear();
            self.cursor = Cursor::Features { row, index: 0 };
            return None;
        }

        match self.null_policy {
            NullPolicy::SkipRow => {
                warn!("Empty cell at row {}, predictions set to null", row);
                let steps = self.accounting.steps_per_row(self.properties.len());
                let progress =
                    self.progress(steps, format!("Skipped empty identifier at row {}", row));
                let outcomes = self
                    .properties
                    .iter()
                    .map(|(p, _)| (*p, Outcome::Null))
                    .collect();
                self.stats.skipped_rows += 1;
                self.pending.push_back(Ok(RunEvent::Row(RowOutcome { row, outcomes })));
                self.cursor = Cursor::RowStart(row + 1);
                Some(Ok(progress))
            }
            NullPolicy::FailBatch => {
                error!("SMILES value cannot be empty (row {}, column '{}')", row, self.column.name);
                self.fail(FluoroError::NullIdentifier {
                    row,
                    column: self.column.name.clone(),
                })
            }
        }
    }

    fn features(&mut self, row: usize, index: usize) -> Option<Result<RunEvent>> {
        self.cursor = Cursor::Predict { row, index };

        let emit = match self.accounting {
            ProgressAccounting::PerProperty => true,
            ProgressAccounting::PerRow => index == 0,
        };
        if !emit {
            return None;
        }

        let identifier = self.identifier(row).unwrap_or_default();
        Some(Ok(self.progress(1, format!("Features generating for: {}", identifier))))
    }

    fn predict(&mut self, row: usize, index: usize) -> Option<Result<RunEvent>> {
        let identifier = self.identifier(row).unwrap_or_default();
        let (property, parameters) = self.properties[index];

        debug!(
            "Predicting {} for '{}' (row {}, model {}, fast {})",
            property,
            identifier,
            row,
            parameters.model.engine_name(),
            parameters.conformers.is_fast()
        );

        self.stats.engine_calls += 1;
        let result = self
            .engine
            .predict(&PredictionRequest::new(identifier, property, parameters));

        let last = index + 1 == self.properties.len();
        let emit = match self.accounting {
            ProgressAccounting::PerProperty => true,
            ProgressAccounting::PerRow => last,
        };
        let progress = emit.then(|| {
            let label = match self.accounting {
                ProgressAccounting::PerProperty => property.to_string(),
                ProgressAccounting::PerRow => self
                    .properties
                    .iter()
                    .map(|(p, _)| p.column_name())
                    .collect::<Vec<_>>()
                    .join("/"),
            };
            self.progress(1, format!("{} prediction for: {}", label, identifier))
        });

        let value = match result {
            Ok(value) => value,
            Err(source) => {
                error!("Error predicting {} for SMILES '{}': {}", property, identifier, source);
                if let Some(progress) = progress {
                    self.pending.push_back(Ok(progress));
                }
                return self.fail(FluoroError::Inference {
                    row,
                    identifier: identifier.to_string(),
                    property,
                    source,
                });
            }
        };

        self.current.push((property, Outcome::Value(value)));

        if last {
            self.stats.predicted_rows += 1;
            let outcomes = std::mem::take(&mut self.current);
            self.pending.push_back(Ok(RunEvent::Row(RowOutcome { row, outcomes })));
            self.cursor = Cursor::RowStart(row + 1);
        } else {
            self.cursor = Cursor::Features { row, index: index + 1 };
        }

        match progress {
            Some(progress) => Some(Ok(progress)),
            None => self.pending.pop_front(),
        }
    }
}

impl Iterator for PredictionRun<'_> {
    type Item = Result<RunEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            let produced = match self.cursor {
                Cursor::Done => return None,
                Cursor::RowStart(row) => self.start_row(row),
                Cursor::Features { row, index } => self.features(row, index),
                Cursor::Predict { row, index } => self.predict(row, index),
            };

            if produced.is_some() {
                return produced;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, MockEngine};
    use crate::mode::{ConformerSearch, ExecutionMode, ModelVariant};
    use crate::progress::RecordingSink;
    use crate::property::PropertySet;

    fn table(values: &[Option<&str>]) -> DataTable {
        let rows: Vec<Vec<Option<&str>>> = values.iter().map(|v| vec![*v]).collect();
        DataTable::from_rows(&["SMILES"], &rows)
    }

    fn column() -> ResolvedColumn {
        ResolvedColumn {
            name: "SMILES".to_string(),
            position: 0,
        }
    }

    #[test]
    fn test_events_are_interleaved_in_row_order() {
        let table = table(&[Some("CCO"), Some("CCN")]);
        let engine = MockEngine::new();
        let config = ExecutionConfig::new().with_properties(PropertySet::only(Property::LogP));

        let events: Vec<RunEvent> = PredictionRun::new(&table, column(), &config, &engine)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                RunEvent::Progress(_) => "p",
                RunEvent::Row(_) => "r",
            })
            .collect();
        assert_eq!(kinds, vec!["p", "p", "r", "p", "p", "r"]);
    }

    #[test]
    fn test_stream_is_lazy() {
        let table = table(&[Some("CCO"), Some("CCN")]);
        let engine = MockEngine::new();
        let config = ExecutionConfig::new();

        let mut run = PredictionRun::new(&table, column(), &config, &engine).unwrap();
        assert_eq!(engine.call_count(), 0);

        // features event, then the first engine call
        run.next();
        assert_eq!(engine.call_count(), 0);
        run.next();
        assert_eq!(engine.call_count(), 1);
    }

    #[test]
    fn test_skip_row_yields_nulls() {
        let table = table(&[Some("FC(F)(F)C(=O)O"), None, Some("CCO")]);
        let engine = MockEngine::new();
        let config = ExecutionConfig::new().with_null_policy(NullPolicy::SkipRow);

        let (rows, stats) = PredictionRun::new(&table, column(), &config, &engine)
            .unwrap()
            .collect_outcomes(&RecordingSink::new())
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows[1].is_skipped());
        assert_eq!(rows[1].get(Property::PKa), Some(Outcome::Null));
        assert!(rows[0].get(Property::LogP).unwrap().value().is_some());
        assert_eq!(stats.skipped_rows, 1);
        assert_eq!(stats.predicted_rows, 2);
        assert_eq!(stats.engine_calls, 4);
    }

    #[test]
    fn test_fail_batch_prescan_makes_no_calls() {
        let table = table(&[Some("CCO"), None]);
        let engine = MockEngine::new();
        let config = ExecutionConfig::new().with_null_policy(NullPolicy::FailBatch);

        let err = PredictionRun::new(&table, column(), &config, &engine)
            .err()
            .unwrap();
        assert!(matches!(err, FluoroError::NullIdentifier { row: 1, .. }));
        assert_eq!(engine.call_count(), 0);
    }

    #[test]
    fn test_engine_rejection_aborts_and_fuses() {
        let table = table(&[Some("CCO"), Some("C1CC(("), Some("CCN")]);
        let engine = MockEngine::new();
        let config = ExecutionConfig::new()
            .with_properties(PropertySet::only(Property::LogP))
            .with_null_policy(NullPolicy::SkipRow);

        let mut run = PredictionRun::new(&table, column(), &config, &engine).unwrap();
        let mut error = None;
        for event in run.by_ref() {
            if let Err(e) = event {
                error = Some(e);
            }
        }

        match error {
            Some(FluoroError::Inference { row, identifier, property, source }) => {
                assert_eq!(row, 1);
                assert_eq!(identifier, "C1CC((");
                assert_eq!(property, Property::LogP);
                assert!(matches!(source, EngineError::MalformedIdentifier(_)));
            }
            other => panic!("expected inference failure, got {:?}", other),
        }
        assert!(run.next().is_none());
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn test_properties_called_in_canonical_order_with_mode_parameters() {
        let table = table(&[Some("CCO")]);
        let engine = MockEngine::new();
        let config = ExecutionConfig::new().with_mode(ExecutionMode::Fast);

        PredictionRun::new(&table, column(), &config, &engine)
            .unwrap()
            .collect_outcomes(&RecordingSink::new())
            .unwrap();

        let calls = engine.calls();
        assert_eq!(calls[0].property, Property::LogP);
        assert_eq!(calls[1].property, Property::PKa);
        assert!(calls.iter().all(|c| c.parameters.conformers == ConformerSearch::Reduced
            && c.parameters.model == ModelVariant::Primary));
    }

    #[test]
    fn test_per_row_accounting() {
        let table = table(&[Some("CCO"), Some("CCN")]);
        let engine = MockEngine::new();
        let config = ExecutionConfig::new().with_accounting(ProgressAccounting::PerRow);
        let sink = RecordingSink::new();

        let run = PredictionRun::new(&table, column(), &config, &engine).unwrap();
        assert_eq!(run.total_steps(), 4);
        run.collect_outcomes(&sink).unwrap();

        assert_eq!(sink.fractions(), vec![0.25, 0.5, 0.75, 1.0]);
        assert_eq!(sink.events()[1].1, "logP/pKa prediction for: CCO");
    }

    #[test]
    fn test_cancellation_between_rows() {
        let table = table(&[Some("CCO"), Some("CCN")]);
        let engine = MockEngine::new();
        let config = ExecutionConfig::new().with_properties(PropertySet::only(Property::PKa));
        let token = CancellationToken::new();

        let mut run = PredictionRun::new(&table, column(), &config, &engine)
            .unwrap()
            .with_cancellation(token.clone());

        // drain the first row
        for _ in 0..3 {
            run.next().unwrap().unwrap();
        }
        token.cancel();

        assert!(matches!(run.next(), Some(Err(FluoroError::Cancelled { row: 1 }))));
        assert!(run.next().is_none());
        assert_eq!(engine.call_count(), 1);
    }

    #[test]
    fn test_empty_table() {
        let table = DataTable::new(vec!["SMILES".to_string()], Vec::new(), b'\t');
        let engine = MockEngine::new();
        let (rows, stats) = PredictionRun::new(&table, column(), &ExecutionConfig::new(), &engine)
            .unwrap()
            .collect_outcomes(&RecordingSink::new())
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(stats, RunStats::default());
    }
}
