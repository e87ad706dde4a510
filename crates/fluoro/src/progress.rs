//! Progress accounting and host-facing progress sinks.
//!
//! The orchestrator never talks to a sink directly. It produces
//! [`ProgressEvent`]s through a [`ProgressReporter`], and the caller forwards
//! them to whatever [`ProgressSink`] the host supplied.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Receives progress updates from a running batch.
pub trait ProgressSink {
    /// `fraction` is in `[0, 1]` and never decreases within one run.
    fn set_progress(&self, fraction: f64, message: &str);
}

impl<T: ProgressSink + ?Sized> ProgressSink for &T {
    fn set_progress(&self, fraction: f64, message: &str) {
        (**self).set_progress(fraction, message)
    }
}

/// An absent sink swallows updates.
impl<T: ProgressSink> ProgressSink for Option<T> {
    fn set_progress(&self, fraction: f64, message: &str) {
        if let Some(sink) = self {
            sink.set_progress(fraction, message);
        }
    }
}

/// Sink that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_progress(&self, _fraction: f64, _message: &str) {}
}

/// Sink that records every update, for tests and polling hosts.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(f64, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded `(fraction, message)` pairs.
    pub fn events(&self) -> Vec<(f64, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Recorded fractions only.
    pub fn fractions(&self) -> Vec<f64> {
        self.events().into_iter().map(|(f, _)| f).collect()
    }

    /// The most recent update, if any.
    pub fn last(&self) -> Option<(f64, String)> {
        self.events().pop()
    }
}

impl ProgressSink for RecordingSink {
    fn set_progress(&self, fraction: f64, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((fraction, message.to_string()));
        }
    }
}

/// One progress update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Completed steps, `1..=total`.
    pub step: usize,
    /// Total steps in the run.
    pub total: usize,
    /// `step / total`, clamped to `[0, 1]` and non-decreasing.
    pub fraction: f64,
    pub message: String,
}

impl ProgressEvent {
    /// Hand this event to a host sink.
    pub fn forward(&self, sink: &dyn ProgressSink) {
        sink.set_progress(self.fraction, &self.message);
    }
}

/// Converts step indices into monotonically increasing fractions.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    total: usize,
    last_fraction: f64,
}

impl ProgressReporter {
    /// Reporter for a run of `total_steps` steps.
    pub fn new(total_steps: usize) -> Self {
        Self {
            total: total_steps,
            last_fraction: 0.0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Build the event for `step` completed steps.
    pub fn report(&mut self, step: usize, message: impl Into<String>) -> ProgressEvent {
        let fraction = fraction(step, self.total).max(self.last_fraction);
        self.last_fraction = fraction;

        ProgressEvent {
            step,
            total: self.total,
            fraction,
            message: message.into(),
        }
    }
}

/// `step / total` clamped to `[0, 1]`. An empty run is complete.
pub fn fraction(step: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (step as f64 / total as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_clamps() {
        assert_eq!(fraction(0, 4), 0.0);
        assert_eq!(fraction(2, 4), 0.5);
        assert_eq!(fraction(9, 4), 1.0);
        assert_eq!(fraction(0, 0), 1.0);
    }

    #[test]
    fn test_reporter_never_goes_backwards() {
        let mut reporter = ProgressReporter::new(4);
        assert_eq!(reporter.report(3, "a").fraction, 0.75);
        assert_eq!(reporter.report(1, "b").fraction, 0.75);
        assert_eq!(reporter.report(4, "c").fraction, 1.0);
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        let mut reporter = ProgressReporter::new(2);
        reporter.report(1, "Features generating for: CCO").forward(&sink);
        reporter.report(2, "logP prediction for: CCO").forward(&sink);

        assert_eq!(sink.fractions(), vec![0.5, 1.0]);
        assert_eq!(sink.last().unwrap().1, "logP prediction for: CCO");
    }

    #[test]
    fn test_absent_sink_is_noop() {
        let sink: Option<RecordingSink> = None;
        sink.set_progress(0.5, "ignored");
        NoProgress.set_progress(1.0, "ignored");
    }
}
