//! Parse error sink that records reports for assertions.

use std::sync::{Arc, Mutex};

use crate::diagnostics::{ParseError, ParseErrorSink};

/// A recorded sink report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedParseError {
    pub raw_input: String,
    pub error: ParseError,
}

/// [`ParseErrorSink`] that keeps every report.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingParseErrorSink {
    reports: Arc<Mutex<Vec<RecordedParseError>>>,
}

impl RecordingParseErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<RecordedParseError> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.clear();
        }
    }
}

impl ParseErrorSink for RecordingParseErrorSink {
    fn report(&self, raw_input: &str, error: &ParseError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(RecordedParseError {
                raw_input: raw_input.to_string(),
                error: error.clone(),
            });
        }
    }
}
