//! Parse diagnostics.
//!
//! Malformed responses never fail a search: each problem becomes a
//! [`ParseError`] handed to a [`ParseErrorSink`], and the search returns
//! whatever could be parsed.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::metrics::PARSE_ERRORS;

/// Longest raw input excerpt written to logs.
const LOG_EXCERPT_CHARS: usize = 500;

/// Which part of a response a parse error covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseScope {
    /// The whole body was unusable; no releases were produced.
    Batch,
    /// One row at this position was skipped.
    Row { index: usize },
}

impl ParseScope {
    pub fn label(&self) -> &'static str {
        match self {
            ParseScope::Batch => "batch",
            ParseScope::Row { .. } => "row",
        }
    }
}

impl fmt::Display for ParseScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseScope::Batch => write!(f, "response"),
            ParseScope::Row { index } => write!(f, "row {}", index),
        }
    }
}

/// A recoverable parse failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{indexer}: malformed {scope}: {message}")]
pub struct ParseError {
    pub indexer: String,
    pub scope: ParseScope,
    pub message: String,
    /// The input that failed (whole body or the row's JSON).
    pub raw: String,
}

impl ParseError {
    pub fn batch(indexer: &str, message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            indexer: indexer.to_string(),
            scope: ParseScope::Batch,
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn row(
        indexer: &str,
        index: usize,
        message: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            indexer: indexer.to_string(),
            scope: ParseScope::Row { index },
            message: message.into(),
            raw: raw.into(),
        }
    }
}

/// Receives parse failures. Reporting must not fail or block.
pub trait ParseErrorSink: Send + Sync {
    fn report(&self, raw_input: &str, error: &ParseError);
}

/// Sink that logs a warning and counts the error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingParseErrorSink;

impl ParseErrorSink for TracingParseErrorSink {
    fn report(&self, raw_input: &str, error: &ParseError) {
        PARSE_ERRORS
            .with_label_values(&[&error.indexer, error.scope.label()])
            .inc();

        let excerpt: String = raw_input.chars().take(LOG_EXCERPT_CHARS).collect();
        warn!(
            indexer = %error.indexer,
            scope = %error.scope,
            error = %error.message,
            raw = %excerpt,
            "Failed to parse indexer response"
        );
    }
}
