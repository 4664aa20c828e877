//! Error handling module for Barline.
//!
//! This module provides a unified error type using the `thiserror` crate,
//! consolidating all error types from the various operations into a single enum.

use std::io;
use thiserror::Error;

/// Unified error type for the Barline application.
///
/// Render overflow never shows up here: the render buffer truncates locally
/// and [`crate::buffer::Overflow`] stays a separate type.
#[derive(Error, Debug)]
pub enum BarlineError {
    /// I/O operation errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file syntax errors
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The status stream could not be written (e.g. the bar went away)
    #[error("Output error: {0}")]
    Output(io::Error),

    /// Generic operation errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Barline operations
pub type Result<T> = std::result::Result<T, BarlineError>;

// Helper implementations for common conversions
impl BarlineError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        BarlineError::Config(msg.into())
    }

    /// Wrap a failed write to the status stream
    pub fn output(err: io::Error) -> Self {
        BarlineError::Output(err)
    }

    /// Create a generic other error
    pub fn other(msg: impl Into<String>) -> Self {
        BarlineError::Other(msg.into())
    }

    /// Whether the downstream reader closed the pipe.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, BarlineError::Output(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

// Allow conversion from string for convenience
impl From<String> for BarlineError {
    fn from(s: String) -> Self {
        BarlineError::Other(s)
    }
}

impl From<&str> for BarlineError {
    fn from(s: &str) -> Self {
        BarlineError::Other(s.to_string())
    }
}
