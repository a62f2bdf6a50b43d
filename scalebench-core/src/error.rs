//! Error Types
//!
//! `Fault` covers everything that is isolated to one file or one record and
//! therefore travels alongside the results. `SelectError` and `SpecError` are
//! invocation-level failures returned through `Result`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A file-level or record-level problem that does not stop the batch
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fault {
    /// The name looks like a study file but its numeric tokens are unusable
    #[error("malformed filename {}: {reason}", .path.display())]
    MalformedFilename {
        /// Offending file
        path: PathBuf,
        /// What was wrong with the tokens
        reason: String,
    },

    /// Another file already provides this (cores, run) pair.
    ///
    /// Of the colliding names, one without zero-padded tokens is kept, then the
    /// lexicographically smallest.
    #[error(
        "duplicate run cores={core_count} run={run_index}: {} ignored, {} kept",
        .path.display(),
        .kept.display()
    )]
    DuplicateRun {
        /// Rejected file
        path: PathBuf,
        /// File that owns the key
        kept: PathBuf,
        /// Core count of both files
        core_count: u32,
        /// Run index of both files
        run_index: u32,
    },

    /// The file could not be read
    #[error("unreadable file {} (cores={core_count} run={run_index}): {reason}", .path.display())]
    UnreadableFile {
        /// Offending file
        path: PathBuf,
        /// Core count from the file name
        core_count: u32,
        /// Run index from the file name
        run_index: u32,
        /// I/O error message
        reason: String,
    },

    /// A pattern matched but the captured text is not a number
    #[error(
        "metric '{metric}' in {} (cores={core_count} run={run_index}): {failure}",
        .path.display()
    )]
    MetricParse {
        /// Source file
        path: PathBuf,
        /// Core count of the file
        core_count: u32,
        /// Run index of the file
        run_index: u32,
        /// Metric whose capture failed
        metric: String,
        /// Parse failure details
        failure: ParseFailure,
    },
}

impl Fault {
    /// Short machine-readable name of the fault kind
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::MalformedFilename { .. } => "malformed_filename",
            Fault::DuplicateRun { .. } => "duplicate_run",
            Fault::UnreadableFile { .. } => "unreadable_file",
            Fault::MetricParse { .. } => "metric_parse",
        }
    }

    /// File the fault refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            Fault::MalformedFilename { path, .. }
            | Fault::DuplicateRun { path, .. }
            | Fault::UnreadableFile { path, .. }
            | Fault::MetricParse { path, .. } => path,
        }
    }
}

/// Captured text that did not parse as a finite `f64`
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("captured text '{captured}' is not a finite number")]
pub struct ParseFailure {
    /// The text of capture group 1
    pub captured: String,
}

/// Failure to produce the input file list at all
#[derive(Debug, Error)]
pub enum SelectError {
    /// The directory could not be listed
    #[error("cannot list directory {}: {source}", .path.display())]
    Io {
        /// Directory that was listed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The naming convention does not yield a valid regex
    #[error("invalid naming convention: {0}")]
    Pattern(#[from] regex::Error),
}

/// Invalid metric configuration
#[derive(Debug, Clone, Error)]
pub enum SpecError {
    /// Metric name is blank
    #[error("metric name must not be empty")]
    EmptyName,

    /// Pattern is not a valid regex
    #[error("metric '{name}': invalid pattern: {source}")]
    InvalidPattern {
        /// Metric name
        name: String,
        /// Regex compile error
        source: regex::Error,
    },

    /// Pattern has nothing to capture the value with
    #[error("metric '{name}': pattern '{pattern}' has no capture group")]
    MissingCaptureGroup {
        /// Metric name
        name: String,
        /// Pattern text
        pattern: String,
    },

    /// Two specs share a name
    #[error("duplicate metric name '{0}'")]
    DuplicateMetricName(String),
}
