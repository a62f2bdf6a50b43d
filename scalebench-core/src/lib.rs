#![warn(missing_docs)]
//! Scalebench Core - Input Selection and Metric Extraction
//!
//! This crate turns a directory of solver logs into flat metric records:
//! - `NamingConvention` recognises `<prefix>_cores<N>[_run<R>].<ext>` files
//! - `select` lists a directory and orders the study files by (cores, run)
//! - `MetricSet` holds the named regex patterns to search for
//! - `extract` / `extract_file` pull at most one value per pattern out of a log
//!
//! Faults that only concern a single file or record are returned as [`Fault`]
//! values next to the successful results instead of aborting the batch.

mod error;
mod extract;
mod naming;
mod presets;
mod select;

pub use error::{Fault, ParseFailure, SelectError, SpecError};
pub use extract::{FileExtraction, MetricSet, MetricSpec, extract, extract_file};
pub use naming::{FilenamePattern, NamingConvention};
pub use presets::{SOLVER_TIMERS, solver_timers};
pub use select::{Selection, select, select_names};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Position of a run inside the study: core count first, run index second.
///
/// The derived ordering is the processing order of the whole pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunKey {
    /// Number of cores the run used
    pub core_count: u32,
    /// Repetition index at that core count (1 when the file name has none)
    pub run_index: u32,
}

impl RunKey {
    /// Create a key
    pub fn new(core_count: u32, run_index: u32) -> Self {
        Self {
            core_count,
            run_index,
        }
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cores={} run={}", self.core_count, self.run_index)
    }
}

/// A log file selected for processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    /// Number of cores the run used
    pub core_count: u32,
    /// Repetition index at that core count
    pub run_index: u32,
    /// Full path to the log
    pub path: PathBuf,
}

impl InputFile {
    /// Sort key of this file
    pub fn key(&self) -> RunKey {
        RunKey::new(self.core_count, self.run_index)
    }
}

/// Extracted value of one metric, or the marker that its pattern did not match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// The pattern matched and the capture parsed as a finite number
    Present(f64),
    /// No usable value in this log
    Absent,
}

impl MetricValue {
    /// The value, if present
    pub fn value(self) -> Option<f64> {
        match self {
            MetricValue::Present(v) => Some(v),
            MetricValue::Absent => None,
        }
    }

    /// Whether this is the absent marker
    pub fn is_absent(self) -> bool {
        matches!(self, MetricValue::Absent)
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MetricValue::Absent, MetricValue::Present)
    }
}

/// One extraction result for a (file, metric) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Core count of the source file
    pub core_count: u32,
    /// Run index of the source file
    pub run_index: u32,
    /// Metric name from the `MetricSpec`
    pub metric: String,
    /// Extracted value
    pub value: MetricValue,
}

impl MetricRecord {
    /// Key of the run this record belongs to
    pub fn key(&self) -> RunKey {
        RunKey::new(self.core_count, self.run_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_key_ordering() {
        let mut keys = vec![
            RunKey::new(16, 1),
            RunKey::new(4, 2),
            RunKey::new(8, 1),
            RunKey::new(4, 1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                RunKey::new(4, 1),
                RunKey::new(4, 2),
                RunKey::new(8, 1),
                RunKey::new(16, 1),
            ]
        );
    }

    #[test]
    fn test_metric_value_serde() {
        let present = serde_json::to_string(&MetricValue::Present(1.5)).unwrap();
        let absent = serde_json::to_string(&MetricValue::Absent).unwrap();
        assert_eq!(present, "1.5");
        assert_eq!(absent, "null");

        let back: MetricValue = serde_json::from_str("null").unwrap();
        assert!(back.is_absent());
    }

    #[test]
    fn test_metric_value_from_option() {
        assert_eq!(MetricValue::from(Some(2.0)).value(), Some(2.0));
        assert!(MetricValue::from(None).is_absent());
    }
}
