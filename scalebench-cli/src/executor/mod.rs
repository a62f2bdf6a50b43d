//! Study Executor
//!
//! Runs the scaling pipeline over a directory of logs.
//!
//! ## Pipeline Overview
//!
//! ```text
//! StudyConfig (scalebench.toml + CLI flags)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Select files, extract metrics (parallel)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  analysis   │  Aggregate runs, scaling series, sigma bands
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build Report with metadata and summary
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - File selection and parallel metric extraction
//! - [`analysis`] - Aggregation and scaling analysis
//! - [`report`] - Report building
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - Report metadata

mod analysis;
mod execution;
mod formatting;
mod metadata;
mod report;

// Re-export public API
pub use analysis::{StudyAnalysis, analyze_study};
pub use execution::{Extraction, StudyConfig, extract_selection, select_inputs};
pub use formatting::{format_file_list, format_human_output};
pub use report::build_report;

use scalebench_core::SelectError;
use scalebench_report::Report;
use std::time::Instant;

/// Run the whole pipeline for `config`.
///
/// Only an unreadable directory is an error; everything that concerns a
/// single file or metric ends up in the report.
pub fn run_study(config: &StudyConfig) -> Result<Report, SelectError> {
    let start_time = Instant::now();

    let selection = select_inputs(config)?;
    let extraction = extract_selection(selection, &config.metrics);
    let analysis = analyze_study(&extraction.records, config);

    let total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    Ok(build_report(config, extraction, analysis, total_duration_ms))
}
