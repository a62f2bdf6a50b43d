#![warn(missing_docs)]
//! Scalebench Report - Tables and Output Formats
//!
//! Generates various output formats:
//! - JSON (the full report, machine-readable)
//! - CSV (the per-run table, spreadsheet-compatible)
//! - CSV table directories for external chart tools (`CsvTableEmitter`)
//!
//! Human-readable terminal output lives in the CLI.

mod csv;
mod emitter;
mod json;
mod report;
mod tables;

pub use crate::csv::{
    generate_csv_report, write_aggregate_csv, write_long_csv, write_run_scaling_csv,
    write_runs_csv, write_scaling_csv,
};
pub use emitter::{CsvTableEmitter, EmitError, ReportEmitter, table_slug, write_tables};
pub use json::{generate_json_report, parse_json_report};
pub use report::{MetricInfo, Report, ReportMeta, ReportSummary, RunSeries, SeriesFailure};
pub use tables::{LongRow, WideRow, WideTable, wide_table};

/// Version of the report layout
pub const SCHEMA_VERSION: u32 = 1;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// JSON with full schema
    Json,
    /// CSV run table
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Human => "human",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}
