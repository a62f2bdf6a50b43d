//! Report Emitters
//!
//! An emitter hands a finished report to whatever renders it. Chart drawing is
//! left to external tools; `CsvTableEmitter` writes the tables they consume.

use crate::csv::{
    write_aggregate_csv, write_long_csv, write_run_scaling_csv, write_runs_csv, write_scaling_csv,
};
use crate::report::Report;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while emitting a report
#[derive(Debug, Error)]
pub enum EmitError {
    /// Creating a directory or file failed
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Encoding a table failed
    #[error("failed to encode {}: {source}", .path.display())]
    Csv {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: ::csv::Error,
    },
}

/// Consumer of finished reports
pub trait ReportEmitter {
    /// Emit `report`
    fn emit(&mut self, report: &Report) -> Result<(), EmitError>;
}

/// Writes every report table as a CSV file into one directory
#[derive(Debug, Clone)]
pub struct CsvTableEmitter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvTableEmitter {
    /// Emitter writing into `dir` (created on demand)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written by the last `emit`
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_table(
        &mut self,
        name: &str,
        write: impl FnOnce(BufWriter<File>) -> Result<(), ::csv::Error>,
    ) -> Result<(), EmitError> {
        let path = self.dir.join(name);
        let file = File::create(&path).map_err(|source| EmitError::Io {
            path: path.clone(),
            source,
        })?;
        write(BufWriter::new(file)).map_err(|source| EmitError::Csv {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote table");
        self.written.push(path);
        Ok(())
    }
}

/// File-name friendly form of a metric name, e.g. `Piro NOX Solve` -> `piro_nox_solve`
pub fn table_slug(metric: &str) -> String {
    let mut slug = String::with_capacity(metric.len());
    for c in metric.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "metric".to_string()
    } else {
        slug.to_string()
    }
}

/// Distinct slug per metric; colliding slugs get `_2`, `_3`... in metric order.
///
/// A slug also reserves its `<slug>_runs` form, the name of the per-run table.
fn unique_slugs(metrics: &[String]) -> BTreeMap<&str, String> {
    let mut taken = BTreeSet::new();
    let mut slugs = BTreeMap::new();
    for metric in metrics {
        let base = table_slug(metric);
        let mut slug = base.clone();
        let mut n = 2;
        while taken.contains(&slug) || taken.contains(&format!("{slug}_runs")) {
            slug = format!("{base}_{n}");
            n += 1;
        }
        taken.insert(format!("{slug}_runs"));
        taken.insert(slug.clone());
        slugs.insert(metric.as_str(), slug);
    }
    slugs
}

impl ReportEmitter for CsvTableEmitter {
    fn emit(&mut self, report: &Report) -> Result<(), EmitError> {
        self.written.clear();
        std::fs::create_dir_all(&self.dir).map_err(|source| EmitError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let metrics = &report.wide.metrics;
        let slugs = unique_slugs(metrics);
        let slug_of = |metric: &str| {
            slugs
                .get(metric)
                .cloned()
                .unwrap_or_else(|| table_slug(metric))
        };
        self.write_table("runs.csv", |out| write_runs_csv(&report.wide, out))?;
        self.write_table("long.csv", |out| write_long_csv(&report.wide.melt(), out))?;
        self.write_table("aggregate.csv", |out| {
            write_aggregate_csv(&report.aggregates, metrics, out)
        })?;

        for series in &report.series {
            let slug = slug_of(&series.metric);
            self.write_table(&format!("scaling_{slug}.csv"), |out| {
                write_scaling_csv(series, out)
            })?;
        }

        for metric in metrics {
            let mut runs = report.run_series_for(metric).peekable();
            if runs.peek().is_none() {
                continue;
            }
            let slug = slug_of(metric);
            self.write_table(&format!("scaling_{slug}_runs.csv"), |out| {
                write_run_scaling_csv(runs, out)
            })?;
        }

        tracing::info!(
            dir = %self.dir.display(),
            tables = self.written.len(),
            "wrote CSV tables"
        );
        Ok(())
    }
}

/// Emit the tables of `report` into `dir`, returning the written paths
pub fn write_tables(report: &Report, dir: &Path) -> Result<Vec<PathBuf>, EmitError> {
    let mut emitter = CsvTableEmitter::new(dir);
    emitter.emit(report)?;
    Ok(emitter.written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_slug() {
        assert_eq!(table_slug("Piro NOX Solve"), "piro_nox_solve");
        assert_eq!(table_slug("Total Fill Time"), "total_fill_time");
        assert_eq!(table_slug("  a--b  "), "a_b");
        assert_eq!(table_slug("%%%"), "metric");
    }

    #[test]
    fn test_colliding_slugs_are_disambiguated() {
        let metrics: Vec<String> = ["A B", "A-B", "a_b", "???"]
            .iter()
            .map(|m| m.to_string())
            .collect();
        let slugs = unique_slugs(&metrics);
        assert_eq!(slugs["A B"], "a_b");
        assert_eq!(slugs["A-B"], "a_b_2");
        assert_eq!(slugs["a_b"], "a_b_3");
        assert_eq!(slugs["???"], "metric");
        let distinct: BTreeSet<&String> = slugs.values().collect();
        assert_eq!(distinct.len(), metrics.len());
    }

    #[test]
    fn test_slug_never_shadows_a_per_run_table() {
        let metrics: Vec<String> = vec!["Solve runs".to_string(), "Solve".to_string()];
        let slugs = unique_slugs(&metrics);
        assert_eq!(slugs["Solve runs"], "solve_runs");
        assert_eq!(slugs["Solve"], "solve_2");
    }
}
