//! Run Tables
//!
//! The wide table has one row per run and one column per metric. Melting it
//! gives the long form, one row per (run, metric), which plotting tools prefer.

use scalebench_core::MetricRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One run with every metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WideRow {
    /// Core count
    pub core_count: u32,
    /// Run index
    pub run_index: u32,
    /// Value per metric name; `None` when absent
    pub values: BTreeMap<String, Option<f64>>,
}

/// All runs, ordered by (core count, run index)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WideTable {
    /// Column order
    pub metrics: Vec<String>,
    /// Rows
    pub rows: Vec<WideRow>,
}

/// One (run, metric) value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongRow {
    /// Core count
    pub core_count: u32,
    /// Run index
    pub run_index: u32,
    /// Metric name
    pub metric: String,
    /// Value; `None` when absent
    pub value: Option<f64>,
}

/// Pivot records into one row per run.
///
/// Columns follow `metrics`; a metric with no record for a run is `None`.
pub fn wide_table(records: &[MetricRecord], metrics: &[String]) -> WideTable {
    let mut runs: BTreeMap<(u32, u32), BTreeMap<String, Option<f64>>> = BTreeMap::new();
    for record in records {
        runs.entry((record.core_count, record.run_index))
            .or_default()
            .insert(record.metric.clone(), record.value.value());
    }

    let rows = runs
        .into_iter()
        .map(|((core_count, run_index), found)| {
            let values = metrics
                .iter()
                .map(|m| (m.clone(), found.get(m).copied().flatten()))
                .collect();
            WideRow {
                core_count,
                run_index,
                values,
            }
        })
        .collect();

    WideTable {
        metrics: metrics.to_vec(),
        rows,
    }
}

impl WideTable {
    /// Long form: rows ordered by run, then by column order
    pub fn melt(&self) -> Vec<LongRow> {
        self.rows
            .iter()
            .flat_map(|row| {
                self.metrics.iter().map(move |metric| LongRow {
                    core_count: row.core_count,
                    run_index: row.run_index,
                    metric: metric.clone(),
                    value: row.values.get(metric).copied().flatten(),
                })
            })
            .collect()
    }

    /// Number of absent cells
    pub fn absent_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.values.values())
            .filter(|v| v.is_none())
            .count()
    }
}
