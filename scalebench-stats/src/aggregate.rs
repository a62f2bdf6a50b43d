//! Run Aggregation
//!
//! Folds metric records into one row per core count. Each row holds a cell
//! per metric name; a cell with no non-absent value is `Undefined` rather than
//! zero or NaN.

use crate::summary::{CellSummary, compute_summary};
use scalebench_core::{MetricRecord, MetricValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregated statistics of one (core count, metric) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregatedCell {
    /// At least one value was present
    Defined {
        /// Statistics over the present values
        summary: CellSummary,
        /// Runs whose value was absent
        absent: usize,
    },
    /// Every run lacked a value
    Undefined {
        /// Runs whose value was absent
        absent: usize,
    },
}

impl AggregatedCell {
    /// Statistics, if defined
    pub fn summary(&self) -> Option<&CellSummary> {
        match self {
            AggregatedCell::Defined { summary, .. } => Some(summary),
            AggregatedCell::Undefined { .. } => None,
        }
    }

    /// Mean, if defined
    pub fn mean(&self) -> Option<f64> {
        self.summary().map(|s| s.mean)
    }

    /// Standard deviation, if defined and at least two samples exist
    pub fn std_dev(&self) -> Option<f64> {
        self.summary().and_then(|s| s.std_dev)
    }

    /// Number of absent values in the cell
    pub fn absent(&self) -> usize {
        match self {
            AggregatedCell::Defined { absent, .. } | AggregatedCell::Undefined { absent } => {
                *absent
            }
        }
    }

    /// Whether the cell has no statistics
    pub fn is_undefined(&self) -> bool {
        matches!(self, AggregatedCell::Undefined { .. })
    }
}

/// All metrics at one core count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    /// Core count of this row
    pub core_count: u32,
    /// Run indices that contributed records, ascending
    pub runs: Vec<u32>,
    /// Cell per metric name
    pub cells: BTreeMap<String, AggregatedCell>,
}

impl AggregatedRow {
    /// Cell of `metric`, if the metric is known
    pub fn cell(&self, metric: &str) -> Option<&AggregatedCell> {
        self.cells.get(metric)
    }
}

/// Aggregated rows keyed by core count (ascending)
pub type AggregatedRows = BTreeMap<u32, AggregatedRow>;

#[derive(Default)]
struct Group {
    values: Vec<f64>,
    absent: usize,
}

/// Group records by core count and metric and summarize each group.
///
/// Every metric seen anywhere gets a cell in every row, so a metric missing
/// from all files of one core count shows up as `Undefined` there.
pub fn aggregate(records: &[MetricRecord]) -> AggregatedRows {
    let mut groups: BTreeMap<(u32, &str), Group> = BTreeMap::new();
    let mut runs: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    let mut metrics: BTreeSet<&str> = BTreeSet::new();

    for record in records {
        metrics.insert(record.metric.as_str());
        runs.entry(record.core_count)
            .or_default()
            .insert(record.run_index);

        let group = groups
            .entry((record.core_count, record.metric.as_str()))
            .or_default();
        match record.value {
            MetricValue::Present(v) => group.values.push(v),
            MetricValue::Absent => group.absent += 1,
        }
    }

    runs.into_iter()
        .map(|(core_count, run_set)| {
            let cells = metrics
                .iter()
                .map(|&metric| {
                    let cell = match groups.get(&(core_count, metric)) {
                        Some(group) => match compute_summary(&group.values) {
                            Some(summary) => AggregatedCell::Defined {
                                summary,
                                absent: group.absent,
                            },
                            None => AggregatedCell::Undefined {
                                absent: group.absent,
                            },
                        },
                        None => AggregatedCell::Undefined { absent: 0 },
                    };
                    (metric.to_string(), cell)
                })
                .collect();

            let row = AggregatedRow {
                core_count,
                runs: run_set.into_iter().collect(),
                cells,
            };
            (core_count, row)
        })
        .collect()
}
