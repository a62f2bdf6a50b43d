//! Sigma Bands
//!
//! Marks runs whose value falls outside `mean ± k·σ` of their cell. The
//! flags are informational: flagged values stay in every statistic.

use crate::aggregate::{AggregatedCell, AggregatedRows};
use scalebench_core::{MetricRecord, MetricValue};
use serde::{Deserialize, Serialize};

/// Interval `[mean - k·σ, mean + k·σ]` of one cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaBand {
    /// Cell mean
    pub mean: f64,
    /// Cell standard deviation
    pub std_dev: f64,
    /// Width multiplier
    pub k: f64,
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl SigmaBand {
    /// Band around `mean`
    pub fn new(mean: f64, std_dev: f64, k: f64) -> Self {
        Self {
            mean,
            std_dev,
            k,
            lower: mean - k * std_dev,
            upper: mean + k * std_dev,
        }
    }

    /// Whether `value` lies inside the band (bounds included)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Band of `cell`; `None` when the cell is undefined or has a single sample
pub fn sigma_band(cell: &AggregatedCell, k: f64) -> Option<SigmaBand> {
    let summary = cell.summary()?;
    summary.std_dev.map(|sd| SigmaBand::new(summary.mean, sd, k))
}

/// Side of the band a flagged value fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSide {
    /// Below `lower`
    Below,
    /// Above `upper`
    Above,
}

/// A run value outside the band of its cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandFlag {
    /// Core count of the run
    pub core_count: u32,
    /// Run index
    pub run_index: u32,
    /// Metric name
    pub metric: String,
    /// The run's value
    pub value: f64,
    /// Band it was compared against
    pub band: SigmaBand,
    /// Which side it fell on
    pub side: BandSide,
}

/// List every present record outside the `k`-sigma band of its cell.
///
/// Output is ordered by (core count, run index, metric).
pub fn flag_outside_band(records: &[MetricRecord], rows: &AggregatedRows, k: f64) -> Vec<BandFlag> {
    let mut flags: Vec<BandFlag> = records
        .iter()
        .filter_map(|record| {
            let MetricValue::Present(value) = record.value else {
                return None;
            };
            let cell = rows.get(&record.core_count)?.cell(&record.metric)?;
            let band = sigma_band(cell, k)?;
            let side = if value < band.lower {
                BandSide::Below
            } else if value > band.upper {
                BandSide::Above
            } else {
                return None;
            };
            Some(BandFlag {
                core_count: record.core_count,
                run_index: record.run_index,
                metric: record.metric.clone(),
                value,
                band,
                side,
            })
        })
        .collect();

    flags.sort_by(|a, b| {
        (a.core_count, a.run_index, &a.metric).cmp(&(b.core_count, b.run_index, &b.metric))
    });
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;

    fn rec(core_count: u32, run_index: u32, metric: &str, value: Option<f64>) -> MetricRecord {
        MetricRecord {
            core_count,
            run_index,
            metric: metric.to_string(),
            value: value.into(),
        }
    }

    #[test]
    fn test_band_bounds() {
        let band = SigmaBand::new(10.0, 2.0, 3.0);
        assert_eq!(band.lower, 4.0);
        assert_eq!(band.upper, 16.0);
        assert!(band.contains(4.0));
        assert!(band.contains(16.0));
        assert!(!band.contains(16.5));
    }

    #[test]
    fn test_no_band_without_spread() {
        let rows = aggregate(&[rec(4, 1, "a", Some(1.0)), rec(4, 2, "b", None)]);
        assert!(sigma_band(rows[&4].cell("a").unwrap(), 3.0).is_none());
        assert!(sigma_band(rows[&4].cell("b").unwrap(), 3.0).is_none());
    }

    #[test]
    fn test_flags_values_outside_band() {
        // mean 12, sample sd 4
        let records = vec![
            rec(4, 1, "solve", Some(10.0)),
            rec(4, 2, "solve", Some(10.0)),
            rec(4, 3, "solve", Some(10.0)),
            rec(4, 4, "solve", Some(18.0)),
            rec(4, 5, "solve", None),
        ];
        let rows = aggregate(&records);
        let flags = flag_outside_band(&records, &rows, 1.0);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].run_index, 4);
        assert_eq!(flags[0].side, BandSide::Above);
        assert!((flags[0].band.upper - 16.0).abs() < 1e-12);

        // a wide band flags nothing
        assert!(flag_outside_band(&records, &rows, 3.0).is_empty());
    }

    #[test]
    fn test_identical_values_never_flagged() {
        let records: Vec<_> = (1..=4).map(|r| rec(8, r, "fill", Some(2.5))).collect();
        let rows = aggregate(&records);
        assert!(flag_outside_band(&records, &rows, 0.5).is_empty());
    }
}
