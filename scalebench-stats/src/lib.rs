#![warn(missing_docs)]
//! Scalebench Statistical Engine
//!
//! Turns extracted metric records into scaling results:
//! - Per-cell summary statistics (mean, sample standard deviation, quartiles)
//! - Run aggregation by core count with explicit undefined cells
//! - Sigma bands flagging runs far from their cell mean
//! - Strong-scaling analysis (ideal time, speedup, parallel efficiency)
//!
//! ```text
//! records ──▶ aggregate ──▶ rows ──▶ analyze ──▶ ScalingSeries
//!                             │
//!                             └──▶ flag_outside_band ──▶ BandFlag
//! ```

mod aggregate;
mod bands;
mod percentiles;
mod scaling;
mod summary;

pub use aggregate::{AggregatedCell, AggregatedRow, AggregatedRows, aggregate};
pub use bands::{BandFlag, BandSide, SigmaBand, flag_outside_band, sigma_band};
pub use scaling::{
    ScalingError, ScalingPoint, ScalingSeries, analyze, analyze_all, analyze_runs,
    default_baseline, is_doubling,
};
pub use summary::{CellSummary, compute_summary};

/// Default half-width of the sigma band, in standard deviations
pub const DEFAULT_SIGMA_BAND: f64 = 3.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((DEFAULT_SIGMA_BAND - 3.0).abs() < f64::EPSILON);
    }
}
