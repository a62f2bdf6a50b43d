//! Built-in metric presets for Albany/Trilinos solver timing output

use crate::error::SpecError;
use crate::extract::MetricSet;

/// Timers printed by Albany runs driven through Piro/NOX
pub const SOLVER_TIMERS: &[(&str, &str)] = &[
    (
        "Piro NOX Solve",
        r"Piro::NOXSolver::evalModelImpl::solve: (\d+\.\d+)",
    ),
    ("Total Fill Time", r"Albany: Total Fill Time: (\d+\.\d+)"),
    (
        "Preconditioner Construction",
        r"NOX Total Preconditioner Construction: (\d+\.\d+)",
    ),
    ("Total Linear Solve", r"NOX Total Linear Solve: (\d+\.\d+)"),
];

/// Compile [`SOLVER_TIMERS`] into a metric set
pub fn solver_timers() -> Result<MetricSet, SpecError> {
    MetricSet::from_pairs(SOLVER_TIMERS.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MetricValue, extract};

    #[test]
    fn test_presets_compile() {
        let set = solver_timers().unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.names()[0], "Piro NOX Solve");
    }

    #[test]
    fn test_presets_match_sample_log() {
        let log = "\
Piro::NOXSolver::evalModelImpl::solve: 35.4208
Albany: Total Fill Time: 5.13436
NOX Total Preconditioner Construction: 18.1079
NOX Total Linear Solve: 12.0622
";
        let out = extract(log, &solver_timers().unwrap());
        assert_eq!(
            out["Piro NOX Solve"].clone().unwrap(),
            MetricValue::Present(35.4208)
        );
        assert_eq!(
            out["Total Fill Time"].clone().unwrap(),
            MetricValue::Present(5.13436)
        );
        assert_eq!(
            out["Preconditioner Construction"].clone().unwrap(),
            MetricValue::Present(18.1079)
        );
        assert_eq!(
            out["Total Linear Solve"].clone().unwrap(),
            MetricValue::Present(12.0622)
        );
    }
}
