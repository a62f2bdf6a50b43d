//! Configuration loading from scalebench.toml
//!
//! Scalebench configuration can be specified in a `scalebench.toml` file next to
//! the study. The configuration is automatically discovered by walking up from
//! the current directory; command-line flags override it.

use anyhow::Context;
use scalebench_core::{MetricSet, NamingConvention, SpecError, solver_timers};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "scalebench.toml";

/// Scalebench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScaleConfig {
    /// Input selection
    #[serde(default)]
    pub input: InputConfig,
    /// Analysis parameters
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Metrics to extract; the solver timer presets when empty
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the logs live and how they are named
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the logs (current directory if unset)
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// File name prefix before `_cores`
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// File extension
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            prefix: default_prefix(),
            extension: default_extension(),
        }
    }
}

fn default_prefix() -> String {
    "data".to_string()
}
fn default_extension() -> String {
    "txt".to_string()
}

/// Scaling analysis parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Baseline core count (smallest core count present if unset)
    #[serde(default)]
    pub baseline_cores: Option<u32>,
    /// Half-width of the sigma band in standard deviations
    #[serde(default = "default_sigma_band")]
    pub sigma_band: f64,
    /// Also derive a scaling series for every run index
    #[serde(default = "default_per_run")]
    pub per_run: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            baseline_cores: None,
            sigma_band: default_sigma_band(),
            per_run: default_per_run(),
        }
    }
}

fn default_sigma_band() -> f64 {
    scalebench_stats::DEFAULT_SIGMA_BAND
}
fn default_per_run() -> bool {
    true
}

/// A metric definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Metric name
    pub name: String,
    /// Regex whose first capture group is the value
    pub pattern: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Write the CSV tables into this directory
    #[serde(default)]
    pub tables_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            tables_dir: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl ScaleConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("invalid {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Find `scalebench.toml` walking up from `start`
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Discover and load configuration by walking up from the current directory.
    ///
    /// A file that exists but does not parse is an error, not a silent default.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        match Self::find_from(&cwd) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using configuration");
                Self::load(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Check value ranges serde cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        let k = self.analysis.sigma_band;
        if !k.is_finite() || k <= 0.0 {
            anyhow::bail!("analysis.sigma_band must be a positive number, got {k}");
        }
        if self.analysis.baseline_cores == Some(0) {
            anyhow::bail!("analysis.baseline_cores must be a positive core count");
        }
        if self.input.prefix.is_empty() {
            anyhow::bail!("input.prefix must not be empty");
        }
        self.output
            .format
            .parse::<scalebench_report::OutputFormat>()
            .map_err(|e| anyhow::anyhow!("output.format: {e}"))?;
        Ok(())
    }

    /// Naming convention of the input section
    pub fn convention(&self) -> NamingConvention {
        NamingConvention::new(&self.input.prefix, &self.input.extension)
    }

    /// Compile the configured metrics, or the presets when none are listed
    pub fn metric_set(&self) -> Result<MetricSet, SpecError> {
        if self.metrics.is_empty() {
            return solver_timers();
        }
        MetricSet::from_pairs(
            self.metrics
                .iter()
                .map(|m| (m.name.clone(), m.pattern.as_str())),
        )
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Scalebench Configuration
# https://github.com/ml-rust/scalebench

[input]
# Directory holding the logs (uncomment to enable; default: current directory)
# directory = "logs"
# Files are named <prefix>_cores<N>.<extension> or <prefix>_cores<N>_run<R>.<extension>
prefix = "data"
extension = "txt"

[analysis]
# Baseline core count (uncomment to enable; default: smallest core count found)
# baseline_cores = 4
# Runs further than this many standard deviations from their mean are flagged
sigma_band = 3.0
# Derive a scaling series for every run index as well
per_run = true

# Metrics to extract. The first capture group holds the value.
# Without any [[metrics]] entry the Albany/NOX solver timers are used.
# [[metrics]]
# name = "Piro NOX Solve"
# pattern = 'Piro::NOXSolver::evalModelImpl::solve: (\d+\.\d+)'

[output]
# Default output format: human, json, csv
format = "human"
# Write CSV tables for plotting into this directory (uncomment to enable)
# tables_dir = "scaling-tables"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScaleConfig::default();
        assert_eq!(config.input.prefix, "data");
        assert_eq!(config.input.extension, "txt");
        assert_eq!(config.analysis.baseline_cores, None);
        assert!((config.analysis.sigma_band - 3.0).abs() < f64::EPSILON);
        assert!(config.analysis.per_run);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [input]
            prefix = "albany"

            [analysis]
            baseline_cores = 8

            [[metrics]]
            name = "Solve"
            pattern = 'solve: (\d+\.\d+)'
        "#;

        let config: ScaleConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.input.prefix, "albany");
        assert_eq!(config.analysis.baseline_cores, Some(8));
        // Defaults should still apply
        assert_eq!(config.input.extension, "txt");
        assert!(config.analysis.per_run);

        let set = config.metric_set().unwrap();
        assert_eq!(set.names(), vec!["Solve".to_string()]);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: ScaleConfig = toml::from_str(&ScaleConfig::default_toml()).unwrap();
        assert_eq!(config.input.prefix, "data");
        assert!(config.metrics.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_presets_when_no_metrics() {
        let set = ScaleConfig::default().metric_set().unwrap();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScaleConfig::default();
        config.analysis.sigma_band = 0.0;
        assert!(config.validate().is_err());

        let mut config = ScaleConfig::default();
        config.analysis.baseline_cores = Some(0);
        assert!(config.validate().is_err());

        let mut config = ScaleConfig::default();
        config.output.format = "html".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_find_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), ScaleConfig::default_toml()).unwrap();

        let found = ScaleConfig::find_from(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE_NAME));
        ScaleConfig::load(&found).unwrap();
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[analysis]\nsigma_band = \"wide\"\n").unwrap();
        assert!(ScaleConfig::load(&path).is_err());
    }
}
