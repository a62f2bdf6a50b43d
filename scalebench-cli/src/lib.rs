#![warn(missing_docs)]
//! Scalebench CLI Library
//!
//! This module provides the command-line front end of scalebench: argument
//! parsing, `scalebench.toml` handling, the study pipeline and output.
//! The `scalebench` binary is a thin wrapper around [`run`].
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     scalebench_cli::run()
//! }
//! ```

mod config;
mod executor;

pub use config::*;
pub use executor::{
    Extraction, StudyAnalysis, StudyConfig, analyze_study, build_report, extract_selection,
    format_file_list, format_human_output, run_study, select_inputs,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use scalebench_core::{MetricSet, NamingConvention};
use scalebench_report::{
    OutputFormat, Report, generate_csv_report, generate_json_report, write_tables,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Scalebench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "scalebench")]
#[command(author, version, about = "Scalebench - strong-scaling analysis of solver logs")]
pub struct Cli {
    /// Optional subcommand (Run, List, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the log files (default: config, then current directory)
    pub directory: Option<PathBuf>,

    /// File name prefix before `_cores`
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// File extension of the logs
    #[arg(long, global = true)]
    pub extension: Option<String>,

    /// Baseline core count (default: smallest core count found)
    #[arg(long, global = true)]
    pub baseline: Option<u32>,

    /// Metric to extract as NAME=REGEX; repeat for several.
    /// Replaces the metrics of scalebench.toml.
    #[arg(long = "metric", value_name = "NAME=REGEX", value_parser = parse_metric, global = true)]
    pub metrics: Vec<(String, String)>,

    /// Output format: human, json, csv
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Write CSV tables for chart tools into this directory
    #[arg(long, global = true)]
    pub tables_dir: Option<PathBuf>,

    /// Sigma band half-width used to flag runs
    #[arg(long, global = true)]
    pub sigma: Option<f64>,

    /// Skip the per-run scaling series
    #[arg(long, global = true)]
    pub no_per_run: bool,

    /// Configuration file (default: scalebench.toml found walking up)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads for parallel extraction
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0", global = true)]
    pub threads: usize,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the study (default)
    Run {
        /// Directory holding the log files
        directory: Option<PathBuf>,
    },
    /// List the selected files in processing order and the rejected names
    List {
        /// Directory holding the log files
        directory: Option<PathBuf>,
    },
    /// Write a default scalebench.toml into the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse a `NAME=REGEX` metric argument
pub fn parse_metric(arg: &str) -> Result<(String, String), String> {
    let (name, pattern) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=REGEX, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing metric name in '{arg}'"));
    }
    Ok((name.to_string(), pattern.to_string()))
}

/// Run the Scalebench CLI with the process arguments.
/// This is the main entry point of the binary.
///
/// # Returns
/// Returns `Ok(())` on success, including runs with isolated faults.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Scalebench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    let filter = if cli.verbose {
        "scalebench=debug"
    } else {
        "scalebench=info"
    };
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Some(Commands::Init { force }) = cli.command {
        return init_config(Path::new(CONFIG_FILE_NAME), force);
    }

    let config = load_config(&cli)?;
    let study = build_study_config(&cli, &config)?;

    if cli.threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    match cli.command {
        Some(Commands::List { .. }) => list_files(&study),
        Some(Commands::Run { .. }) | None => run_analysis(&cli, &config, &study),
        Some(Commands::Init { .. }) => Ok(()),
    }
}

/// Explicit `--config`, else a discovered `scalebench.toml`, else defaults
fn load_config(cli: &Cli) -> anyhow::Result<ScaleConfig> {
    match &cli.config {
        Some(path) => ScaleConfig::load(path),
        None => Ok(ScaleConfig::discover()?.unwrap_or_default()),
    }
}

/// Build a StudyConfig by layering: scalebench.toml, then CLI overrides.
pub fn build_study_config(cli: &Cli, config: &ScaleConfig) -> anyhow::Result<StudyConfig> {
    let directory = match &cli.command {
        Some(Commands::Run { directory }) | Some(Commands::List { directory }) => {
            directory.clone()
        }
        _ => None,
    }
    .or_else(|| cli.directory.clone())
    .or_else(|| config.input.directory.clone())
    .unwrap_or_else(|| PathBuf::from("."));

    let configured = config.convention();
    let convention = NamingConvention::new(
        cli.prefix.clone().unwrap_or(configured.prefix),
        cli.extension.clone().unwrap_or(configured.extension),
    );
    if convention.prefix.is_empty() {
        anyhow::bail!("file name prefix must not be empty");
    }

    let metrics = if cli.metrics.is_empty() {
        config.metric_set()
    } else {
        MetricSet::from_pairs(cli.metrics.iter().map(|(n, p)| (n.clone(), p.as_str())))
    }
    .context("invalid metric definition")?;

    let baseline_cores = cli.baseline.or(config.analysis.baseline_cores);
    if baseline_cores == Some(0) {
        anyhow::bail!("baseline core count must be positive");
    }

    let sigma_band = cli.sigma.unwrap_or(config.analysis.sigma_band);
    if !sigma_band.is_finite() || sigma_band <= 0.0 {
        anyhow::bail!("sigma band must be a positive number, got {sigma_band}");
    }

    Ok(StudyConfig {
        directory,
        convention,
        metrics,
        baseline_cores,
        sigma_band,
        per_run: config.analysis.per_run && !cli.no_per_run,
    })
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(path, ScaleConfig::default_toml())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn list_files(study: &StudyConfig) -> anyhow::Result<()> {
    let selection = select_inputs(study)
        .with_context(|| format!("cannot list {}", study.directory.display()))?;
    print!("{}", format_file_list(&selection, &study.convention));
    Ok(())
}

fn run_analysis(cli: &Cli, config: &ScaleConfig, study: &StudyConfig) -> anyhow::Result<()> {
    let format = match cli.format {
        Some(format) => format,
        None => config
            .output
            .format
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
    };

    let report = run_study(study)
        .with_context(|| format!("cannot read study directory {}", study.directory.display()))?;

    if report.files.is_empty() {
        anyhow::bail!(
            "no files named {} found in {}",
            study.convention.template(),
            study.directory.display()
        );
    }

    let output = render(&report, format)?;
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    let tables_dir = cli
        .tables_dir
        .clone()
        .or_else(|| config.output.tables_dir.clone());
    if let Some(dir) = tables_dir {
        let written = write_tables(&report, &dir)?;
        eprintln!("{} tables written to: {}", written.len(), dir.display());
    }

    if !report.faults.is_empty() {
        eprintln!(
            "\n{} file(s) or value(s) skipped, see the faults section",
            report.faults.len()
        );
    }
    Ok(())
}

/// Render `report` in `format`
pub fn render(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Csv => generate_csv_report(report)?,
        OutputFormat::Human => format_human_output(report),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("scalebench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(
            parse_metric("Solve=solve: (\\d+)=x").unwrap(),
            ("Solve".to_string(), "solve: (\\d+)=x".to_string())
        );
        assert!(parse_metric("no-separator").is_err());
        assert!(parse_metric(" =(\\d+)").is_err());
    }

    #[test]
    fn test_default_command_with_directory() {
        let cli = parse(&["logs", "--baseline", "8", "--format", "json"]);
        assert!(cli.command.is_none());
        let study = build_study_config(&cli, &ScaleConfig::default()).unwrap();
        assert_eq!(study.directory, PathBuf::from("logs"));
        assert_eq!(study.baseline_cores, Some(8));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(study.metrics.len(), 4);
    }

    #[test]
    fn test_subcommand_directory_and_global_flags() {
        let cli = parse(&["list", "runs", "--prefix", "albany", "--extension", ".log"]);
        let study = build_study_config(&cli, &ScaleConfig::default()).unwrap();
        assert_eq!(study.directory, PathBuf::from("runs"));
        assert_eq!(study.convention, NamingConvention::new("albany", "log"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = ScaleConfig::default();
        config.input.prefix = "from_file".to_string();
        config.input.directory = Some(PathBuf::from("file_dir"));
        config.analysis.baseline_cores = Some(4);
        config.metrics.push(MetricConfig {
            name: "FileMetric".to_string(),
            pattern: r"x: (\d+)".to_string(),
        });

        let cli = parse(&[]);
        let study = build_study_config(&cli, &config).unwrap();
        assert_eq!(study.directory, PathBuf::from("file_dir"));
        assert_eq!(study.convention.prefix, "from_file");
        assert_eq!(study.baseline_cores, Some(4));
        assert_eq!(study.metrics.names(), vec!["FileMetric".to_string()]);

        let cli = parse(&["--metric", r"Cli=y: (\d+)", "--baseline", "16", "--no-per-run"]);
        let study = build_study_config(&cli, &config).unwrap();
        assert_eq!(study.metrics.names(), vec!["Cli".to_string()]);
        assert_eq!(study.baseline_cores, Some(16));
        assert!(!study.per_run);
    }

    #[test]
    fn test_invalid_metric_is_an_error() {
        let cli = parse(&["--metric", "Broken=no group"]);
        assert!(build_study_config(&cli, &ScaleConfig::default()).is_err());
    }

    #[test]
    fn test_unknown_format_rejected_by_parser() {
        let result =
            Cli::try_parse_from(["scalebench", "--format", "html"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_convention_is_used_without_flags() {
        let mut config = ScaleConfig::default();
        config.input.prefix = "albany".to_string();
        config.input.extension = ".log".to_string();
        let study = build_study_config(&parse(&[]), &config).unwrap();
        assert_eq!(study.convention, NamingConvention::new("albany", "log"));

        let study = build_study_config(&parse(&["--extension", "out"]), &config).unwrap();
        assert_eq!(study.convention, NamingConvention::new("albany", "out"));
    }

    #[test]
    fn test_run_without_matching_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "time: 1.0\n").unwrap();
        std::fs::write(dir.path().join("other_cores4.txt"), "time: 1.0\n").unwrap();

        let dir_arg = dir.path().to_string_lossy().into_owned();
        let cli = parse(&[dir_arg.as_str()]);
        let config = ScaleConfig::default();
        let study = build_study_config(&cli, &config).unwrap();

        let err = run_analysis(&cli, &config, &study).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no files named data_cores<N>[_run<R>].txt"));
        assert!(message.contains(&dir_arg));
    }

    #[test]
    fn test_run_on_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let missing_arg = missing.to_string_lossy().into_owned();
        let cli = parse(&[missing_arg.as_str()]);
        let config = ScaleConfig::default();
        let study = build_study_config(&cli, &config).unwrap();
        assert!(run_analysis(&cli, &config, &study).is_err());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
        ScaleConfig::load(&path).unwrap();
    }
}
