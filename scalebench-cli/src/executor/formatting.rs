//! Output Formatting
//!
//! Human-readable output for scaling reports and file listings.
//!
//! Generates terminal-friendly output with:
//! - One scaling table per metric (actual, spread across runs, ideal, speedup, efficiency)
//! - Series that could not be derived, with the reason
//! - Isolated faults (malformed names, unreadable files, bad values)
//! - Runs outside the sigma band of their cell

use scalebench_core::{NamingConvention, Selection};
use scalebench_report::Report;

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "-".to_string(),
    }
}

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Scalebench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    output.push_str(&format!(
        "Directory: {} ({})\n",
        report.meta.directory.display(),
        report.meta.convention.template()
    ));
    match report.meta.baseline_cores {
        Some(baseline) => output.push_str(&format!("Baseline:  {} cores\n", baseline)),
        None => output.push_str("Baseline:  none (no data)\n"),
    }
    output.push_str(&format!(
        "Cores:     {}\n",
        report
            .summary
            .core_counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    if !report.summary.doubling {
        output.push_str("Warning:   core counts do not double at every step\n");
    }

    for series in &report.series {
        output.push_str(&format!("\n{}\n", series.metric));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "  {:>6}  {:>10}  {:>8}  {:>6}  {:>10}  {:>8}  {:>7}  {:>7}\n",
            "cores", "actual", "stddev", "cv", "ideal", "speedup", "ideal", "eff"
        ));

        for p in &series.points {
            let cv = report
                .aggregate_at(p.core_count)
                .and_then(|row| row.cell(&series.metric))
                .and_then(|cell| cell.summary())
                .and_then(|summary| summary.coefficient_of_variation());
            output.push_str(&format!(
                "  {:>6}  {:>10.4}  {:>8}  {:>6}  {:>10.4}  {:>7.2}x  {:>6.0}x  {:>6.1}%\n",
                p.core_count,
                p.actual,
                fmt_opt(p.std_dev, 4),
                fmt_pct(cv),
                p.ideal,
                p.speedup,
                p.ideal_speedup,
                p.efficiency
            ));
        }
        if !series.skipped.is_empty() {
            let skipped: Vec<String> = series.skipped.iter().map(|c| c.to_string()).collect();
            output.push_str(&format!("  no data at cores: {}\n", skipped.join(", ")));
        }
    }

    let failures: Vec<_> = report
        .failures
        .iter()
        .filter(|f| f.run_index.is_none())
        .collect();
    if !failures.is_empty() {
        output.push_str("\nSkipped Series\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for f in failures {
            output.push_str(&format!("  ✗ {}\n", f.message));
        }
    }

    if !report.faults.is_empty() {
        output.push_str("\nFaults\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for fault in &report.faults {
            output.push_str(&format!("  ! {}\n", fault));
        }
    }

    if !report.band_flags.is_empty() {
        output.push_str(&format!(
            "\nRuns Outside ±{}σ\n",
            report.meta.sigma_band
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for flag in &report.band_flags {
            output.push_str(&format!(
                "  cores={} run={} {}: {:.4} not in [{:.4}, {:.4}]\n",
                flag.core_count,
                flag.run_index,
                flag.metric,
                flag.value,
                flag.band.lower,
                flag.band.upper
            ));
        }
    }

    // Summary
    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Files: {}  Rejected: {}  Records: {}  Absent: {}  Faults: {}\n",
        report.summary.files_selected,
        report.summary.files_rejected,
        report.summary.records,
        report.summary.absent_values,
        report.summary.faults
    ));
    output.push_str(&format!(
        "  Series: {} ok, {} skipped  Per-run series: {}\n",
        report.summary.series_ok,
        report.summary.series_failed,
        report.run_series.len()
    ));
    output.push_str(&format!(
        "  Duration: {:.2} ms\n",
        report.summary.total_duration_ms
    ));

    output
}

/// Format the processing plan of `scalebench list`
pub fn format_file_list(selection: &Selection, convention: &NamingConvention) -> String {
    let mut output = String::new();
    output.push_str(&format!("Scalebench Plan ({}):\n", convention.template()));

    let mut current = None;
    for file in &selection.files {
        if current != Some(file.core_count) {
            output.push_str(&format!("├── cores: {}\n", file.core_count));
            current = Some(file.core_count);
        }
        output.push_str(&format!(
            "│   ├── run {} ({})\n",
            file.run_index,
            file.path.display()
        ));
    }
    output.push_str(&format!(
        "{} files found at {} core counts.\n",
        selection.files.len(),
        selection.core_counts().len()
    ));

    if !selection.faults.is_empty() {
        output.push_str("Rejected:\n");
        for fault in &selection.faults {
            output.push_str(&format!("  {}\n", fault));
        }
    }
    output
}
