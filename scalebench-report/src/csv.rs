//! CSV Output
//!
//! Every table is written with a header row. Absent values are empty fields;
//! numbers use the shortest representation that round-trips.

use crate::report::{Report, RunSeries};
use crate::tables::{LongRow, WideTable};
use scalebench_stats::{AggregatedCell, AggregatedRow, ScalingSeries};
use std::io;

fn fmt_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Wide run table: `coreCount, runIndex, <metric>...`
pub fn write_runs_csv<W: io::Write>(table: &WideTable, out: W) -> Result<(), ::csv::Error> {
    let mut wtr = ::csv::Writer::from_writer(out);

    let mut header = vec!["coreCount".to_string(), "runIndex".to_string()];
    header.extend(table.metrics.iter().cloned());
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.core_count.to_string(), row.run_index.to_string()];
        for metric in &table.metrics {
            record.push(fmt_value(row.values.get(metric).copied().flatten()));
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Long table: `coreCount, runIndex, metric, value`
pub fn write_long_csv<W: io::Write>(rows: &[LongRow], out: W) -> Result<(), ::csv::Error> {
    let mut wtr = ::csv::Writer::from_writer(out);
    wtr.write_record(["coreCount", "runIndex", "metric", "value"])?;
    for row in rows {
        wtr.write_record([
            row.core_count.to_string(),
            row.run_index.to_string(),
            row.metric.clone(),
            fmt_value(row.value),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Aggregate table, one line per (core count, metric) in `metrics` order
pub fn write_aggregate_csv<W: io::Write>(
    rows: &[AggregatedRow],
    metrics: &[String],
    out: W,
) -> Result<(), ::csv::Error> {
    let mut wtr = ::csv::Writer::from_writer(out);
    wtr.write_record([
        "coreCount", "metric", "samples", "absent", "mean", "stdDev", "min", "q1", "median",
        "q3", "max",
    ])?;

    for row in rows {
        for metric in metrics {
            let Some(cell) = row.cell(metric) else {
                continue;
            };
            let mut record = vec![row.core_count.to_string(), metric.clone()];
            match cell {
                AggregatedCell::Defined { summary, absent } => record.extend([
                    summary.samples.to_string(),
                    absent.to_string(),
                    summary.mean.to_string(),
                    fmt_value(summary.std_dev),
                    summary.min.to_string(),
                    summary.q1.to_string(),
                    summary.median.to_string(),
                    summary.q3.to_string(),
                    summary.max.to_string(),
                ]),
                AggregatedCell::Undefined { absent } => {
                    record.extend(["0".to_string(), absent.to_string()]);
                    record.extend(std::iter::repeat_n(String::new(), 7));
                }
            }
            wtr.write_record(&record)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

const SCALING_HEADER: [&str; 6] = [
    "coreCount",
    "actual",
    "ideal",
    "speedup",
    "idealSpeedup",
    "efficiency",
];

fn scaling_fields(series: &ScalingSeries) -> impl Iterator<Item = [String; 6]> + '_ {
    series.points.iter().map(|p| {
        [
            p.core_count.to_string(),
            p.actual.to_string(),
            p.ideal.to_string(),
            p.speedup.to_string(),
            p.ideal_speedup.to_string(),
            p.efficiency.to_string(),
        ]
    })
}

/// Scaling table of one metric
pub fn write_scaling_csv<W: io::Write>(series: &ScalingSeries, out: W) -> Result<(), ::csv::Error> {
    let mut wtr = ::csv::Writer::from_writer(out);
    wtr.write_record(SCALING_HEADER)?;
    for fields in scaling_fields(series) {
        wtr.write_record(&fields)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Per-run scaling table of one metric, prefixed with `runIndex`
pub fn write_run_scaling_csv<'a, W: io::Write>(
    runs: impl IntoIterator<Item = &'a RunSeries>,
    out: W,
) -> Result<(), ::csv::Error> {
    let mut wtr = ::csv::Writer::from_writer(out);
    let mut header = vec!["runIndex"];
    header.extend(SCALING_HEADER);
    wtr.write_record(&header)?;

    for run in runs {
        for fields in scaling_fields(&run.series) {
            let mut record = vec![run.run_index.to_string()];
            record.extend(fields);
            wtr.write_record(&record)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Generate the run table as CSV text.
///
/// The other tables are written to files by `CsvTableEmitter`.
pub fn generate_csv_report(report: &Report) -> Result<String, ::csv::Error> {
    let mut buf = Vec::new();
    write_runs_csv(&report.wide, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
