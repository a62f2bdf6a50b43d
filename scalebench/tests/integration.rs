//! Integration tests for Scalebench
//!
//! These tests run the whole pipeline over synthetic log directories.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use scalebench::{
    AggregatedRows, CsvTableEmitter, MetricSet, MetricValue, NamingConvention, Report,
    ReportEmitter, ScalingError, StudyConfig, aggregate, analyze, extract_file,
    generate_json_report, parse_json_report, run_study, select, select_names, solver_timers,
};
use std::path::Path;
use tempfile::TempDir;

/// A log as Albany prints it, with the four solver timers
fn solver_log(solve: f64, fill: f64, precond: f64, linear: f64) -> String {
    format!(
        "Albany version 3.1\n\
         Number of processors: 8\n\
         Piro::NOXSolver::evalModelImpl::solve: {solve:.4}\n\
         Albany: Total Fill Time: {fill:.4}\n\
         NOX Total Preconditioner Construction: {precond:.4}\n\
         NOX Total Linear Solve: {linear:.4}\n\
         Albany: End of run\n"
    )
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

/// Four core counts, five runs each, near-perfect scaling with small noise
fn study_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (step, cores) in [4u32, 8, 16, 32].into_iter().enumerate() {
        let scale = 2f64.powi(step as i32);
        for run in 1..=5u32 {
            let noise = run as f64 * 0.01;
            let log = solver_log(
                40.0 / scale + noise,
                5.0 / scale + noise,
                18.0 / scale + noise,
                12.0 / scale + noise,
            );
            write(dir.path(), &format!("data_cores{cores}_run{run}.txt"), &log);
        }
    }
    write(dir.path(), "README.md", "not a log");
    dir
}

fn study(dir: &Path) -> StudyConfig {
    StudyConfig::new(dir, solver_timers().unwrap())
}

fn bits(rows: &AggregatedRows) -> Vec<(u32, String, u64, Option<u64>)> {
    rows.values()
        .flat_map(|row| {
            row.cells.iter().map(move |(metric, cell)| {
                (
                    row.core_count,
                    metric.clone(),
                    cell.mean().map_or(0, f64::to_bits),
                    cell.std_dev().map(f64::to_bits),
                )
            })
        })
        .collect()
}

#[test]
fn test_pipeline_is_idempotent() {
    let dir = study_dir();
    let first = run_study(&study(dir.path())).unwrap();
    let second = run_study(&study(dir.path())).unwrap();

    assert_eq!(first.aggregates, second.aggregates);
    assert_eq!(first.series, second.series);
    for (a, b) in first.series.iter().zip(&second.series) {
        for (p, q) in a.points.iter().zip(&b.points) {
            assert_eq!(p.efficiency.to_bits(), q.efficiency.to_bits());
            assert_eq!(p.actual.to_bits(), q.actual.to_bits());
        }
    }
}

#[test]
fn test_aggregation_is_order_independent() {
    let dir = study_dir();
    let metrics = solver_timers().unwrap();
    let selection = select(dir.path(), &NamingConvention::default()).unwrap();

    let mut files = selection.files.clone();
    let expected = {
        let records: Vec<_> = files
            .iter()
            .flat_map(|f| extract_file(f, &metrics).records)
            .collect();
        aggregate(&records)
    };

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..10 {
        files.shuffle(&mut rng);
        let records: Vec<_> = files
            .iter()
            .flat_map(|f| extract_file(f, &metrics).records)
            .collect();
        let rows = aggregate(&records);
        assert_eq!(rows, expected);
        assert_eq!(bits(&rows), bits(&expected));
    }
}

#[test]
fn test_listing_order_does_not_matter() {
    let mut names: Vec<String> = [32u32, 4, 16, 8]
        .iter()
        .flat_map(|c| (1..=3).map(move |r| format!("data_cores{c}_run{r}.txt")))
        .collect();
    let conv = NamingConvention::default();
    let expected = select_names(Path::new("d"), &names, &conv).unwrap();

    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..10 {
        names.shuffle(&mut rng);
        let selection = select_names(Path::new("d"), &names, &conv).unwrap();
        assert_eq!(selection.files, expected.files);
    }
    assert_eq!(expected.files[0].core_count, 4);
    assert_eq!(expected.min_core_count(), Some(4));
}

#[test]
fn test_identical_runs_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    for run in 1..=5 {
        write(
            dir.path(),
            &format!("data_cores4_run{run}.txt"),
            &solver_log(40.0, 5.0, 18.0, 12.0),
        );
    }
    let report = run_study(&study(dir.path())).unwrap();
    let row = report.aggregate_at(4).unwrap();
    let cell = row.cell("Piro NOX Solve").unwrap();
    assert_eq!(cell.mean(), Some(40.0));
    assert_eq!(cell.std_dev(), Some(0.0));
    assert_eq!(cell.summary().unwrap().samples, 5);
    assert_eq!(row.runs, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_doubling_scaling_law() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "data_cores4.txt", &solver_log(40.0, 4.0, 4.0, 4.0));
    write(dir.path(), "data_cores8.txt", &solver_log(20.0, 2.0, 2.0, 2.5));

    let report = run_study(&study(dir.path())).unwrap();
    let solve = report.series_for("Piro NOX Solve").unwrap();
    assert_eq!(solve.baseline_cores, 4);
    let p = &solve.points[1];
    assert_eq!(p.core_count, 8);
    assert!((p.ideal - 20.0).abs() < 1e-9);
    assert!((p.speedup - 2.0).abs() < 1e-9);
    assert!((p.ideal_speedup - 2.0).abs() < 1e-9);
    assert!((p.efficiency - 100.0).abs() < 1e-9);

    let linear = report.series_for("Total Linear Solve").unwrap();
    // 4.0 -> 2.5: ideal 2.0, efficiency 80%
    assert!((linear.points[1].efficiency - 80.0).abs() < 1e-9);
    assert!(report.summary.doubling);
}

#[test]
fn test_missing_value_propagation() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "data_cores4_run1.txt", &solver_log(40.0, 5.0, 18.0, 12.0));
    write(dir.path(), "data_cores4_run2.txt", &solver_log(42.0, 7.0, 18.0, 12.0));
    // no preconditioner line in run 3
    write(
        dir.path(),
        "data_cores4_run3.txt",
        "Piro::NOXSolver::evalModelImpl::solve: 44.0000\n\
         Albany: Total Fill Time: 6.0000\n\
         NOX Total Linear Solve: 12.0000\n",
    );

    let metrics = solver_timers().unwrap();
    let file = select(dir.path(), &NamingConvention::default())
        .unwrap()
        .files
        .into_iter()
        .find(|f| f.run_index == 3)
        .unwrap();
    let out = extract_file(&file, &metrics);
    let precond = out
        .records
        .iter()
        .find(|r| r.metric == "Preconditioner Construction")
        .unwrap();
    assert_eq!(precond.value, MetricValue::Absent);
    assert!(out.faults.is_empty());

    let report = run_study(&study(dir.path())).unwrap();
    let row = report.aggregate_at(4).unwrap();
    let precond = row.cell("Preconditioner Construction").unwrap();
    assert_eq!(precond.summary().unwrap().samples, 2);
    assert_eq!(precond.absent(), 1);
    assert_eq!(precond.mean(), Some(18.0));

    let solve = row.cell("Piro NOX Solve").unwrap();
    assert_eq!(solve.summary().unwrap().samples, 3);
    assert!((solve.mean().unwrap() - 42.0).abs() < 1e-9);
    let fill = row.cell("Total Fill Time").unwrap();
    assert!((fill.mean().unwrap() - 6.0).abs() < 1e-9);

    assert_eq!(report.summary.absent_values, 1);
    assert_eq!(report.wide.rows[2].values["Preconditioner Construction"], None);
}

#[test]
fn test_zero_baseline_is_division_by_zero() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "data_cores4.txt", "solve: 0.0\n");
    write(dir.path(), "data_cores8.txt", "solve: 1.0\n");

    let metrics = MetricSet::from_pairs([("solve", r"solve: (\d+\.\d+)")]).unwrap();
    let report = run_study(&StudyConfig::new(dir.path(), metrics)).unwrap();
    assert!(report.series.is_empty());
    let failure = report
        .failures
        .iter()
        .find(|f| f.run_index.is_none())
        .unwrap();
    assert_eq!(
        failure.error,
        ScalingError::DivisionByZero {
            metric: "solve".to_string(),
            core_count: 4
        }
    );

    let rows = aggregate(&[]);
    assert!(matches!(
        analyze(&rows, "solve", 4),
        Err(ScalingError::MissingBaseline { .. })
    ));
}

#[test]
fn test_filename_parsing() {
    let pattern = NamingConvention::default().compile().unwrap();
    let key = pattern.parse("data_cores16_run3.txt").unwrap().unwrap();
    assert_eq!((key.core_count, key.run_index), (16, 3));
    let key = pattern.parse("data_cores16.txt").unwrap().unwrap();
    assert_eq!((key.core_count, key.run_index), (16, 1));
    assert!(pattern.parse("data_coresABC.txt").unwrap().is_err());
    assert!(pattern.parse("results_cores16.txt").is_none());
}

#[test]
fn test_faults_are_isolated_and_reported() {
    let dir = study_dir();
    write(dir.path(), "data_coresX_run1.txt", "garbage");
    write(dir.path(), "data_cores16_run01.txt", &solver_log(1.0, 1.0, 1.0, 1.0));
    write(
        dir.path(),
        "data_cores64_run1.txt",
        "Piro::NOXSolver::evalModelImpl::solve: 1.2.3\n",
    );

    let report = run_study(&study(dir.path())).unwrap();
    let kinds: Vec<&str> = report.faults.iter().map(|f| f.kind()).collect();
    assert!(kinds.contains(&"malformed_filename"));
    assert!(kinds.contains(&"duplicate_run"));
    // "1.2.3" does not match the preset's \d+\.\d+ fully, it captures "1.2"
    assert!(!kinds.contains(&"metric_parse"));
    // all four metrics still analyzed
    assert_eq!(report.series.len(), 4);
    assert_eq!(report.summary.files_selected, 21);
    assert_eq!(report.summary.files_rejected, 2);
    // the unpadded name keeps the (16, 1) slot
    assert!(
        report
            .files
            .iter()
            .any(|f| f.path.ends_with("data_cores16_run1.txt"))
    );
    assert!(
        !report
            .files
            .iter()
            .any(|f| f.path.ends_with("data_cores16_run01.txt"))
    );
}

#[test]
fn test_run_missing_a_core_count_keeps_study_exponents() {
    let dir = study_dir();
    std::fs::remove_file(dir.path().join("data_cores8_run3.txt")).unwrap();

    let report = run_study(&study(dir.path())).unwrap();
    let metric = "Piro NOX Solve";
    let whole = report.series_for(metric).unwrap();
    let run3 = report
        .run_series_for(metric)
        .find(|r| r.run_index == 3)
        .unwrap();

    assert_eq!(run3.series.skipped, vec![8]);
    for cores in [16, 32] {
        let p = run3.series.point(cores).unwrap();
        assert_eq!(p.rank, whole.point(cores).unwrap().rank);
        assert!((p.ideal - run3.series.base / p.ideal_speedup).abs() < 1e-12);
    }
    assert_eq!(run3.series.point(32).unwrap().ideal_speedup, 8.0);
}

#[test]
fn test_metric_parse_fault_carries_context() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "data_cores4.txt", "time: 1.0\n");
    write(dir.path(), "data_cores8.txt", "time: oops\n");

    let metrics = MetricSet::from_pairs([("time", r"time: (\S+)")]).unwrap();
    let report = run_study(&StudyConfig::new(dir.path(), metrics)).unwrap();
    assert_eq!(report.faults.len(), 1);
    let message = report.faults[0].to_string();
    assert!(message.contains("data_cores8.txt"));
    assert!(message.contains("cores=8"));
    assert!(message.contains("run=1"));
    assert!(message.contains("'time'"));

    let series = report.series_for("time").unwrap();
    assert_eq!(series.skipped, vec![8]);
}

#[test]
fn test_json_report_round_trip() {
    let dir = study_dir();
    let report = run_study(&study(dir.path())).unwrap();
    let json = generate_json_report(&report).unwrap();
    let parsed: Report = parse_json_report(&json).unwrap();
    assert_eq!(parsed.files, report.files);
    assert_eq!(parsed.aggregates.len(), report.aggregates.len());
    assert_eq!(parsed.series.len(), report.series.len());
    for (a, b) in parsed.series.iter().zip(&report.series) {
        assert_eq!(a.metric, b.metric);
        for (p, q) in a.points.iter().zip(&b.points) {
            assert_eq!(p.core_count, q.core_count);
            assert!((p.efficiency - q.efficiency).abs() < 1e-9);
        }
    }

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["wide"]["rows"][0]["coreCount"], 4);
    assert_eq!(value["aggregates"][0]["cells"]["Piro NOX Solve"]["status"], "defined");
}

#[test]
fn test_csv_table_emitter() {
    let dir = study_dir();
    let out = tempfile::tempdir().unwrap();
    let report = run_study(&study(dir.path())).unwrap();

    let mut emitter = CsvTableEmitter::new(out.path().join("tables"));
    emitter.emit(&report).unwrap();

    let names: Vec<String> = emitter
        .written()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"runs.csv".to_string()));
    assert!(names.contains(&"long.csv".to_string()));
    assert!(names.contains(&"aggregate.csv".to_string()));
    assert!(names.contains(&"scaling_piro_nox_solve.csv".to_string()));
    assert!(names.contains(&"scaling_piro_nox_solve_runs.csv".to_string()));

    let runs = std::fs::read_to_string(out.path().join("tables/runs.csv")).unwrap();
    let header = runs.lines().next().unwrap();
    assert_eq!(
        header,
        "coreCount,runIndex,Piro NOX Solve,Total Fill Time,Preconditioner Construction,Total Linear Solve"
    );
    assert_eq!(runs.lines().count(), 21);

    let scaling =
        std::fs::read_to_string(out.path().join("tables/scaling_total_fill_time.csv")).unwrap();
    assert!(scaling.starts_with("coreCount,actual,ideal,speedup,idealSpeedup,efficiency\n4,"));
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(run_study(&study(&missing)).is_err());
}
