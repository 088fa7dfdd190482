use parhist_core::{
    export_csv, export_json, format_text, parse_counts, Coordinator, HistError, HistogramReport,
    RunOptions,
};
use rand::prelude::*;
use rand_distr::{Exp, Normal, Uniform};
use std::io::Write;
use tempfile::NamedTempFile;

const SEED: u64 = 42;

fn sample<D: Distribution<f64>>(n: usize, dist: D, rng: &mut StdRng) -> Vec<f64> {
    dist.sample_iter(rng).take(n).map(|x| x.clamp(0.0, 100.0)).collect()
}

fn uniform(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    sample(n, Uniform::new(0.0, 100.0), &mut rng)
}

fn normal(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    sample(n, Normal::new(50.0, 15.0).unwrap(), &mut rng)
}

fn exponential(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    sample(n, Exp::new(1.0 / 20.0).unwrap(), &mut rng)
}

fn bimodal(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = sample(n / 2, Normal::new(30.0, 10.0).unwrap(), &mut rng);
    data.extend(sample(n - n / 2, Normal::new(70.0, 10.0).unwrap(), &mut rng));
    data
}

fn write_input(n: usize, bins: usize, data: &[f64]) -> NamedTempFile {
    let mut tmp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(tmp, "{n}").unwrap();
    writeln!(tmp, "{bins}").unwrap();
    for chunk in data.chunks(10) {
        let line: Vec<String> = chunk.iter().map(|x| format!("{x:.4}")).collect();
        writeln!(tmp, "{}", line.join(" ")).unwrap();
    }
    tmp.flush().unwrap();
    tmp
}

fn run_file(tmp: &NamedTempFile, workers: usize) -> Result<HistogramReport, HistError> {
    Coordinator::new(RunOptions::with_workers(workers))?.run_path(tmp.path())
}

#[test]
fn small_uniform_four_workers() {
    let tmp = write_input(100, 6, &uniform(100, SEED));
    let report = run_file(&tmp, 4).unwrap();
    let text = format_text(&report, 4);
    assert_eq!(text.lines().count(), 6);
    assert_eq!(parse_counts(&text).unwrap().iter().sum::<u64>(), 100);
}

#[test]
fn medium_uniform_matches_single_worker() {
    let tmp = write_input(1000, 20, &uniform(1000, 7));
    let four = run_file(&tmp, 4).unwrap();
    let one = run_file(&tmp, 1).unwrap();
    assert_eq!(four.total, 1000);
    assert_eq!(four.counts(), one.counts());
}

#[test]
fn every_distribution_conserves_counts() {
    let n = 5000;
    for data in [uniform(n, SEED), normal(n, SEED), exponential(n, SEED), bimodal(n, SEED)] {
        for bins in [1, 7, 50] {
            let tmp = write_input(n, bins, &data);
            let base = run_file(&tmp, 1).unwrap();
            assert_eq!(base.total, n as u64);
            for workers in [2, 3, 4, 8, 16] {
                let r = run_file(&tmp, workers).unwrap();
                assert_eq!(r.counts(), base.counts(), "bins={bins} workers={workers}");
            }
        }
    }
}

#[test]
fn more_workers_than_values() {
    let data = [5.0, 1.0, 9.0];
    let tmp = write_input(3, 2, &data);
    let r = run_file(&tmp, 4).unwrap();
    assert_eq!(r.workers, 4);
    assert_eq!(r.counts(), vec![1, 2]);
    let r = run_file(&tmp, 10).unwrap();
    assert_eq!(r.counts(), vec![1, 2]);
}

#[test]
fn extrema_land_in_edge_bins() {
    let data = [0.0, 50.0, 100.0, 25.0, 75.0];
    let tmp = write_input(5, 4, &data);
    let r = run_file(&tmp, 2).unwrap();
    assert_eq!(r.spec.range_min, 0.0);
    assert_eq!(r.spec.range_max, 100.0);
    assert_eq!(r.counts(), vec![1, 1, 1, 2]);
}

#[test]
fn single_bin_holds_everything() {
    let tmp = write_input(250, 1, &exponential(250, 9));
    let r = run_file(&tmp, 3).unwrap();
    assert_eq!(r.counts(), vec![250]);
}

#[test]
fn constant_data_goes_to_first_bin() {
    let tmp = write_input(10, 5, &[3.25; 10]);
    let r = run_file(&tmp, 4).unwrap();
    assert_eq!(r.counts(), vec![10, 0, 0, 0, 0]);
}

#[test]
fn zero_n_is_invalid_input() {
    let tmp = write_input(0, 5, &[]);
    assert!(matches!(run_file(&tmp, 4), Err(HistError::InvalidInput(_))));
}

#[test]
fn short_input_is_invalid_input() {
    let tmp = write_input(20, 5, &uniform(10, 3));
    assert!(matches!(run_file(&tmp, 2), Err(HistError::InvalidInput(_))));
}

#[test]
fn empty_file_is_invalid_input() {
    let tmp = NamedTempFile::new().unwrap();
    assert!(matches!(run_file(&tmp, 2), Err(HistError::InvalidInput(_))));
}

#[test]
fn missing_file_is_io_error() {
    let mut c = Coordinator::new(RunOptions::with_workers(1)).unwrap();
    let err = c.run_path(std::path::Path::new("/nonexistent/parhist-input.txt")).unwrap_err();
    assert!(matches!(err, HistError::Io(_)));
}

#[test]
fn fixed_range_clamps_outliers() {
    let tmp = write_input(4, 2, &[-1.0, 10.0, 60.0, 101.0]);
    let opts = RunOptions { workers: 2, threads: None, range: Some((0.0, 100.0)) };
    let r = Coordinator::new(opts).unwrap().run_path(tmp.path()).unwrap();
    assert_eq!(r.counts(), vec![2, 2]);
}

#[test]
fn exports_write_every_bin() {
    let tmp = write_input(100, 6, &uniform(100, 5));
    let r = run_file(&tmp, 4).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("hist.json");
    export_json(&json_path, &r).unwrap();
    let back: HistogramReport =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(back.counts(), r.counts());

    let csv_path = dir.path().join("hist.csv");
    export_csv(&csv_path, &r).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 7);
    assert!(csv.starts_with("bin,range_start,range_end,count"));
}
