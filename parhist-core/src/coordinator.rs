use crate::aggregate::combine;
use crate::binning::HistogramSpec;
use crate::binning::OutOfRange;
use crate::counter::{count_local, LocalCounts};
use crate::input::{load_input, Dataset};
use crate::partition::{partition, Slice};
use crate::report::HistogramReport;
use parhist_common::{HistError, Result};
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Dispatching,
    Awaiting { outstanding: usize },
    Aggregating,
    Reporting,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Number of logical workers, i.e. dataset slices.
    pub workers: usize,
    /// Cap on OS threads backing the workers. `None` uses the machine's
    /// available parallelism.
    pub threads: Option<usize>,
    /// Fixed histogram range. `None` derives it from the data.
    pub range: Option<(f64, f64)>,
}

impl RunOptions {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers, threads: None, range: None }
    }
}

pub fn available_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Drives one batch run: load, dispatch, wait for every worker, combine,
/// report. A run either yields a full report or an error; nothing partial.
pub struct Coordinator {
    opts: RunOptions,
    state: RunState,
    history: Vec<RunState>,
}

impl Coordinator {
    pub fn new(opts: RunOptions) -> Result<Self> {
        if opts.workers == 0 {
            return Err(HistError::invalid("worker count must be at least 1"));
        }
        if opts.threads == Some(0) {
            return Err(HistError::invalid("thread count must be at least 1"));
        }
        Ok(Self { opts, state: RunState::Idle, history: vec![RunState::Idle] })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    fn enter(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "coordinator state");
        self.state = next;
        self.history.push(next);
    }

    pub fn run_path(&mut self, path: &Path) -> Result<HistogramReport> {
        self.enter(RunState::Loading);
        let dataset = load_input(path)?;
        tracing::info!(n = dataset.len(), bins = dataset.bin_count, "input loaded");
        self.execute(&dataset)
    }

    /// Runs on an already loaded dataset.
    pub fn run(&mut self, dataset: &Dataset) -> Result<HistogramReport> {
        self.enter(RunState::Loading);
        if dataset.is_empty() {
            return Err(HistError::invalid("dataset is empty"));
        }
        if dataset.bin_count == 0 {
            return Err(HistError::invalid("a histogram must have at least one bin"));
        }
        self.execute(dataset)
    }

    fn execute(&mut self, dataset: &Dataset) -> Result<HistogramReport> {
        self.enter(RunState::Dispatching);
        let spec = match self.opts.range {
            Some((lo, hi)) => HistogramSpec::new(dataset.bin_count, lo, hi)?,
            None => HistogramSpec::from_data(&dataset.values, dataset.bin_count)?,
        };
        let slices = partition(dataset.len(), self.opts.workers)?;
        let threads = self
            .opts
            .threads
            .unwrap_or_else(available_workers)
            .min(self.opts.workers)
            .max(1);
        tracing::info!(
            workers = slices.len(),
            threads,
            range_min = spec.range_min,
            range_max = spec.range_max,
            "dispatching"
        );

        self.enter(RunState::Awaiting { outstanding: slices.len() });
        let locals = dispatch(&dataset.values, &spec, &slices, threads)?;

        self.enter(RunState::Aggregating);
        let global = combine(&locals, spec.bin_count)?;
        let expected = dataset.len() as u64;
        if global.total() != expected {
            return Err(HistError::Other(format!(
                "counted {} values, dataset holds {expected}",
                global.total()
            )));
        }

        self.enter(RunState::Reporting);
        let report = HistogramReport::new(spec, &global, slices.len());
        self.enter(RunState::Done);
        Ok(report)
    }
}

/// Counts every slice on a dedicated pool of `threads` threads and returns
/// once all workers are back. The first failed worker, in worker order,
/// fails the whole batch.
pub fn dispatch(
    values: &[f64],
    spec: &HistogramSpec,
    slices: &[Slice],
    threads: usize,
) -> Result<Vec<LocalCounts>> {
    dispatch_with(values, spec, slices, threads, count_local)
}

fn dispatch_with<F>(
    values: &[f64],
    spec: &HistogramSpec,
    slices: &[Slice],
    threads: usize,
    count: F,
) -> Result<Vec<LocalCounts>>
where
    F: Fn(usize, &[f64], &HistogramSpec) -> std::result::Result<LocalCounts, OutOfRange> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("parhist-worker-{i}"))
        .build()
        .map_err(|e| HistError::Other(format!("cannot start worker pool: {e}")))?;

    let results: Vec<Result<LocalCounts>> = pool.install(|| {
        slices
            .par_iter()
            .map(|slice| run_worker(slice, values, spec, &count))
            .collect()
    });

    // barrier: nothing is combined until every worker has reported
    results.into_iter().collect()
}

fn run_worker<F>(slice: &Slice, values: &[f64], spec: &HistogramSpec, count: &F) -> Result<LocalCounts>
where
    F: Fn(usize, &[f64], &HistogramSpec) -> std::result::Result<LocalCounts, OutOfRange>,
{
    let worker = slice.worker;
    let chunk = values.get(slice.range()).ok_or_else(|| HistError::WorkerFailure {
        worker,
        reason: format!("slice {:?} outside dataset of {}", slice.range(), values.len()),
    })?;
    match catch_unwind(AssertUnwindSafe(|| count(worker, chunk, spec))) {
        Ok(Ok(local)) => {
            tracing::trace!(worker, len = chunk.len(), "worker done");
            Ok(local)
        }
        Ok(Err(e)) => Err(HistError::WorkerFailure { worker, reason: e.to_string() }),
        Err(_) => Err(HistError::WorkerFailure { worker, reason: "worker panicked".into() }),
    }
}
