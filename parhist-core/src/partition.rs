use parhist_common::{HistError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Contiguous share of the dataset assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub worker: usize,
    pub start: usize,
    pub len: usize,
}

impl Slice {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Splits `[0, n)` into `workers` contiguous slices, in worker order.
///
/// Every worker gets `n / workers` elements and the first `n % workers` get
/// one extra, so lengths differ by at most one. With more workers than
/// elements the trailing slices are empty.
pub fn partition(n: usize, workers: usize) -> Result<Vec<Slice>> {
    if workers == 0 {
        return Err(HistError::invalid("worker count must be at least 1"));
    }
    let base = n / workers;
    let extra = n % workers;
    let mut slices = Vec::with_capacity(workers);
    let mut start = 0;
    for worker in 0..workers {
        let len = base + usize::from(worker < extra);
        slices.push(Slice { worker, start, len });
        start += len;
    }
    debug_assert_eq!(start, n);
    Ok(slices)
}
