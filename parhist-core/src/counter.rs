use crate::binning::{HistogramSpec, OutOfRange};
use serde::{Deserialize, Serialize};

/// Per-worker bin counts, produced once and handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCounts {
    pub worker: usize,
    pub counts: Vec<u64>,
}

impl LocalCounts {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Counts `slice` into `spec.bin_count` bins in a single pass.
pub fn count_local(
    worker: usize,
    slice: &[f64],
    spec: &HistogramSpec,
) -> std::result::Result<LocalCounts, OutOfRange> {
    let mut counts = vec![0u64; spec.bin_count];
    for &v in slice {
        counts[spec.bin_of(v)?] += 1;
    }
    Ok(LocalCounts { worker, counts })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(bins: usize) -> HistogramSpec {
        HistogramSpec::new(bins, 0.0, 10.0).unwrap()
    }

    #[test]
    fn counts_each_value_once() {
        let local = count_local(0, &[0.0, 1.0, 4.9, 5.0, 9.9, 10.0], &spec(2)).unwrap();
        assert_eq!(local.counts, vec![3, 3]);
        assert_eq!(local.total(), 6);
    }

    #[test]
    fn empty_slice_is_all_zero() {
        let local = count_local(3, &[], &spec(4)).unwrap();
        assert_eq!(local.worker, 3);
        assert_eq!(local.counts, vec![0, 0, 0, 0]);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let local = count_local(0, &[-5.0, 15.0], &spec(5)).unwrap();
        assert_eq!(local.counts, vec![1, 0, 0, 0, 1]);
    }

    #[test]
    fn nan_fails_the_slice() {
        let err = count_local(0, &[1.0, f64::NAN], &spec(2)).unwrap_err();
        assert!(err.value.is_nan());
    }

    #[test]
    fn length_matches_bin_count() {
        assert_eq!(count_local(0, &[1.0], &spec(7)).unwrap().counts.len(), 7);
    }
}
