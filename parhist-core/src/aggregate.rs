use crate::counter::LocalCounts;
use parhist_common::{HistError, Result};
use serde::{Deserialize, Serialize};

/// Combined counts for the whole dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCounts {
    pub counts: Vec<u64>,
}

impl GlobalCounts {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }
}

/// Element-wise sum of every local array.
///
/// Integer addition makes the result independent of the order the workers
/// finished in. Every array is shape-checked before any summing happens.
pub fn combine(locals: &[LocalCounts], bin_count: usize) -> Result<GlobalCounts> {
    if let Some(bad) = locals.iter().find(|l| l.counts.len() != bin_count) {
        return Err(HistError::ShapeMismatch {
            worker: bad.worker,
            expected: bin_count,
            found: bad.counts.len(),
        });
    }
    let mut counts = vec![0u64; bin_count];
    for local in locals {
        for (acc, &c) in counts.iter_mut().zip(&local.counts) {
            *acc += c;
        }
    }
    Ok(GlobalCounts { counts })
}
