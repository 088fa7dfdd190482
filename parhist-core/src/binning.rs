use parhist_common::{HistError, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned by [`bin_of`] for values that cannot be placed in any bin.
///
/// Finite values outside the range are clamped into the edge bins, so only
/// NaN ends up here.
/// Largest bin count a run accepts. Every worker allocates one counter per bin.
pub const MAX_BIN_COUNT: usize = 1 << 20;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("value {value} cannot be mapped to a bin")]
pub struct OutOfRange {
    pub value: f64,
}

/// Maps `value` onto `[0, bin_count)`.
///
/// Bins are equal-width over `[range_min, range_max]`. Both ends are closed:
/// `range_min` lands in bin 0 and `range_max` in the last bin. Values outside
/// the range are clamped into the nearest edge bin so every input is counted
/// exactly once.
pub fn bin_of(
    value: f64,
    range_min: f64,
    range_max: f64,
    bin_count: usize,
) -> std::result::Result<usize, OutOfRange> {
    if value.is_nan() {
        return Err(OutOfRange { value });
    }
    if bin_count <= 1 || range_max <= range_min {
        return Ok(0);
    }
    if value <= range_min {
        return Ok(0);
    }
    if value >= range_max {
        return Ok(bin_count - 1);
    }
    let bins = bin_count as f64;
    let span = range_max - range_min;
    let pos = if span.is_finite() {
        (value - range_min) / (span / bins)
    } else {
        // span overflows f64; halving both ends keeps every term finite
        (value * 0.5 - range_min * 0.5) / (range_max * 0.5 - range_min * 0.5) * bins
    };
    Ok((pos.floor() as usize).min(bin_count - 1))
}

fn check_bin_count(bin_count: usize) -> Result<()> {
    if bin_count == 0 {
        return Err(HistError::invalid("a histogram must have at least one bin"));
    }
    if bin_count > MAX_BIN_COUNT {
        return Err(HistError::invalid(format!(
            "bin count {bin_count} exceeds the limit of {MAX_BIN_COUNT}"
        )));
    }
    Ok(())
}

/// Bin layout shared by every worker of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub bin_count: usize,
    pub range_min: f64,
    pub range_max: f64,
}

impl HistogramSpec {
    /// Fixed range. Requires finite bounds with `range_min < range_max`.
    pub fn new(bin_count: usize, range_min: f64, range_max: f64) -> Result<Self> {
        check_bin_count(bin_count)?;
        if !range_min.is_finite() || !range_max.is_finite() {
            return Err(HistError::invalid(format!(
                "range bounds must be finite, got [{range_min}, {range_max}]"
            )));
        }
        if range_min >= range_max {
            return Err(HistError::invalid(format!(
                "range_min must be below range_max, got [{range_min}, {range_max}]"
            )));
        }
        Self { bin_count, range_min, range_max }.checked()
    }

    /// Range taken from the observed extrema of `values`.
    ///
    /// A constant dataset yields a degenerate spec (`range_min == range_max`)
    /// which puts everything in bin 0.
    pub fn from_data(values: &[f64], bin_count: usize) -> Result<Self> {
        check_bin_count(bin_count)?;
        if values.is_empty() {
            return Err(HistError::invalid("cannot derive a range from an empty dataset"));
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return Err(HistError::invalid("dataset extrema are not finite"));
        }
        Self { bin_count, range_min: min, range_max: max }.checked()
    }

    fn checked(self) -> Result<Self> {
        let width = self.width();
        if !width.is_finite() {
            return Err(HistError::invalid(format!(
                "bin width over [{}, {}] is not finite",
                self.range_min, self.range_max
            )));
        }
        Ok(self)
    }

    pub fn is_degenerate(&self) -> bool {
        self.range_max <= self.range_min
    }

    pub fn width(&self) -> f64 {
        let bins = self.bin_count as f64;
        let span = self.range_max - self.range_min;
        if span.is_finite() {
            span / bins
        } else {
            self.range_max / bins - self.range_min / bins
        }
    }

    pub fn bin_of(&self, value: f64) -> std::result::Result<usize, OutOfRange> {
        bin_of(value, self.range_min, self.range_max, self.bin_count)
    }

    /// Lower and upper edge of bin `index`. The outer edges are pinned to
    /// `range_min` and `range_max` to avoid rounding drift.
    pub fn bounds(&self, index: usize) -> (f64, f64) {
        let lo = if index == 0 { self.range_min } else { self.edge(index) };
        let hi = if index + 1 >= self.bin_count {
            self.range_max
        } else {
            self.edge(index + 1)
        };
        (lo, hi)
    }

    fn edge(&self, index: usize) -> f64 {
        if (self.range_max - self.range_min).is_finite() {
            return self.range_min + self.width() * index as f64;
        }
        // interpolate so no intermediate term exceeds the magnitude of the bounds
        let t = index as f64 / self.bin_count as f64;
        self.range_min * (1.0 - t) + self.range_max * t
    }
}
