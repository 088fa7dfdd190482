use crate::aggregate::GlobalCounts;
use crate::binning::HistogramSpec;
use parhist_common::{HistError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBin {
    pub index: usize,
    pub range_start: f64,
    pub range_end: f64,
    pub count: u64,
}

/// Terminal artifact of a run: the global counts with their bin edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramReport {
    pub spec: HistogramSpec,
    pub workers: usize,
    pub total: u64,
    pub bins: Vec<HistogramBin>,
}

impl HistogramReport {
    pub fn new(spec: HistogramSpec, global: &GlobalCounts, workers: usize) -> Self {
        let bins = global
            .counts
            .iter()
            .enumerate()
            .map(|(index, &count)| {
                let (range_start, range_end) = spec.bounds(index);
                HistogramBin { index, range_start, range_end, count }
            })
            .collect();
        Self { spec, workers, total: global.total(), bins }
    }

    pub fn counts(&self) -> Vec<u64> {
        self.bins.iter().map(|b| b.count).collect()
    }
}

/// One line per bin, `[lo, hi) : count`; the last bin is closed, `[lo, hi]`.
pub fn format_text(report: &HistogramReport, precision: usize) -> String {
    let mut out = String::new();
    let last = report.bins.len().saturating_sub(1);
    for bin in &report.bins {
        let close = if bin.index == last { ']' } else { ')' };
        let _ = writeln!(
            out,
            "[{:.p$}, {:.p$}{close} : {}",
            bin.range_start,
            bin.range_end,
            bin.count,
            p = precision
        );
    }
    out
}

pub fn write_text<W: Write>(w: &mut W, report: &HistogramReport, precision: usize) -> Result<()> {
    w.write_all(format_text(report, precision).as_bytes())?;
    Ok(())
}

/// Reads back the count after the final colon of every non-empty line.
pub fn parse_counts(text: &str) -> Result<Vec<u64>> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let (_, tail) = line
                .rsplit_once(':')
                .ok_or_else(|| HistError::invalid(format!("no count in line {line:?}")))?;
            tail.trim()
                .parse()
                .map_err(|_| HistError::invalid(format!("bad count in line {line:?}")))
        })
        .collect()
}

pub fn export_json(output_path: &Path, report: &HistogramReport) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, report).map_err(|e| HistError::Other(e.to_string()))?;
    writeln!(file)?;
    Ok(())
}

pub fn export_csv(output_path: &Path, report: &HistogramReport) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    writeln!(file, "bin,range_start,range_end,count")?;
    for bin in &report.bins {
        writeln!(file, "{},{},{},{}", bin.index, bin.range_start, bin.range_end, bin.count)?;
    }
    Ok(())
}

pub fn print_summary(report: &HistogramReport) {
    eprintln!("{:<10} {}", "Values:", report.total);
    eprintln!("{:<10} {}", "Bins:", report.spec.bin_count);
    eprintln!("{:<10} {}", "Workers:", report.workers);
    eprintln!("{:<10} [{}, {}]", "Range:", report.spec.range_min, report.spec.range_max);
}
