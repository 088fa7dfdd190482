use crate::binning::MAX_BIN_COUNT;
use memmap2::Mmap;
use parhist_common::{HistError, Result};
use std::io::Read;
use std::path::Path;

/// A loaded run input: the values in file order plus the requested bin count.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub values: Vec<f64>,
    pub bin_count: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parses the text input representation.
///
/// Tokens are whitespace separated and line breaks carry no meaning: the
/// first token is N, the second the bin count, then N values. Values past
/// the first N are ignored with a warning.
pub fn parse_input(text: &str) -> Result<Dataset> {
    let mut tokens = text.split_ascii_whitespace();

    let n_tok = tokens
        .next()
        .ok_or_else(|| HistError::invalid("missing dataset size N"))?;
    let n: i64 = n_tok
        .parse()
        .map_err(|_| HistError::invalid(format!("N is not an integer: {n_tok:?}")))?;
    if n <= 0 {
        return Err(HistError::invalid(format!("N must be at least 1, got {n}")));
    }
    let n = usize::try_from(n).map_err(|_| HistError::invalid(format!("N too large: {n}")))?;

    let bins_tok = tokens
        .next()
        .ok_or_else(|| HistError::invalid("missing bin count"))?;
    let bins: i64 = bins_tok
        .parse()
        .map_err(|_| HistError::invalid(format!("bin count is not an integer: {bins_tok:?}")))?;
    if bins < 1 {
        return Err(HistError::invalid(format!(
            "a histogram must have at least one bin, got {bins}"
        )));
    }
    let bin_count = usize::try_from(bins)
        .ok()
        .filter(|&b| b <= MAX_BIN_COUNT)
        .ok_or_else(|| {
            HistError::invalid(format!("bin count {bins} exceeds the limit of {MAX_BIN_COUNT}"))
        })?;

    // cap the up-front reservation; N comes from untrusted input
    let mut values = Vec::with_capacity(n.min(1 << 24));
    for (i, tok) in tokens.by_ref().take(n).enumerate() {
        let v: f64 = tok.parse().map_err(|_| {
            HistError::invalid(format!("value #{} is not a number: {tok:?}", i + 1))
        })?;
        if !v.is_finite() {
            return Err(HistError::invalid(format!("value #{} is not finite: {tok:?}", i + 1)));
        }
        values.push(v);
    }
    if values.len() < n {
        return Err(HistError::invalid(format!(
            "expected {n} values, found {}",
            values.len()
        )));
    }
    let extra = tokens.count();
    if extra > 0 {
        tracing::warn!(extra, n, "ignoring values past the declared dataset size");
    }
    Ok(Dataset { values, bin_count })
}

/// Loads input from a file (memory-mapped) or from stdin when `path` is `-`.
pub fn load_input(path: &Path) -> Result<Dataset> {
    if path.as_os_str() == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        return parse_bytes(&bytes, "stdin");
    }
    let file = std::fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(HistError::invalid(format!("{} is empty", path.display())));
    }
    let mmap: Mmap = unsafe { Mmap::map(&file)? };
    tracing::debug!(path = %path.display(), bytes = mmap.len(), "input mapped");
    parse_bytes(&mmap, &path.display().to_string())
}

fn parse_bytes(bytes: &[u8], origin: &str) -> Result<Dataset> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| HistError::invalid(format!("{origin} is not UTF-8: {e}")))?;
    parse_input(text)
}
