pub mod config;
pub use config::{Config, OutputConfig, RangeConfig, RunConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("shape mismatch: worker {worker} returned {found} bins, expected {expected}")]
    ShapeMismatch {
        worker: usize,
        expected: usize,
        found: usize,
    },
    #[error("worker {worker} failed: {reason}")]
    WorkerFailure { worker: usize, reason: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

impl HistError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HistError>;
