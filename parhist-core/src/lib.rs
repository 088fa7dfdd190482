pub mod aggregate;
pub mod binning;
pub mod coordinator;
pub mod counter;
pub mod input;
pub mod partition;
pub mod report;

pub use parhist_common::{HistError, Result};
pub use aggregate::{combine, GlobalCounts};
pub use binning::{bin_of, HistogramSpec, OutOfRange, MAX_BIN_COUNT};
pub use coordinator::{available_workers, dispatch, Coordinator, RunOptions, RunState};
pub use counter::{count_local, LocalCounts};
pub use input::{load_input, parse_input, Dataset};
pub use partition::{partition, Slice};
pub use report::{
    export_csv, export_json, format_text, parse_counts, print_summary, write_text, HistogramBin,
    HistogramReport,
};
