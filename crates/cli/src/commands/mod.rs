//! CLI command implementations.

mod batch;
mod convert;
mod detect;
mod inspect;

pub use batch::{BatchJob, batch_convert};
pub use convert::{Destination, convert_file};
pub use detect::{detect_files, detect_path};
pub use inspect::{TableSummary, inspect_file, summarize};
