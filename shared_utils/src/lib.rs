//! Shared Utilities for the img-convert and word-drill tools
//!
//! - Logging initialisation (file + stderr, tracing based)
//! - Conversion error types and the operator-facing conversion outcome
//! - Output path resolution
//! - Batch collection, progress bars, summary reporting and directory
//!   safety checks

pub mod batch;
pub mod conversion;
pub mod img_errors;
pub mod logging;
pub mod progress;
pub mod report;
pub mod safety;

pub use batch::{collect_files, has_extension, BatchResult, IMAGE_EXTENSIONS};
pub use conversion::{
    determine_output_path, determine_output_path_with_base, format_size_change, paths_identical,
    ConversionResult,
};
pub use img_errors::{ConvertError, ErrorKind};
pub use progress::create_progress_bar;
pub use report::{format_bytes, format_duration, print_summary_report};
pub use safety::check_dangerous_directory;
