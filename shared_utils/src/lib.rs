//! Shared Utilities for png2webp
//!
//! - Logging setup (file + console)
//! - Error taxonomy for per-file conversions
//! - Batch file collection and result tally
//! - Summary reporting
//! - File attribute preservation (timestamps, mode, xattrs)

pub mod batch;
pub mod common_utils;
pub mod img_errors;
pub mod logging;
pub mod metadata;
pub mod report;

pub use batch::*;
pub use img_errors::{ConvertError, Result};
pub use metadata::copy_file_attributes;
pub use report::*;
