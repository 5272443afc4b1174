//! png2webp
//!
//! Batch PNG → WebP conversion that carries generation metadata (prompt,
//! workflow and other PNG text chunks) over as EXIF tags and keeps the
//! original file timestamps.

pub mod canonical_json;
pub mod conversion_api;
pub mod disposal;
pub mod driver;
pub mod exif_tags;
pub mod source;
pub mod webp_container;

#[cfg(test)]
mod test_fixtures;

pub use conversion_api::{convert, ConversionOutput, ConversionRequest, ConversionSettings};
pub use disposal::{Disposer, MissingTrashPolicy};
pub use driver::{collect_png_files, process_file, run_batch};
pub use exif_tags::{MetadataMap, TagOrder, EXTRA_METADATA_TAG, PROMPT_TAG};
pub use shared_utils::{BatchResult, ConvertError, Result};
