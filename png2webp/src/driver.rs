//! Batch driver: walk a directory tree and convert every PNG in it.

use crate::conversion_api::{convert, ConversionOutput, ConversionRequest, ConversionSettings};
use crate::disposal::Disposer;
use shared_utils::{
    collect_files_with_suffix, copy_file_attributes, log_summary_report, BatchResult,
    ConvertError, Result,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

const SEPARATOR_WIDTH: usize = 50;

/// Every `*.png` under `root`, sorted by path.
pub fn collect_png_files(root: &Path) -> Vec<PathBuf> {
    collect_files_with_suffix(root, ".png")
}

/// Convert one file, then restore its timestamps onto the output and hand the
/// original to `disposer` as the settings ask.
pub fn process_file(request: &ConversionRequest, disposer: &mut Disposer) -> Result<ConversionOutput> {
    let output = convert(request)?;

    if !request.settings.use_current_date {
        copy_file_attributes(&output.input_path, &output.output_path)
            .map_err(|e| ConvertError::filesystem(&output.output_path, e))?;
    }

    if request.settings.delete_after {
        disposer.dispose(&output.input_path)?;
    }

    Ok(output)
}

/// Convert every PNG under `root`.
///
/// Per-file failures are logged and tallied and the walk carries on. Only a
/// missing root ends the run with an error.
pub fn run_batch(
    root: &Path,
    settings: &ConversionSettings,
    disposer: &mut Disposer,
) -> Result<BatchResult> {
    if !root.exists() {
        return Err(ConvertError::NotFound(root.to_path_buf()));
    }

    let start = Instant::now();
    info!("Starting PNG to WebP conversion process");
    info!("{}", "-".repeat(SEPARATOR_WIDTH));

    let files = collect_png_files(root);
    info!("Found {} PNG files under {}", files.len(), root.display());

    let mut result = BatchResult::new();
    for path in files {
        let request = ConversionRequest::new(&path).with_settings(*settings);
        match process_file(&request, disposer) {
            Ok(output) => result.success(output.input_size, output.output_size),
            Err(e) => {
                error!("Error converting {}: {}", path.display(), e);
                result.fail(path, e.to_string());
            }
        }
    }

    info!("Conversion process completed");
    log_summary_report(&result, start.elapsed(), "PNG to WebP");
    Ok(result)
}
