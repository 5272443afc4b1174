//! Report Module
//!
//! Summary reporting for a finished batch.

use crate::batch::BatchResult;
use std::time::Duration;
use tracing::{info, warn};

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Percentage saved going from `input_bytes` to `output_bytes` (negative when the output grew).
pub fn size_reduction_percent(input_bytes: u64, output_bytes: u64) -> f64 {
    if input_bytes == 0 {
        0.0
    } else {
        (1.0 - output_bytes as f64 / input_bytes as f64) * 100.0
    }
}

pub fn summary_line(result: &BatchResult, operation_name: &str) -> String {
    format!(
        "{} summary: {} processed, {} succeeded, {} failed ({:.1}% success)",
        operation_name,
        result.total,
        result.succeeded,
        result.failed,
        result.success_rate()
    )
}

pub fn log_summary_report(result: &BatchResult, duration: Duration, operation_name: &str) {
    info!("{}", summary_line(result, operation_name));
    if result.succeeded > 0 {
        info!(
            "Size: {} -> {} ({:.1}% reduction) in {:.2}s",
            format_bytes(result.input_bytes),
            format_bytes(result.output_bytes),
            size_reduction_percent(result.input_bytes, result.output_bytes),
            duration.as_secs_f64()
        );
    }

    for (path, error) in &result.errors {
        warn!("  {} -> {}", path.display(), error);
    }
}
