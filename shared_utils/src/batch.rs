//! Batch Processing Module
//!
//! File collection for a directory walk and the per-run tally of outcomes.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect regular files whose *file name* ends with `suffix`.
///
/// The match is a literal, case-sensitive suffix match (`photo.PNG` does not
/// match `.png`). Unreadable entries are skipped. Results are sorted by path
/// so a run over the same tree always visits files in the same order.
pub fn collect_files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| name.ends_with(suffix))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, input_bytes: u64, output_bytes: u64) {
        self.total += 1;
        self.succeeded += 1;
        self.input_bytes += input_bytes;
        self.output_bytes += output_bytes;
    }

    pub fn fail(&mut self, path: PathBuf, error: String) {
        self.total += 1;
        self.failed += 1;
        self.errors.push((path, error));
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}
