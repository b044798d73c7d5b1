//! Batch Processing Module
//!
//! Collects convertible files from a directory and tallies per-file outcomes.

use crate::conversion::ConversionResult;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the converter accepts as input.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "tiff", "tif", "bmp", "webp"];

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Files under `dir` whose extension is in `extensions`, sorted by path so
/// batch output is stable between runs.
pub fn collect_files(dir: &Path, extensions: &[&str], recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir).follow_links(true)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            input_bytes: 0,
            output_bytes: 0,
            errors: Vec::new(),
        }
    }

    pub fn success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn fail(&mut self, path: PathBuf, error: String) {
        self.total += 1;
        self.failed += 1;
        self.errors.push((path, error));
    }

    pub fn skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    pub fn record(&mut self, result: &ConversionResult) {
        if result.skipped {
            self.skip();
        } else if result.success {
            self.success();
            self.input_bytes += result.input_size;
            self.output_bytes += result.output_size.unwrap_or(0);
        } else {
            self.fail(PathBuf::from(&result.input_path), result.message.clone());
        }
    }

    /// Share of attempted files that converted; skipped files are not attempts.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.total - self.skipped;
        if attempted == 0 {
            100.0
        } else {
            (self.succeeded as f64 / attempted as f64) * 100.0
        }
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}
