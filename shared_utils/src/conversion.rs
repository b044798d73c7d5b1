//! Conversion Utilities Module
//!
//! Provides the pieces every conversion front-end shares:
//! - ConversionResult: the success/failure outcome shown to the operator
//! - Output path resolution: derived `<stem>.<ext>` destinations
//! - Source/destination collision detection

use crate::img_errors::{ConvertError, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    pub input_path: String,
    pub output_path: Option<String>,
    /// Identifier the operator asked for ("JPG", "TIF", ...).
    pub target: String,
    pub input_size: u64,
    pub output_size: Option<u64>,
    pub message: String,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl ConversionResult {
    pub fn converted(input: &Path, output: &Path, target: &str, encoded_as: &str) -> Self {
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        Self {
            success: true,
            input_path: input.display().to_string(),
            output_path: Some(output.display().to_string()),
            target: target.to_string(),
            input_size: file_size(input),
            output_size: fs::metadata(output).map(|m| m.len()).ok(),
            message: format!(
                "✅ {} -> {} converted successfully: {}",
                file_name,
                encoded_as,
                output.display()
            ),
            skipped: false,
            skip_reason: None,
            error_kind: None,
        }
    }

    pub fn failed(input: &Path, target: &str, error: &ConvertError) -> Self {
        Self {
            success: false,
            input_path: input.display().to_string(),
            output_path: None,
            target: target.to_string(),
            input_size: file_size(input),
            output_size: None,
            message: format!("❌ Conversion to {} failed: {}", target, error),
            skipped: false,
            skip_reason: None,
            error_kind: Some(error.kind()),
        }
    }

    /// Input path does not exist; the converter is never invoked.
    pub fn missing_input(input: &Path, target: &str) -> Self {
        Self {
            success: false,
            input_path: input.display().to_string(),
            output_path: None,
            target: target.to_string(),
            input_size: 0,
            output_size: None,
            message: format!("❌ File not found: {}", input.display()),
            skipped: false,
            skip_reason: None,
            error_kind: Some(ErrorKind::Decode),
        }
    }

    /// Source already carries the target's extension.
    pub fn skipped_same_format(input: &Path, target: &str) -> Self {
        Self {
            success: true,
            input_path: input.display().to_string(),
            output_path: None,
            target: target.to_string(),
            input_size: file_size(input),
            output_size: None,
            message: format!(
                "⚠️ {} is already {}, no conversion needed",
                input.display(),
                target.to_uppercase()
            ),
            skipped: true,
            skip_reason: Some("same_format".to_string()),
            error_kind: None,
        }
    }
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// `<dir>/<stem>.<extension>`, where `<dir>` is `output_dir` or the input's
/// own directory. Only the last extension of the input is replaced.
pub fn determine_output_path(input: &Path, extension: &str, output_dir: Option<&Path>) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    match output_dir {
        Some(dir) => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string());
            dir.join(format!("{}.{}", stem, extension))
        }
        None => input.with_extension(extension),
    }
}

/// Mirrors `input`'s position under `base_dir` into `output_dir`.
pub fn determine_output_path_with_base(
    input: &Path,
    base_dir: &Path,
    extension: &str,
    output_dir: &Path,
) -> PathBuf {
    let rel_parent = input
        .strip_prefix(base_dir)
        .unwrap_or(input)
        .parent()
        .unwrap_or(Path::new(""));

    determine_output_path(input, extension, Some(&output_dir.join(rel_parent)))
}

/// True when both paths name the same file (after canonicalisation when the
/// destination already exists).
pub fn paths_identical(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }

    let input_canonical = input.canonicalize().unwrap_or_else(|_| input.to_path_buf());
    let output_canonical = if output.exists() {
        output.canonicalize().unwrap_or_else(|_| output.to_path_buf())
    } else {
        output.to_path_buf()
    };

    input_canonical == output_canonical
}

pub fn format_size_change(input_size: u64, output_size: u64) -> String {
    if input_size == 0 {
        return "size unknown".to_string();
    }
    let reduction = 1.0 - (output_size as f64 / input_size as f64);
    let reduction_pct = reduction * 100.0;

    if reduction >= 0.0 {
        format!("size reduced {:.1}%", reduction_pct)
    } else {
        format!("size increased {:.1}%", -reduction_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_determine_output_path() {
        let input = Path::new("/path/to/image.png");
        let output = determine_output_path(input, "jpg", None);
        assert_eq!(output, Path::new("/path/to/image.jpg"));
    }

    #[test]
    fn test_determine_output_path_accepts_leading_dot() {
        let input = Path::new("/path/to/image.png");
        let output = determine_output_path(input, ".webp", None);
        assert_eq!(output, Path::new("/path/to/image.webp"));
    }

    #[test]
    fn test_determine_output_path_only_last_extension() {
        let input = Path::new("/path/to/photo.final.png");
        let output = determine_output_path(input, "tif", None);
        assert_eq!(output, Path::new("/path/to/photo.final.tif"));
    }

    #[test]
    fn test_determine_output_path_without_extension() {
        let input = Path::new("/path/to/scan");
        let output = determine_output_path(input, "bmp", None);
        assert_eq!(output, Path::new("/path/to/scan.bmp"));
    }

    #[test]
    fn test_determine_output_path_with_dir() {
        let input = Path::new("/path/to/image.png");
        let output = determine_output_path(input, "gif", Some(Path::new("/output")));
        assert_eq!(output, Path::new("/output/image.gif"));
    }

    #[test]
    fn test_determine_output_path_with_base() {
        let input = Path::new("/photos/2024/trip/a.png");
        let output = determine_output_path_with_base(
            input,
            Path::new("/photos"),
            "webp",
            Path::new("/out"),
        );
        assert_eq!(output, Path::new("/out/2024/trip/a.webp"));
    }

    #[test]
    fn test_paths_identical() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.png");
        fs::write(&file, b"x").unwrap();

        let dotted = dir.path().join(".").join("a.png");
        assert!(paths_identical(&file, &file));
        assert!(paths_identical(&file, &dotted));
        assert!(!paths_identical(&file, &dir.path().join("a.jpg")));
    }

    #[test]
    fn test_conversion_result_messages() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("photo.png");
        let output = dir.path().join("photo.jpg");
        fs::write(&input, b"png").unwrap();
        fs::write(&output, b"jpeg").unwrap();

        let ok = ConversionResult::converted(&input, &output, "JPG", "JPEG");
        assert!(ok.success);
        assert!(!ok.skipped);
        assert!(ok.message.contains("photo.jpg"));
        assert_eq!(ok.output_size, Some(4));

        let err = ConvertError::UnsupportedFormat("XCF".into());
        let failed = ConversionResult::failed(&input, "XCF", &err);
        assert!(!failed.success);
        assert!(failed.message.contains("XCF"));
        assert_eq!(failed.error_kind, Some(ErrorKind::UnsupportedFormat));

        let skipped = ConversionResult::skipped_same_format(&input, "png");
        assert!(skipped.skipped);
        assert!(skipped.message.contains("PNG"));
    }

    #[test]
    fn test_missing_input_result() {
        let result = ConversionResult::missing_input(Path::new("/nope/x.png"), "GIF");
        assert!(!result.success);
        assert!(result.message.contains("/nope/x.png"));
        assert_eq!(result.input_size, 0);
    }

    proptest! {
        #[test]
        fn prop_derived_path_keeps_dir_and_stem(
            stem in "[a-z][a-z0-9_]{0,11}",
            src_ext in "(png|jpeg|gif|bmp)",
            ext in "(jpg|tif|tiff|webp)",
        ) {
            let input = PathBuf::from("/data/in").join(format!("{}.{}", stem, src_ext));
            let output = determine_output_path(&input, ext.as_str(), None);
            prop_assert_eq!(output.parent(), input.parent());
            prop_assert_eq!(output.file_stem(), input.file_stem());
            prop_assert_eq!(output.extension().and_then(|e| e.to_str()), Some(ext.as_str()));
        }
    }

    #[test]
    fn test_format_size_change() {
        assert_eq!(format_size_change(1000, 500), "size reduced 50.0%");
        assert_eq!(format_size_change(500, 1000), "size increased 100.0%");
        assert_eq!(format_size_change(0, 10), "size unknown");
    }
}
