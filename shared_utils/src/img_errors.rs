//! Shared Image Conversion Error Types
//!
//! One enum for every way a conversion can fail. The conversion boundary
//! collapses these into a failed `ConversionResult`; callers that want the
//! structured form use `ConvertError::kind()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Image format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Quality must be between 1 and 100, got {0}")]
    InvalidQuality(u32),

    #[error("Failed to read image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot adapt {mode} pixels for {format}: {reason}")]
    Adaptation {
        format: String,
        mode: String,
        reason: String,
    },

    #[error("{format} encoder rejected the image: {source}")]
    Encode {
        format: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Coarse classification of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    InvalidQuality,
    Decode,
    Adaptation,
    Encode,
    Write,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ConvertError::InvalidQuality(_) => ErrorKind::InvalidQuality,
            ConvertError::Decode { .. } => ErrorKind::Decode,
            ConvertError::Adaptation { .. } => ErrorKind::Adaptation,
            ConvertError::Encode { .. } => ErrorKind::Encode,
            ConvertError::Write { .. } => ErrorKind::Write,
        }
    }

    pub fn write(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        ConvertError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::UnsupportedFormat => "unsupported format",
            ErrorKind::InvalidQuality => "invalid quality",
            ErrorKind::Decode => "decode error",
            ErrorKind::Adaptation => "adaptation error",
            ErrorKind::Encode => "encode error",
            ErrorKind::Write => "write error",
        };
        f.write_str(label)
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ConvertError::UnsupportedFormat("XCF".into()).kind(),
            ErrorKind::UnsupportedFormat
        );
        assert_eq!(ConvertError::InvalidQuality(0).kind(), ErrorKind::InvalidQuality);
        assert_eq!(
            ConvertError::write("/tmp/out.png", "disk full").kind(),
            ErrorKind::Write
        );

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConvertError::write("/tmp/out.png", io);
        assert_eq!(err.kind(), ErrorKind::Write);
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_messages_carry_context() {
        let err = ConvertError::write("/tmp/out.png", "disk full");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out.png"), "missing path: {}", msg);
        assert!(msg.contains("disk full"), "missing reason: {}", msg);

        let err = ConvertError::Adaptation {
            format: "JPEG".into(),
            mode: "Rgba32F".into(),
            reason: "no 8-bit equivalent".into(),
        };
        assert!(err.to_string().contains("JPEG"));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UnsupportedFormat).unwrap();
        assert_eq!(json, "\"unsupported_format\"");
    }
}
