//! Target format table and identifier parsing

use crate::{ConvertError, Result};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The six formats the converter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetFormat {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Bmp,
    WebP,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 6] = [
        TargetFormat::Jpeg,
        TargetFormat::Png,
        TargetFormat::Gif,
        TargetFormat::Tiff,
        TargetFormat::Bmp,
        TargetFormat::WebP,
    ];

    /// Encoder name, as shown in messages.
    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Png => "PNG",
            TargetFormat::Gif => "GIF",
            TargetFormat::Tiff => "TIFF",
            TargetFormat::Bmp => "BMP",
            TargetFormat::WebP => "WEBP",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Gif => ImageFormat::Gif,
            TargetFormat::Tiff => ImageFormat::Tiff,
            TargetFormat::Bmp => ImageFormat::Bmp,
            TargetFormat::WebP => ImageFormat::WebP,
        }
    }

    /// Only JPEG takes the quality parameter.
    pub fn is_lossy(self) -> bool {
        matches!(self, TargetFormat::Jpeg)
    }

    /// Table entry used when the format is requested by its own name.
    pub fn canonical_spec(self) -> TargetSpec {
        FORMAT_TABLE
            .iter()
            .copied()
            .find(|spec| spec.format == self && spec.identifier == self.name())
            .unwrap_or(TargetSpec {
                format: self,
                identifier: self.name(),
                extension: "",
            })
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed target identifier: which encoder to use and which extension the
/// derived destination gets. "JPG" and "JPEG" share an encoder and both map
/// to `.jpg`; "TIF" and "TIFF" share an encoder but keep their own extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetSpec {
    pub format: TargetFormat,
    pub identifier: &'static str,
    /// Without the leading dot.
    pub extension: &'static str,
}

static FORMAT_TABLE: [TargetSpec; 8] = [
    TargetSpec { format: TargetFormat::Jpeg, identifier: "JPG", extension: "jpg" },
    TargetSpec { format: TargetFormat::Jpeg, identifier: "JPEG", extension: "jpg" },
    TargetSpec { format: TargetFormat::Png, identifier: "PNG", extension: "png" },
    TargetSpec { format: TargetFormat::Gif, identifier: "GIF", extension: "gif" },
    TargetSpec { format: TargetFormat::Tiff, identifier: "TIFF", extension: "tiff" },
    TargetSpec { format: TargetFormat::Tiff, identifier: "TIF", extension: "tif" },
    TargetSpec { format: TargetFormat::Bmp, identifier: "BMP", extension: "bmp" },
    TargetSpec { format: TargetFormat::WebP, identifier: "WEBP", extension: "webp" },
];

impl TargetSpec {
    pub fn all() -> &'static [TargetSpec] {
        &FORMAT_TABLE
    }

    /// Case-insensitive lookup; surrounding whitespace and a leading dot are
    /// ignored so ".png" and " Png " both resolve.
    pub fn parse(identifier: &str) -> Result<Self> {
        let wanted = identifier.trim().trim_start_matches('.');
        FORMAT_TABLE
            .iter()
            .copied()
            .find(|spec| spec.identifier.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConvertError::UnsupportedFormat(identifier.trim().to_string()))
    }

    pub fn dotted_extension(&self) -> String {
        format!(".{}", self.extension)
    }
}

impl FromStr for TargetSpec {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        TargetSpec::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier)
    }
}

/// Pre-check run by front-ends before invoking the converter: a source whose
/// extension already equals the target's canonical extension is skipped.
/// `photo.jpeg` with target JPG still converts, `.jpeg` is not `.jpg`.
pub fn needs_conversion(input: &Path, target: &TargetSpec) -> bool {
    let source_ext = input
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    source_ext != target.extension
}

/// `value_parser` for clap.
pub fn parse_target(s: &str) -> std::result::Result<TargetSpec, String> {
    TargetSpec::parse(s).map_err(|e| {
        let known: Vec<&str> = FORMAT_TABLE.iter().map(|spec| spec.identifier).collect();
        format!("{} (expected one of: {})", e, known.join(", "))
    })
}
