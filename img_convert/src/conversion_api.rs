//! Conversion API Module
//!
//! Decode one source image, adapt it to the target format and write it to
//! the resolved destination.
//!
//! `convert` returns the destination path or a structured `ConvertError`.
//! `convert_image_to_format` is the operator-facing boundary: it never
//! fails, every error becomes a `ConversionResult` with `success == false`.

use crate::adapt::{adapt_for_jpeg, pixel_mode};
use crate::formats::{TargetFormat, TargetSpec};
use crate::frames::{animation_frame_hint, collect_frames, load_source, SourceImage};
use crate::{ConvertError, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::Frame;
use shared_utils::logging::{log_operation_end, log_operation_start};
use shared_utils::{determine_output_path, paths_identical, ConversionResult};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_QUALITY: u8 = 95;

/// NeuQuant sampling factor for GIF palettes: 1 is slowest/best, 30 fastest.
const GIF_QUANTIZE_SPEED: i32 = 10;

#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input: PathBuf,
    pub target: TargetSpec,
    /// Explicit destination; derived from `input` and the target extension when unset.
    pub output: Option<PathBuf>,
    /// 1..=100, only read by the JPEG encoder.
    pub quality: u8,
}

impl ConvertRequest {
    pub fn new(input: impl Into<PathBuf>, target: TargetSpec) -> Self {
        Self {
            input: input.into(),
            target,
            output: None,
            quality: DEFAULT_QUALITY,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn destination(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| determine_output_path(&self.input, self.target.extension, None))
    }
}

/// Converts `request.input` into `request.target`.
///
/// The source is never modified. A destination that resolves to the source
/// file itself is refused. Nothing is written unless encoding succeeded.
pub fn convert(request: &ConvertRequest) -> Result<PathBuf> {
    if !(1..=100).contains(&request.quality) {
        return Err(ConvertError::InvalidQuality(u32::from(request.quality)));
    }

    let source = load_source(&request.input)?;
    let output = request.destination();

    if paths_identical(&request.input, &output) {
        return Err(ConvertError::write(
            &output,
            "destination is the source file; pass a different output path",
        ));
    }

    let format = request.target.format;
    let encoded = encode(&request.input, source, format, request.quality)?;
    write_atomically(&output, &encoded)?;

    info!(
        input = %request.input.display(),
        output = %output.display(),
        format = format.name(),
        bytes = encoded.len(),
        "Image converted"
    );
    Ok(output)
}

fn encode_error(format: TargetFormat, source: image::ImageError) -> ConvertError {
    ConvertError::Encode {
        format: format.name().to_string(),
        source,
    }
}

fn encode(input: &Path, source: SourceImage, format: TargetFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    match format {
        TargetFormat::Jpeg => {
            let image = adapt_for_jpeg(source.image)?;
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            image
                .write_with_encoder(encoder)
                .map_err(|e| encode_error(format, e))?;
        }
        TargetFormat::Gif => {
            let frames = collect_frames(input, &source)?;
            encode_gif(frames, &mut buf)?;
        }
        TargetFormat::Png | TargetFormat::Tiff | TargetFormat::Bmp | TargetFormat::WebP => {
            let frame_count = animation_frame_hint(input, source.format);
            if frame_count > 1 {
                warn!(
                    input = %input.display(),
                    frames = frame_count,
                    target = format.name(),
                    "Animated source: only the first frame is kept"
                );
            }
            debug!(mode = pixel_mode(source.image.color()), target = format.name(), "Encoding");
            source
                .image
                .write_to(&mut Cursor::new(&mut buf), format.image_format())
                .map_err(|e| encode_error(format, e))?;
        }
    }

    Ok(buf)
}

/// One frame: static GIF. More: animated GIF, frames in source order with
/// their delays, looping forever.
fn encode_gif(frames: Vec<Frame>, buf: &mut Vec<u8>) -> Result<()> {
    let frame_count = frames.len();
    let mut encoder = GifEncoder::new_with_speed(buf, GIF_QUANTIZE_SPEED);

    if frame_count > 1 {
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| encode_error(TargetFormat::Gif, e))?;
        encoder
            .encode_frames(frames)
            .map_err(|e| encode_error(TargetFormat::Gif, e))?;
    } else if let Some(frame) = frames.into_iter().next() {
        encoder
            .encode_frame(frame)
            .map_err(|e| encode_error(TargetFormat::Gif, e))?;
    }

    debug!(frames = frame_count, animated = frame_count > 1, "Encoded GIF");
    Ok(())
}

/// Writes to a temporary sibling and renames it over `output`, so a failed
/// write never leaves a partial destination behind.
fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let parent = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".img-convert-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| ConvertError::write(output, e))?;

    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| ConvertError::write(output, e))?;

    let permissions = fs::metadata(output)
        .map(|m| m.permissions())
        .ok()
        .or_else(default_permissions);
    if let Some(permissions) = permissions {
        if let Err(e) = tmp.as_file().set_permissions(permissions) {
            debug!(error = %e, "Could not set destination permissions");
        }
    }

    tmp.persist(output)
        .map_err(|e| ConvertError::write(output, e.error))?;
    Ok(())
}

// temp files are created 0600
#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Boundary form of [`convert`] taking the raw identifier the operator chose.
pub fn convert_image_to_format(
    input: &Path,
    target: &str,
    output: Option<&Path>,
    quality: u8,
) -> ConversionResult {
    match TargetSpec::parse(target) {
        Ok(spec) => convert_with_spec(input, spec, output, quality),
        Err(e) => {
            warn!(input = %input.display(), target = target, error = %e, "Rejected target format");
            ConversionResult::failed(input, target.trim(), &e)
        }
    }
}

pub fn convert_with_spec(
    input: &Path,
    target: TargetSpec,
    output: Option<&Path>,
    quality: u8,
) -> ConversionResult {
    let mut request = ConvertRequest::new(input, target).with_quality(quality);
    if let Some(output) = output {
        request = request.with_output(output);
    }

    log_operation_start("convert", input, target.identifier);
    let start = Instant::now();
    let result = convert(&request);
    log_operation_end("convert", start.elapsed(), result.is_ok());

    match result {
        Ok(destination) => {
            ConversionResult::converted(input, &destination, target.identifier, target.format.name())
        }
        Err(e) => {
            warn!(input = %input.display(), target = target.identifier, error = %e, kind = %e.kind(), "Conversion failed");
            ConversionResult::failed(input, target.identifier, &e)
        }
    }
}
