//! Pixel-layout adaptation ahead of encoding

use crate::formats::TargetFormat;
use crate::{ConvertError, Result};
use image::{ColorType, DynamicImage};
use tracing::debug;

/// Short channel-layout label (RGBA, LA, L16, ...).
pub fn pixel_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "L16",
        ColorType::La16 => "LA16",
        ColorType::Rgb16 => "RGB16",
        ColorType::Rgba16 => "RGBA16",
        ColorType::Rgb32F => "RGB32F",
        ColorType::Rgba32F => "RGBA32F",
        _ => "unknown",
    }
}

/// JPEG holds neither alpha nor more than 8 bits per sample. Alpha is
/// dropped (not composited); wide samples are narrowed. Palette sources
/// reach this point already expanded to RGB or RGBA by the decoder.
pub fn adapt_for_jpeg(image: DynamicImage) -> Result<DynamicImage> {
    let color = image.color();
    let adapted = match color {
        ColorType::L8 | ColorType::Rgb8 => return Ok(image),
        c if c.has_alpha() => DynamicImage::ImageRgb8(image.to_rgb8()),
        ColorType::L16 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::Rgb16 | ColorType::Rgb32F => DynamicImage::ImageRgb8(image.to_rgb8()),
        other => {
            return Err(ConvertError::Adaptation {
                format: TargetFormat::Jpeg.name().to_string(),
                mode: pixel_mode(other).to_string(),
                reason: "no 8-bit equivalent for this channel layout".to_string(),
            })
        }
    };

    debug!(
        from = pixel_mode(color),
        to = pixel_mode(adapted.color()),
        "Adapted pixel layout for JPEG"
    );
    Ok(adapted)
}
