//! Source decoding and frame enumeration
//!
//! `load_source` decodes the first (or only) image. `collect_frames` walks
//! every frame of an animated GIF, WebP or APNG; any other source yields
//! exactly one frame built from the decoded image.

use crate::{ConvertError, Result};
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// A decoded source, plus the container format the decoder detected.
#[derive(Debug)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

impl SourceImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

fn decode_error(path: &Path, source: image::ImageError) -> ConvertError {
    ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    }
}

fn open_buffered(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| decode_error(path, image::ImageError::IoError(e)))
}

/// Decodes `path`, sniffing the format from content rather than extension.
pub fn load_source(path: &Path) -> Result<SourceImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| decode_error(path, image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_error(path, image::ImageError::IoError(e)))?;

    let format = reader.format();
    let image = reader.decode().map_err(|e| decode_error(path, e))?;

    debug!(
        path = %path.display(),
        format = ?format,
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Decoded source image"
    );

    Ok(SourceImage { image, format })
}

/// Every frame of `source`, in file order.
pub fn collect_frames(path: &Path, source: &SourceImage) -> Result<Vec<Frame>> {
    let frames = match source.format {
        Some(ImageFormat::Gif) => {
            let decoder = GifDecoder::new(open_buffered(path)?).map_err(|e| decode_error(path, e))?;
            decoder
                .into_frames()
                .collect_frames()
                .map_err(|e| decode_error(path, e))?
        }
        Some(ImageFormat::WebP) => {
            let decoder =
                WebPDecoder::new(open_buffered(path)?).map_err(|e| decode_error(path, e))?;
            if decoder.has_animation() {
                decoder
                    .into_frames()
                    .collect_frames()
                    .map_err(|e| decode_error(path, e))?
            } else {
                vec![single_frame(&source.image)]
            }
        }
        Some(ImageFormat::Png) => {
            let decoder = PngDecoder::new(open_buffered(path)?).map_err(|e| decode_error(path, e))?;
            if decoder.is_apng().map_err(|e| decode_error(path, e))? {
                decoder
                    .apng()
                    .map_err(|e| decode_error(path, e))?
                    .into_frames()
                    .collect_frames()
                    .map_err(|e| decode_error(path, e))?
            } else {
                vec![single_frame(&source.image)]
            }
        }
        _ => vec![single_frame(&source.image)],
    };

    // A decoder that reports animation but yields nothing still has the
    // decoded still image.
    if frames.is_empty() {
        return Ok(vec![single_frame(&source.image)]);
    }

    debug!(path = %path.display(), frames = frames.len(), "Enumerated source frames");
    Ok(frames)
}

fn single_frame(image: &DynamicImage) -> Frame {
    Frame::new(image.to_rgba8())
}

/// Frame count read from container headers without decoding pixels. Used to
/// warn when a conversion keeps only the first frame of an animation.
/// Returns 1 for anything that is not recognisably animated.
pub fn animation_frame_hint(path: &Path, format: Option<ImageFormat>) -> usize {
    let Ok(data) = std::fs::read(path) else {
        return 1;
    };

    let count = match format {
        Some(ImageFormat::Gif) => sniff::gif_frame_count(&data),
        Some(ImageFormat::WebP) => sniff::webp_frame_count(&data),
        Some(ImageFormat::Png) => sniff::apng_frame_count(&data),
        _ => 1,
    };
    count.max(1)
}

pub mod sniff {
    /// Counts image descriptors by walking the GIF block structure.
    pub fn gif_frame_count(data: &[u8]) -> usize {
        if data.len() < 13 || &data[0..3] != b"GIF" {
            return 0;
        }

        let packed = data[10];
        let gct_size = if packed & 0x80 != 0 {
            3 * (1 << ((packed & 0x07) + 1))
        } else {
            0
        };
        let mut pos = 13 + gct_size;

        let mut frame_count = 0;
        while pos < data.len() {
            match data[pos] {
                0x2C => {
                    frame_count += 1;
                    if pos + 10 > data.len() {
                        break;
                    }
                    let img_packed = data[pos + 9];
                    let lct_size = if img_packed & 0x80 != 0 {
                        3 * (1 << ((img_packed & 0x07) + 1))
                    } else {
                        0
                    };
                    // descriptor, local table, LZW minimum code size
                    pos += 10 + lct_size + 1;
                    pos = skip_sub_blocks(data, pos);
                }
                0x21 => {
                    pos = skip_sub_blocks(data, pos + 2);
                }
                0x3B => break,
                _ => pos += 1,
            }
        }
        frame_count
    }

    fn skip_sub_blocks(data: &[u8], mut pos: usize) -> usize {
        while pos < data.len() {
            let block_size = data[pos] as usize;
            pos += 1;
            if block_size == 0 {
                break;
            }
            pos += block_size;
        }
        pos
    }

    /// Counts `ANMF` chunks when the RIFF container carries an `ANIM` chunk.
    pub fn webp_frame_count(data: &[u8]) -> usize {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WEBP" {
            return 1;
        }

        let mut animated = false;
        let mut frames = 0;
        let mut pos = 12;
        while pos + 8 <= data.len() {
            let fourcc = &data[pos..pos + 4];
            let size = u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                as usize;
            match fourcc {
                b"ANIM" => animated = true,
                b"ANMF" => frames += 1,
                _ => {}
            }
            // payloads are padded to an even length
            pos = pos.saturating_add(8).saturating_add(size).saturating_add(size & 1);
        }

        if animated {
            frames.max(1)
        } else {
            1
        }
    }

    /// `num_frames` from an `acTL` chunk ahead of the first `IDAT`, 1 for a
    /// plain PNG.
    pub fn apng_frame_count(data: &[u8]) -> usize {
        const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
        if !data.starts_with(SIGNATURE) {
            return 1;
        }

        let mut pos = SIGNATURE.len();
        while pos + 8 <= data.len() {
            let length = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
                as usize;
            let kind = &data[pos + 4..pos + 8];
            let body = pos + 8;
            match kind {
                b"acTL" => {
                    return data
                        .get(body..body + 4)
                        .map(|n| u32::from_be_bytes([n[0], n[1], n[2], n[3]]) as usize)
                        .unwrap_or(1);
                }
                b"IDAT" | b"IEND" => break,
                _ => {}
            }
            // length, type, data, crc
            pos = body.saturating_add(length).saturating_add(4);
        }
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn solid(width: u32, height: u32, shade: u8) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([shade, 255 - shade, 64, 255]))
    }

    fn write_gif(path: &Path, shades: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(Repeat::Infinite).unwrap();
        let frames = shades.iter().map(|&s| {
            Frame::from_parts(solid(8, 8, s), 0, 0, Delay::from_numer_denom_ms(100, 1))
        });
        encoder.encode_frames(frames).unwrap();
    }

    #[test]
    fn test_load_source_missing_file() {
        let err = load_source(Path::new("/nonexistent/photo.png")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Decode);
        assert!(err.to_string().contains("/nonexistent/photo.png"));
    }

    #[test]
    fn test_load_source_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = load_source(&path).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Decode);
    }

    #[test]
    fn test_load_source_sniffs_content_not_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mislabelled.jpg");
        solid(4, 3, 10).save_with_format(&path, ImageFormat::Png).unwrap();

        let source = load_source(&path).unwrap();
        assert_eq!(source.format, Some(ImageFormat::Png));
        assert_eq!(source.dimensions(), (4, 3));
    }

    #[test]
    fn test_collect_frames_static_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("still.png");
        solid(6, 6, 1).save(&path).unwrap();

        let source = load_source(&path).unwrap();
        let frames = collect_frames(&path, &source).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].buffer().dimensions(), (6, 6));
    }

    #[test]
    fn test_collect_frames_animated_gif_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anim.gif");
        let shades = [0u8, 60, 120, 180, 240];
        write_gif(&path, &shades);

        let source = load_source(&path).unwrap();
        let frames = collect_frames(&path, &source).unwrap();
        assert_eq!(frames.len(), shades.len());

        // red channel tracks the shade; quantisation keeps the ordering
        let reds: Vec<u8> = frames.iter().map(|f| f.buffer().get_pixel(0, 0)[0]).collect();
        assert!(reds.windows(2).all(|w| w[0] < w[1]), "frames out of order: {:?}", reds);
    }

    #[test]
    fn test_animation_frame_hint() {
        let dir = TempDir::new().unwrap();
        let gif = dir.path().join("anim.gif");
        write_gif(&gif, &[10, 20, 30]);
        assert_eq!(animation_frame_hint(&gif, Some(ImageFormat::Gif)), 3);

        let png = dir.path().join("still.png");
        solid(2, 2, 5).save(&png).unwrap();
        assert_eq!(animation_frame_hint(&png, Some(ImageFormat::Png)), 1);

        assert_eq!(animation_frame_hint(Path::new("/nonexistent.gif"), Some(ImageFormat::Gif)), 1);
    }

    fn riff_chunk(fourcc: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut chunk = fourcc.to_vec();
        chunk.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        chunk.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            chunk.push(0);
        }
        chunk
    }

    fn webp_container(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
        data.extend_from_slice(b"WEBP");
        data.extend_from_slice(&body);
        data
    }

    fn png_chunk(kind: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut chunk = (payload.len() as u32).to_be_bytes().to_vec();
        chunk.extend_from_slice(kind);
        chunk.extend_from_slice(payload);
        chunk.extend_from_slice(&[0, 0, 0, 0]);
        chunk
    }

    fn png_container(chunks: &[Vec<u8>]) -> Vec<u8> {
        let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
        data.extend_from_slice(&chunks.concat());
        data
    }

    #[test]
    fn test_sniff_animated_webp() {
        let webp = webp_container(&[
            riff_chunk(b"VP8X", &[0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            riff_chunk(b"ANIM", &[0, 0, 0, 0, 0, 0]),
            riff_chunk(b"ANMF", &[1, 2, 3]),
            riff_chunk(b"ANMF", &[4, 5, 6, 7]),
        ]);
        assert_eq!(sniff::webp_frame_count(&webp), 2);
    }

    #[test]
    fn test_sniff_webp_ignores_markers_in_payload() {
        let mut payload = b"xxANIMxxANMFxxANMF".to_vec();
        payload.push(9);
        let webp = webp_container(&[riff_chunk(b"VP8L", &payload)]);
        assert_eq!(sniff::webp_frame_count(&webp), 1);
        assert_eq!(sniff::webp_frame_count(b"not a riff file"), 1);
    }

    #[test]
    fn test_sniff_apng_reads_actl() {
        let apng = png_container(&[
            png_chunk(b"IHDR", &[0; 13]),
            png_chunk(b"acTL", &[0, 0, 0, 4, 0, 0, 0, 0]),
            png_chunk(b"IDAT", &[1, 2, 3]),
            png_chunk(b"IEND", &[]),
        ]);
        assert_eq!(sniff::apng_frame_count(&apng), 4);
    }

    #[test]
    fn test_sniff_apng_stops_at_image_data() {
        let mut idat = b"zz".to_vec();
        idat.extend_from_slice(b"acTL");
        idat.extend_from_slice(&[0, 0, 0, 99]);
        let png = png_container(&[
            png_chunk(b"IHDR", &[0; 13]),
            png_chunk(b"IDAT", &idat),
            png_chunk(b"IEND", &[]),
        ]);
        assert_eq!(sniff::apng_frame_count(&png), 1);
    }

    #[test]
    fn test_sniff_gif_rejects_non_gif() {
        assert_eq!(sniff::gif_frame_count(b"PNG not a gif"), 0);
        assert_eq!(sniff::gif_frame_count(b""), 0);
    }
}
