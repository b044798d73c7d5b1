pub mod adapt;
pub mod formats;
pub mod frames;

pub mod conversion_api;

pub use conversion_api::{
    convert, convert_image_to_format, convert_with_spec, ConvertRequest, DEFAULT_QUALITY,
};
pub use formats::{needs_conversion, parse_target, TargetFormat, TargetSpec};
pub use frames::{collect_frames, load_source, SourceImage};

pub use shared_utils::img_errors::{ConvertError, ErrorKind, Result};
pub use shared_utils::ConversionResult;
