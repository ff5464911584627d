// src/validation.rs - Input checks and metadata extraction for submitted photos

use std::collections::BTreeMap;
use std::io::Cursor;

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{ImageDecoder, ImageFormat};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{PipelineStage, Result, ScreeningError};

/// Largest accepted upload (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Smallest accepted upload (1 KiB)
pub const MIN_IMAGE_BYTES: usize = 1024;

/// Minimum width and height in pixels
pub const MIN_DIMENSION: u32 = 100;

/// Capture tags worth keeping from EXIF
const CAPTURE_TAGS: [(&str, exif::Tag); 5] = [
    ("DateTime", exif::Tag::DateTime),
    ("Make", exif::Tag::Make),
    ("Model", exif::Tag::Model),
    ("Orientation", exif::Tag::Orientation),
    ("Flash", exif::Tag::Flash),
];

/// Image encodings the pipeline accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SupportedFormat {
    Jpeg,
    Png,
    Webp,
}

impl SupportedFormat {
    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(SupportedFormat::Jpeg),
            ImageFormat::Png => Some(SupportedFormat::Png),
            ImageFormat::WebP => Some(SupportedFormat::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedFormat::Jpeg => "JPEG",
            SupportedFormat::Png => "PNG",
            SupportedFormat::Webp => "WEBP",
        }
    }
}

/// Facts about a validated upload. Produced once by [`validate_image`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub format: SupportedFormat,
    /// Colour layout as decoded, e.g. "Rgb8" or "Rgba8"
    pub color_mode: String,
    pub width: u32,
    pub height: u32,
    pub file_size: usize,
    pub aspect_ratio: f64,
    /// EXIF capture tags that could be read; empty when absent
    pub capture_tags: BTreeMap<String, String>,
    /// Lowercase hex SHA-256 of the raw bytes
    pub fingerprint: String,
    pub timestamp: DateTime<Utc>,
    /// Content type declared by the sender (advisory only)
    pub declared_content_type: Option<String>,
}

/// Validate raw upload bytes and extract metadata.
///
/// Size bounds are checked before anything is decoded. Only the image header
/// is read here; full decoding happens in preprocessing.
pub fn validate_image(data: &[u8], declared_content_type: Option<&str>) -> Result<ImageMetadata> {
    if data.len() > MAX_IMAGE_BYTES {
        warn!("Rejected upload of {} bytes (over limit)", data.len());
        return Err(ScreeningError::InputTooLarge {
            size: data.len(),
            max: MAX_IMAGE_BYTES,
        });
    }

    if data.len() < MIN_IMAGE_BYTES {
        warn!("Rejected upload of {} bytes (under limit)", data.len());
        return Err(ScreeningError::InputTooSmall {
            size: data.len(),
            min: MIN_IMAGE_BYTES,
        });
    }

    let detected = image::guess_format(data)
        .map_err(|e| {
            ScreeningError::decode(
                PipelineStage::Validation,
                format!("unrecognised image data: {}", e),
            )
        })?;

    let format = SupportedFormat::from_image_format(detected).ok_or_else(|| {
        warn!("Rejected upload in {:?} format", detected);
        ScreeningError::UnsupportedFormat(format!("{:?}", detected))
    })?;

    let (width, height, color_mode) = read_header(data, format)?;

    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        warn!("Rejected {}x{} upload (resolution too low)", width, height);
        return Err(ScreeningError::ResolutionTooLow {
            width,
            height,
            min: MIN_DIMENSION,
        });
    }

    let metadata = ImageMetadata {
        format,
        color_mode,
        width,
        height,
        file_size: data.len(),
        aspect_ratio: round_to(width as f64 / height as f64, 2),
        capture_tags: extract_capture_tags(data),
        fingerprint: fingerprint(data),
        timestamp: Utc::now(),
        declared_content_type: declared_content_type.map(str::to_string),
    };

    debug!(
        "Validated {} {}x{} ({} bytes, fingerprint {})",
        metadata.format.as_str(),
        width,
        height,
        metadata.file_size,
        &metadata.fingerprint[..12]
    );

    Ok(metadata)
}

/// Read dimensions and colour layout from the image header only
fn read_header(data: &[u8], format: SupportedFormat) -> Result<(u32, u32, String)> {
    let cursor = Cursor::new(data);
    let decode_err =
        |e: image::ImageError| ScreeningError::decode(PipelineStage::Validation, e.to_string());

    let ((width, height), color_type) = match format {
        SupportedFormat::Jpeg => {
            let decoder = JpegDecoder::new(cursor).map_err(decode_err)?;
            (decoder.dimensions(), decoder.color_type())
        }
        SupportedFormat::Png => {
            let decoder = PngDecoder::new(cursor).map_err(decode_err)?;
            (decoder.dimensions(), decoder.color_type())
        }
        SupportedFormat::Webp => {
            let decoder = WebPDecoder::new(cursor).map_err(decode_err)?;
            (decoder.dimensions(), decoder.color_type())
        }
    };

    Ok((width, height, format!("{:?}", color_type)))
}

/// Stable content fingerprint of raw image bytes
pub fn fingerprint(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Read the capture tags we care about. Unreadable EXIF is never fatal.
pub fn extract_capture_tags(data: &[u8]) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();

    let mut cursor = Cursor::new(data);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(reader) => reader,
        Err(exif::Error::NotFound(_)) => return tags,
        Err(e) => {
            debug!("Ignoring unreadable EXIF block: {}", e);
            return tags;
        }
    };

    for (name, tag) in CAPTURE_TAGS {
        if let Some(field) = reader.get_field(tag, exif::In::PRIMARY) {
            let value = field.display_value().to_string();
            let value = value.trim_matches('"').trim().to_string();
            if !value.is_empty() {
                tags.insert(name.to_string(), value);
            }
        }
    }

    tags
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
