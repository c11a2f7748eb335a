//! Profile photo compression step.
//!
//! # Responsibility
//! - Shrink an uploaded raster image before it reaches the blob store.
//!
//! # Invariants
//! - Output is always JPEG.
//! - Neither output side exceeds `max_width_or_height`; aspect ratio is kept.
//! - Quality is lowered, then dimensions reduced, until the payload fits
//!   `max_size_bytes` or the floors are reached (best effort past that).

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, RgbImage};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MIN_QUALITY: u8 = 40;
const QUALITY_STEP: u8 = 10;
const MIN_DIMENSION: u32 = 64;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug)]
pub enum MediaError {
    EmptyInput,
    Decode(ImageError),
    Encode(ImageError),
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "image upload is empty"),
            Self::Decode(err) => write!(f, "failed to decode image: {err}"),
            Self::Encode(err) => write!(f, "failed to encode image: {err}"),
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyInput => None,
            Self::Decode(err) | Self::Encode(err) => Some(err),
        }
    }
}

/// Size limits for compressed photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    pub max_width_or_height: u32,
    pub max_size_bytes: usize,
    /// First JPEG quality tried (1..=100).
    pub jpeg_quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_width_or_height: 800,
            max_size_bytes: 1024 * 1024,
            jpeg_quality: 85,
        }
    }
}

/// JPEG payload produced by [`compress_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

/// Compression seam used by the editor form.
pub trait PhotoCompressor {
    fn compress(&self, bytes: &[u8]) -> MediaResult<CompressedImage>;
}

/// Default JPEG compressor driven by [`CompressionOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCompressor {
    pub options: CompressionOptions,
}

impl JpegCompressor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }
}

impl PhotoCompressor for JpegCompressor {
    fn compress(&self, bytes: &[u8]) -> MediaResult<CompressedImage> {
        compress_image(bytes, &self.options)
    }
}

/// Decodes `bytes`, downsizes and re-encodes them as JPEG within `options`.
pub fn compress_image(bytes: &[u8], options: &CompressionOptions) -> MediaResult<CompressedImage> {
    if bytes.is_empty() {
        return Err(MediaError::EmptyInput);
    }

    let decoded = image::load_from_memory(bytes).map_err(MediaError::Decode)?;
    let limit = options.max_width_or_height.max(1);
    let mut rgb = fit_within(decoded, limit).to_rgb8();
    let start_quality = options.jpeg_quality.clamp(1, 100);

    loop {
        let mut quality = start_quality;
        loop {
            let encoded = encode_jpeg(&rgb, quality)?;
            if encoded.bytes.len() <= options.max_size_bytes {
                debug!(
                    "event=photo_compress module=media status=ok input_bytes={} output_bytes={} quality={quality}",
                    bytes.len(),
                    encoded.bytes.len()
                );
                return Ok(encoded);
            }
            if quality <= MIN_QUALITY {
                break;
            }
            quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
        }

        let (width, height) = rgb.dimensions();
        if width.max(height) <= MIN_DIMENSION {
            let encoded = encode_jpeg(&rgb, MIN_QUALITY)?;
            warn!(
                "event=photo_compress module=media status=over_budget output_bytes={} max_bytes={}",
                encoded.bytes.len(),
                options.max_size_bytes
            );
            return Ok(encoded);
        }
        let next_limit = (width.max(height) * 3 / 4).max(MIN_DIMENSION);
        rgb = fit_within(DynamicImage::ImageRgb8(rgb), next_limit).to_rgb8();
    }
}

fn fit_within(image: DynamicImage, limit: u32) -> DynamicImage {
    if image.width().max(image.height()) <= limit {
        return image;
    }
    image.resize(limit, limit, FilterType::Lanczos3)
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> MediaResult<CompressedImage> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(rgb)
        .map_err(MediaError::Encode)?;
    let (width, height) = rgb.dimensions();
    Ok(CompressedImage {
        bytes,
        width,
        height,
        quality,
    })
}
