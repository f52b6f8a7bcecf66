//! Inbound image validation.

use std::io::Cursor;

use axum::body::Bytes;
use image::{ImageFormat, ImageReader, Limits};

/// Largest accepted frame edge in pixels.
pub const MAX_FRAME_DIMENSION: u32 = 4096;
/// Decoder allocation ceiling per frame.
pub const MAX_DECODE_ALLOC: u64 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame is empty")]
    Empty,
    #[error("frame is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("frame check was interrupted")]
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Checks that `bytes` hold one JPEG, PNG or WebP image within `max_bytes`.
/// The pixels are decoded once so truncated uploads are caught here rather
/// than by the detector.
pub fn inspect(bytes: &[u8], max_bytes: usize) -> Result<FrameInfo, FrameError> {
    if bytes.is_empty() {
        return Err(FrameError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(FrameError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }
    let format = image::guess_format(bytes).map_err(|_| FrameError::UnsupportedFormat)?;
    if !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP
    ) {
        return Err(FrameError::UnsupportedFormat);
    }

    let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
    reader.limits(frame_limits());
    let decoded = reader.decode()?;
    Ok(FrameInfo {
        format,
        width: decoded.width(),
        height: decoded.height(),
    })
}

/// Runs [`inspect`] on the blocking pool so decoding never stalls the
/// runtime's worker threads.
pub async fn inspect_off_runtime(
    bytes: Bytes,
    max_bytes: usize,
) -> Result<FrameInfo, FrameError> {
    tokio::task::spawn_blocking(move || inspect(&bytes, max_bytes))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "frame check task failed");
            FrameError::Interrupted
        })?
}

fn frame_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_FRAME_DIMENSION);
    limits.max_image_height = Some(MAX_FRAME_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 160]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png fixture");
    out.into_inner()
}
