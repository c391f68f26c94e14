//! Adapters between `fringe-calib-core` buffers and the `image` crate.

use std::path::Path;

use crate::core::{ColorImage, FloatImage, GrayImage};

/// Errors produced by the image adapters.
#[derive(thiserror::Error, Debug)]
pub enum ImageIoError {
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("image dimensions {width}x{height} do not fit the buffer ({len} bytes)")]
    InvalidBuffer {
        width: usize,
        height: usize,
        len: usize,
    },
}

/// Copy an `image::GrayImage` into the core buffer type.
pub fn gray_from_image(img: &image::GrayImage) -> GrayImage {
    GrayImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Copy an `image::RgbImage` into the core color frame type.
pub fn color_from_image(img: &image::RgbImage) -> ColorImage {
    ColorImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Convert a core grayscale buffer into an `image::GrayImage`.
pub fn gray_to_image(img: &GrayImage) -> Result<image::GrayImage, ImageIoError> {
    let invalid = || ImageIoError::InvalidBuffer {
        width: img.width,
        height: img.height,
        len: img.data.len(),
    };
    let width = u32::try_from(img.width).map_err(|_| invalid())?;
    let height = u32::try_from(img.height).map_err(|_| invalid())?;
    image::GrayImage::from_raw(width, height, img.data.clone()).ok_or_else(invalid)
}

/// Load any supported image file as 8-bit grayscale.
///
/// Color files are converted by the `image` crate's luma conversion.
pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, ImageIoError> {
    let img = image::open(path)?.to_luma8();
    Ok(gray_from_image(&img))
}

/// Load any supported image file as an RGB frame.
pub fn load_color(path: impl AsRef<Path>) -> Result<ColorImage, ImageIoError> {
    let img = image::open(path)?.to_rgb8();
    Ok(color_from_image(&img))
}

/// Save a grayscale buffer; the format follows the file extension.
pub fn save_gray(path: impl AsRef<Path>, img: &GrayImage) -> Result<(), ImageIoError> {
    gray_to_image(img)?.save(path)?;
    Ok(())
}

/// Render a wrapped phase map for viewing.
///
/// `(-π, π]` maps linearly onto `0..=255`; pixels without a valid phase
/// are black.
pub fn phase_to_gray(phase: &FloatImage) -> GrayImage {
    use std::f32::consts::PI;

    let data = phase
        .data
        .iter()
        .map(|&p| {
            if p.is_finite() {
                ((p + PI) / (2.0 * PI) * 255.0).round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        })
        .collect();
    GrayImage {
        width: phase.width,
        height: phase.height,
        data,
    }
}
