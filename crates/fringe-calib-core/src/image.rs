use serde::{Deserialize, Serialize};

/// Pixel dimensions of an image or a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Swap width and height.
    #[inline]
    pub fn transposed(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Single-channel 8-bit image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Image of the given size filled with `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap a row-major buffer; `None` if the length does not match.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == width.checked_mul(height)?).then_some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

/// Interleaved 8-bit RGB image, the frame format delivered by capture sources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // row-major RGB, len = w*h*3
}

impl ColorImage {
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == width.checked_mul(height)?.checked_mul(3)?).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Replicate a grayscale image into all three channels.
    pub fn from_gray(gray: &GrayImage) -> Self {
        let data = gray.data.iter().flat_map(|&g| [g, g, g]).collect();
        Self {
            width: gray.width,
            height: gray.height,
            data,
        }
    }

    #[inline]
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    /// Luma conversion with BT.601 weights.
    pub fn to_gray(&self) -> GrayImage {
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let y = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                y.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Single-channel floating point image.
///
/// Used for fringe intensities in `[0, 1]` and for phase maps, where `NaN`
/// marks a pixel without a valid value.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl FloatImage {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == width.checked_mul(height)?).then_some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Swap rows and columns. Values are moved, never recomputed.
    pub fn transposed(&self) -> Self {
        let mut out = Self::zeros(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                out.data[x * self.height + y] = self.data[y * self.width + x];
            }
        }
        out
    }

    /// Quantize `[0, 1]` intensities to an 8-bit image.
    pub fn to_gray_u8(&self) -> GrayImage {
        let data = self
            .data
            .iter()
            .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Bilinear sample of a float image at sub-pixel `(x, y)`.
///
/// Returns `None` outside the image or when any of the four neighbours is
/// not finite.
pub fn sample_bilinear(src: &FloatImage, x: f32, y: f32) -> Option<f32> {
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }
    let max_x = src.width.checked_sub(1)? as f32;
    let max_y = src.height.checked_sub(1)? as f32;
    if x > max_x || y > max_y {
        return None;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(src.width - 1);
    let y1 = (y0 + 1).min(src.height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.get(x0, y0);
    let p10 = src.get(x1, y0);
    let p01 = src.get(x0, y1);
    let p11 = src.get(x1, y1);
    if !(p00.is_finite() && p10.is_finite() && p01.is_finite() && p11.is_finite()) {
        return None;
    }

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    Some(a + fy * (b - a))
}
