//! Sinusoidal fringe pattern generation.

use std::f64::consts::PI;

use fringe_calib_core::{FloatImage, GrayImage, ImageSize};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fringe orientation.
///
/// `Horizontal` patterns vary along image columns and encode the projector
/// column; `Vertical` patterns vary along rows and encode the projector row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FringeOrientation {
    Horizontal,
    Vertical,
}

/// Fringe period in pixels; always finite and positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Pitch(f32);

impl Pitch {
    /// `None` unless `pixels` is finite and positive.
    pub fn new(pixels: f32) -> Option<Self> {
        (pixels.is_finite() && pixels > 0.0).then_some(Self(pixels))
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
}

/// One phase-shifted pattern with intensities in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FringePattern {
    pub image: FloatImage,
    pub pitch: f32,
    pub orientation: FringeOrientation,
    /// Index `k` of the phase shift `2πk/N`.
    pub phase_index: usize,
}

impl FringePattern {
    /// 8-bit rendition for a projection sink.
    pub fn to_gray_u8(&self) -> GrayImage {
        self.image.to_gray_u8()
    }
}

/// Generator of `N`-step phase-shifted fringe sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FringeSynthesizer {
    count: usize,
}

impl FringeSynthesizer {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Render `count` patterns of `size` at the given pitch (pixels per period).
    ///
    /// Intensity at coordinate `u` along the varying axis of pattern `k` is
    /// `0.5 * (1 - cos(2πu/pitch + 2πk/count))`. Vertical patterns are built
    /// on the transposed size along columns and transposed back.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(count = self.count))
    )]
    pub fn generate_set(
        &self,
        size: ImageSize,
        pitch: Pitch,
        orientation: FringeOrientation,
    ) -> Vec<FringePattern> {
        let build_size = match orientation {
            FringeOrientation::Horizontal => size,
            FringeOrientation::Vertical => size.transposed(),
        };

        (0..self.count)
            .map(|k| {
                let along_cols = self.render_along_columns(build_size, pitch, k);
                let image = match orientation {
                    FringeOrientation::Horizontal => along_cols,
                    FringeOrientation::Vertical => along_cols.transposed(),
                };
                FringePattern {
                    image,
                    pitch: pitch.get(),
                    orientation,
                    phase_index: k,
                }
            })
            .collect()
    }

    fn render_along_columns(&self, size: ImageSize, pitch: Pitch, k: usize) -> FloatImage {
        let shift = 2.0 * PI * k as f64 / self.count as f64;
        let pitch = pitch.get() as f64;
        let profile: Vec<f32> = (0..size.width)
            .map(|u| {
                let arg = 2.0 * PI * (u as f64 / pitch) + shift;
                (0.5 * (1.0 - arg.cos())).clamp(0.0, 1.0) as f32
            })
            .collect();

        let mut data = Vec::with_capacity(size.pixel_count());
        for _ in 0..size.height {
            data.extend_from_slice(&profile);
        }
        FloatImage {
            width: size.width,
            height: size.height,
            data,
        }
    }
}
