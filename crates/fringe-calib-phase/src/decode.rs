//! N-step phase-shifting demodulation.

use std::f64::consts::PI;

use fringe_calib_core::{FloatImage, GrayImage, ImageSize};

use crate::InvalidInputError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Read-only access to per-pixel intensities of a captured fringe.
pub trait IntensityImage {
    fn size(&self) -> ImageSize;
    /// Intensity of pixel `idx` in row-major order.
    fn intensity(&self, idx: usize) -> f64;
}

impl IntensityImage for GrayImage {
    fn size(&self) -> ImageSize {
        GrayImage::size(self)
    }

    #[inline]
    fn intensity(&self, idx: usize) -> f64 {
        self.data[idx] as f64
    }
}

impl IntensityImage for FloatImage {
    fn size(&self) -> ImageSize {
        FloatImage::size(self)
    }

    #[inline]
    fn intensity(&self, idx: usize) -> f64 {
        self.data[idx] as f64
    }
}

/// Wrapped phase in `(-π, π]` plus the fringe modulation that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedPhaseMap {
    pub phase: FloatImage,
    /// Amplitude of the sinusoid at each pixel, in input intensity units.
    pub modulation: FloatImage,
}

impl WrappedPhaseMap {
    #[inline]
    pub fn size(&self) -> ImageSize {
        self.phase.size()
    }
}

/// Decoder for a fixed number of phase shifts.
#[derive(Clone, Debug)]
pub struct PhaseDecoder {
    count: usize,
    sin: Vec<f64>,
    cos: Vec<f64>,
}

impl PhaseDecoder {
    pub fn new(count: usize) -> Result<Self, InvalidInputError> {
        if count < 3 {
            return Err(InvalidInputError::FringeCountTooSmall(count));
        }
        let shifts = (0..count).map(|k| 2.0 * PI * k as f64 / count as f64);
        Ok(Self {
            count,
            sin: shifts.clone().map(f64::sin).collect(),
            cos: shifts.map(f64::cos).collect(),
        })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Combine `count` captures shot at shifts `2πk/count` into a wrapped phase map.
    ///
    /// Per pixel: `S = Σ I_k sin(2πk/N)`, `C = Σ I_k cos(2πk/N)`,
    /// `phase = -atan2(S, C)`. For captures `a + b·cos(φ + 2πk/N)` the result
    /// is `φ`; for the synthesized patterns `0.5·(1 - cos(θ + 2πk/N))` it is
    /// `θ - π`, both wrapped to `(-π, π]`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, captures), fields(count = captures.len()))
    )]
    pub fn decode<I: IntensityImage>(
        &self,
        captures: &[I],
    ) -> Result<WrappedPhaseMap, InvalidInputError> {
        if captures.len() != self.count {
            return Err(InvalidInputError::CaptureCount {
                expected: self.count,
                got: captures.len(),
            });
        }
        let size = captures[0].size();
        if size.pixel_count() == 0 {
            return Err(InvalidInputError::EmptyImage);
        }
        for (index, capture) in captures.iter().enumerate().skip(1) {
            if capture.size() != size {
                return Err(InvalidInputError::SizeMismatch {
                    index,
                    expected: size,
                    got: capture.size(),
                });
            }
        }

        let n = size.pixel_count();
        let mut phase = Vec::with_capacity(n);
        let mut modulation = Vec::with_capacity(n);
        let scale = 2.0 / self.count as f64;

        for idx in 0..n {
            let mut s = 0.0;
            let mut c = 0.0;
            for (k, capture) in captures.iter().enumerate() {
                let v = capture.intensity(idx);
                s += v * self.sin[k];
                c += v * self.cos[k];
            }
            phase.push(principal_value(-s.atan2(c)));
            modulation.push((scale * s.hypot(c)) as f32);
        }

        log::debug!(
            "decoded {}-step wrapped phase ({}x{})",
            self.count,
            size.width,
            size.height
        );

        Ok(WrappedPhaseMap {
            phase: FloatImage {
                width: size.width,
                height: size.height,
                data: phase,
            },
            modulation: FloatImage {
                width: size.width,
                height: size.height,
                data: modulation,
            },
        })
    }
}

/// Fold into `(-π, π]` after the cast to `f32`.
#[inline]
fn principal_value(phase: f64) -> f32 {
    let p = phase as f32;
    if p <= -std::f32::consts::PI {
        std::f32::consts::PI
    } else if p > std::f32::consts::PI {
        p - 2.0 * std::f32::consts::PI
    } else {
        p
    }
}
