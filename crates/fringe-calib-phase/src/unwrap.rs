//! Two-wavelength (heterodyne) phase unwrapping.

use std::f32::consts::PI;

use fringe_calib_core::{sample_bilinear, FloatImage, ImageSize};
use serde::{Deserialize, Serialize};

use crate::{FringeOrientation, UnwrapError, WrappedPhaseMap};

#[cfg(feature = "tracing")]
use tracing::instrument;

const TWO_PI: f32 = 2.0 * PI;

/// Beat phase is folded into `[-margin, 2π - margin)` so that noise near
/// projector coordinate zero does not wrap to the far end of the range.
const BEAT_MARGIN: f32 = 0.1;

/// A wrapped map tagged with the pattern parameters that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseMeasurement {
    pub wrapped: WrappedPhaseMap,
    pub pitch: f32,
    pub orientation: FringeOrientation,
}

/// Continuous phase `Φ = 2πu / pitch` where `u` is the projector coordinate
/// along the fringe's varying axis. Invalid pixels hold `NaN`.
#[derive(Clone, Debug, PartialEq)]
pub struct UnwrappedPhaseMap {
    pub phase: FloatImage,
    pub pitch: f32,
    pub orientation: FringeOrientation,
}

impl UnwrappedPhaseMap {
    #[inline]
    pub fn size(&self) -> ImageSize {
        self.phase.size()
    }

    /// Projector coordinate encoded at integer pixel `(x, y)`.
    pub fn coordinate_at(&self, x: usize, y: usize) -> Option<f32> {
        let phi = self.phase.get(x, y);
        phi.is_finite().then(|| phi * self.pitch / TWO_PI)
    }

    /// Projector coordinate at a sub-pixel camera position.
    pub fn sample_coordinate(&self, x: f32, y: f32) -> Option<f32> {
        sample_bilinear(&self.phase, x, y).map(|phi| phi * self.pitch / TWO_PI)
    }

    /// Number of pixels carrying a valid phase.
    pub fn valid_count(&self) -> usize {
        self.phase.data.iter().filter(|v| v.is_finite()).count()
    }
}

/// Combines two wrapped maps of one orientation into a continuous map.
pub trait PhaseUnwrapper {
    /// `short` must use the smaller pitch; both maps share size and orientation.
    fn unwrap(
        &self,
        short: &PhaseMeasurement,
        long: &PhaseMeasurement,
    ) -> Result<UnwrappedPhaseMap, UnwrapError>;
}

/// Unwrapping thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnwrapParams {
    /// Pixels whose modulation is below this in either map are marked invalid.
    pub min_modulation: f32,
}

impl Default for UnwrapParams {
    fn default() -> Self {
        Self {
            min_modulation: 2.0,
        }
    }
}

/// Heterodyne unwrapping with the beat wavelength `λ1·λ2 / (λ2 - λ1)`.
///
/// The result is unambiguous for projector coordinates in
/// `[0, beat · (1 - 0.1/2π))`, about 1033 pixels for pitches 70 and 75
/// (see [`TwoWavelengthUnwrapper::unambiguous_range`]).
#[derive(Clone, Debug, Default)]
pub struct TwoWavelengthUnwrapper {
    params: UnwrapParams,
}

impl TwoWavelengthUnwrapper {
    pub fn new(params: UnwrapParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &UnwrapParams {
        &self.params
    }

    /// Beat wavelength of two pitches.
    pub fn beat_wavelength(short: f32, long: f32) -> f32 {
        short * long / (long - short)
    }

    /// Largest projector coordinate span that unwraps without aliasing.
    ///
    /// The last `BEAT_MARGIN` radians of the beat are excluded; noise there
    /// pushes the fringe order across the wrap.
    pub fn unambiguous_range(short: f32, long: f32) -> f32 {
        Self::beat_wavelength(short, long) * (1.0 - BEAT_MARGIN / TWO_PI)
    }

    fn validate(short: &PhaseMeasurement, long: &PhaseMeasurement) -> Result<(), UnwrapError> {
        if short.wrapped.size() != long.wrapped.size() {
            return Err(UnwrapError::SizeMismatch {
                short: short.wrapped.size(),
                long: long.wrapped.size(),
            });
        }
        if short.orientation != long.orientation {
            return Err(UnwrapError::OrientationMismatch {
                short: short.orientation,
                long: long.orientation,
            });
        }
        let ok = |p: f32| p.is_finite() && p > 0.0;
        if !ok(short.pitch) || !ok(long.pitch) || short.pitch >= long.pitch {
            return Err(UnwrapError::InvalidPitches {
                short: short.pitch,
                long: long.pitch,
            });
        }
        Ok(())
    }
}

/// Shift decoded phase back to the pattern argument `2πu/pitch` in `[0, 2π)`.
#[inline]
fn pattern_argument(wrapped: f32) -> f32 {
    (wrapped + PI).rem_euclid(TWO_PI)
}

impl PhaseUnwrapper for TwoWavelengthUnwrapper {
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, short, long),
            fields(short = short.pitch, long = long.pitch)
        )
    )]
    fn unwrap(
        &self,
        short: &PhaseMeasurement,
        long: &PhaseMeasurement,
    ) -> Result<UnwrappedPhaseMap, UnwrapError> {
        Self::validate(short, long)?;

        let beat = Self::beat_wavelength(short.pitch, long.pitch);
        let ratio = beat / short.pitch;
        let min_mod = self.params.min_modulation;

        let s = &short.wrapped;
        let l = &long.wrapped;
        let data = (0..s.phase.data.len())
            .map(|idx| {
                if s.modulation.data[idx] < min_mod || l.modulation.data[idx] < min_mod {
                    return f32::NAN;
                }
                let theta_short = pattern_argument(s.phase.data[idx]);
                let theta_long = pattern_argument(l.phase.data[idx]);
                if !theta_short.is_finite() || !theta_long.is_finite() {
                    return f32::NAN;
                }
                let theta_beat =
                    (theta_short - theta_long + BEAT_MARGIN).rem_euclid(TWO_PI) - BEAT_MARGIN;
                let order = ((theta_beat * ratio - theta_short) / TWO_PI).round();
                theta_short + TWO_PI * order
            })
            .collect();

        let phase = FloatImage {
            width: s.phase.width,
            height: s.phase.height,
            data,
        };
        let unwrapped = UnwrappedPhaseMap {
            phase,
            pitch: short.pitch,
            orientation: short.orientation,
        };
        log::debug!(
            "unwrapped {:?} phase (pitches {} / {}, beat {:.1}): {} valid pixels",
            unwrapped.orientation,
            short.pitch,
            long.pitch,
            beat,
            unwrapped.valid_count()
        );
        Ok(unwrapped)
    }
}
