//! Phase-shifting structured light.
//!
//! Pipeline per orientation:
//! 1. [`FringeSynthesizer`] renders `N` sinusoidal patterns at a given pitch,
//!    shifted by `2πk/N`.
//! 2. The captured responses are combined by [`PhaseDecoder`] into a
//!    [`WrappedPhaseMap`] in `(-π, π]`.
//! 3. Two wrapped maps at pitches `λ1 < λ2` are combined by a
//!    [`PhaseUnwrapper`] into an [`UnwrappedPhaseMap`].
//! 4. A horizontal and a vertical unwrapped map form a [`ProjectorMap`] that
//!    maps camera pixels to projector pixels.
//!
//! ## Quickstart
//!
//! ```
//! use fringe_calib_core::ImageSize;
//! use fringe_calib_phase::{FringeOrientation, FringeSynthesizer, PhaseDecoder, Pitch};
//!
//! let synth = FringeSynthesizer::new(5);
//! let pitch = Pitch::new(16.0).unwrap();
//! let patterns = synth.generate_set(ImageSize::new(64, 8), pitch, FringeOrientation::Horizontal);
//! let images: Vec<_> = patterns.iter().map(|p| p.image.clone()).collect();
//!
//! let decoder = PhaseDecoder::new(5).unwrap();
//! let wrapped = decoder.decode(&images).unwrap();
//! assert_eq!(wrapped.phase.width, 64);
//! ```

mod decode;
mod error;
mod fringe;
mod projector;
mod unwrap;

pub use decode::{IntensityImage, PhaseDecoder, WrappedPhaseMap};
pub use error::{InvalidInputError, UnwrapError};
pub use fringe::{FringeOrientation, FringePattern, FringeSynthesizer, Pitch};
pub use projector::ProjectorMap;
pub use unwrap::{
    PhaseMeasurement, PhaseUnwrapper, TwoWavelengthUnwrapper, UnwrapParams, UnwrappedPhaseMap,
};
