use fringe_calib_core::ImageSize;

use crate::FringeOrientation;

/// Contract violations on decoder input.
///
/// These indicate a caller bug and are never retried.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum InvalidInputError {
    #[error("phase shifting needs at least 3 fringes, got {0}")]
    FringeCountTooSmall(usize),
    #[error("expected {expected} captured fringes, got {got}")]
    CaptureCount { expected: usize, got: usize },
    #[error("capture {index} is {got:?}, expected {expected:?}")]
    SizeMismatch {
        index: usize,
        expected: ImageSize,
        got: ImageSize,
    },
    #[error("captured images are empty")]
    EmptyImage,
}

/// Errors returned by phase unwrapping.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum UnwrapError {
    #[error("wrapped maps differ in size: {short:?} vs {long:?}")]
    SizeMismatch { short: ImageSize, long: ImageSize },
    #[error("wrapped maps differ in orientation: {short:?} vs {long:?}")]
    OrientationMismatch {
        short: FringeOrientation,
        long: FringeOrientation,
    },
    #[error("pitches must be finite, positive and increasing (got {short} then {long})")]
    InvalidPitches { short: f32, long: f32 },
    #[error("beat of {beat} px cannot cover a projector spanning {extent} px")]
    BeatTooShort { beat: f32, extent: f32 },
    #[error("expected a {expected:?} map, got {got:?}")]
    WrongOrientation {
        expected: FringeOrientation,
        got: FringeOrientation,
    },
}
