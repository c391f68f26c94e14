use fringe_calib_core::BoardError;
use fringe_calib_phase::{InvalidInputError, UnwrapError};
use fringe_calib_solver::SolverError;

use crate::DeviceError;

/// Terminal failure of a calibration run.
///
/// Marker misses are not errors; they keep the acquisition loop going.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("phase decoding contract violated: {0}")]
    InvalidInput(#[from] InvalidInputError),
    #[error("phase unwrapping failed: {0}")]
    Unwrap(#[from] UnwrapError),
    #[error("geometric solver failed: {0}")]
    Solver(#[from] SolverError),
    #[error("projector calibration needs a projection sink")]
    MissingProjector,
}
