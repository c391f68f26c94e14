//! Correspondence acquisition and calibration orchestration.
//!
//! A run looks like this:
//!
//! 1. The board's object points are generated once from the
//!    [`CalibrationConfig`].
//! 2. A [`CorrespondenceAcquirer`] shows the live camera view, waits for the
//!    operator's trigger and detects the circle grid. In projector mode it
//!    then projects phase-shifted fringes ([`FringeAcquisition`]) and maps
//!    the detected markers into projector pixels.
//! 3. The [`CalibrationOrchestrator`] feeds the accepted poses to a
//!    [`GeometricSolver`](fringe_calib_solver::GeometricSolver) for the
//!    intrinsics, collects one more pose and solves for the extrinsics.
//!
//! Devices are abstracted by the traits in this crate and bundled into a
//! [`Rig`]. Everything runs on the calling thread.

mod acquire;
mod capture;
mod device;
mod error;
mod fringe;
mod io;
mod orchestrator;
mod params;
mod session;

pub use acquire::{AcquisitionMode, CaptureState, CorrespondenceAcquirer};
pub use capture::{capture_gray, illuminate_then_capture};
pub use device::{
    CaptureSource, DeviceError, FeedbackDisplay, MarkerDetector, Overlay, ProjectionSink, Rig,
    TriggerInput,
};
pub use error::CalibrationError;
pub use fringe::FringeAcquisition;
pub use io::{CalibrationConfig, CalibrationReport, ConfigIoError};
pub use orchestrator::CalibrationOrchestrator;
pub use params::AcquisitionParams;
pub use session::FeedbackSession;
