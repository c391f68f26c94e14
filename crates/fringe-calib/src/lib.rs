//! High-level facade crate for the `fringe-calib-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the underlying crates
//! - (feature-gated) adapters between the plain image buffers of
//!   `fringe-calib-core` and the `image` crate, plus PNG helpers
//! - the `fringe-calib` command line tool (feature `cli`)
//!
//! ## Quickstart
//!
//! ```no_run
//! use fringe_calib::phase::{FringeOrientation, FringeSynthesizer, PhaseDecoder, Pitch};
//! use fringe_calib::core::ImageSize;
//!
//! let synth = FringeSynthesizer::new(5);
//! let pitch = Pitch::new(70.0).unwrap();
//! let set = synth.generate_set(ImageSize::new(1024, 768), pitch, FringeOrientation::Horizontal);
//! let frames: Vec<_> = set.iter().map(|p| p.to_gray_u8()).collect();
//!
//! let decoder = PhaseDecoder::new(5).unwrap();
//! let wrapped = decoder.decode(&frames).unwrap();
//! println!("phase at (0, 0): {}", wrapped.phase.get(0, 0));
//! ```
//!
//! ## API map
//! - `fringe_calib::core`: image buffers, board geometry, calibration results, logger.
//! - `fringe_calib::phase`: fringe synthesis, phase decoding and unwrapping.
//! - `fringe_calib::solver`: geometric solver contract and the linear solver.
//! - `fringe_calib::rig`: device contracts, acquisition loop and orchestrator.
//! - `fringe_calib::images` (feature `image`): `image` crate adapters.

pub use fringe_calib_core as core;
pub use fringe_calib_phase as phase;
pub use fringe_calib_rig as rig;
pub use fringe_calib_solver as solver;

pub use fringe_calib_core::{BoardGeometry, CalibrationResult, Intrinsics, PlanarPose};
pub use fringe_calib_rig::{
    AcquisitionMode, CalibrationConfig, CalibrationError, CalibrationOrchestrator, Rig,
};
pub use fringe_calib_solver::{GeometricSolver, LinearSolver};

#[cfg(feature = "image")]
pub mod images;
