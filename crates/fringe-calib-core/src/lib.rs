//! Core types and utilities for camera/projector structured-light calibration.
//!
//! This crate is intentionally small and device-agnostic. It does *not*
//! depend on any concrete image library, camera SDK or geometric solver.
//!
//! - [`BoardGeometry`] describes the asymmetric circle grid and produces the
//!   board-local object points shared by every pose.
//! - [`GrayImage`], [`ColorImage`] and [`FloatImage`] are plain row-major
//!   buffers used for captured frames, fringe patterns and phase maps.
//! - [`CalibrationResult`] collects intrinsics, distortion and pose.

mod board;
mod image;
mod logger;
mod result;

pub use board::{BoardError, BoardGeometry, ImagePoint, ImagePointSet, ObjectPoint};
pub use image::{sample_bilinear, ColorImage, FloatImage, GrayImage, ImageSize};
pub use result::{CalibrationResult, Distortion, Intrinsics, PlanarPose};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
