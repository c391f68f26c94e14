//! Geometric solver for planar calibration targets.
//!
//! [`GeometricSolver`] is the seam between acquisition and estimation: the
//! rig crate only ever talks to this trait. [`LinearSolver`] is a closed-form
//! implementation (DLT homographies, Zhang intrinsics, homography
//! decomposition) that is exact on noise-free data and a good initial guess
//! otherwise. Plug a nonlinear refiner in behind the same trait when lens
//! distortion matters.

mod error;
mod homography;
mod linear;

pub use error::SolverError;
pub use homography::{estimate_homography, Homography};
pub use linear::LinearSolver;

use fringe_calib_core::{ImagePoint, ImagePointSet, ImageSize, Intrinsics, ObjectPoint, PlanarPose};

/// Estimates intrinsics from many views and a pose from one.
pub trait GeometricSolver {
    /// `object_points[i]` and `image_points[i]` describe view `i` and have
    /// equal length.
    fn calibrate_intrinsics(
        &self,
        object_points: &[&[ObjectPoint]],
        image_points: &[ImagePointSet],
        image_size: ImageSize,
    ) -> Result<Intrinsics, SolverError>;

    /// Pose of the board (board to device frame) for one view.
    fn solve_pose(
        &self,
        object_points: &[ObjectPoint],
        image_points: &[ImagePoint],
        intrinsics: &Intrinsics,
    ) -> Result<PlanarPose, SolverError>;
}

impl<T: GeometricSolver + ?Sized> GeometricSolver for &T {
    fn calibrate_intrinsics(
        &self,
        object_points: &[&[ObjectPoint]],
        image_points: &[ImagePointSet],
        image_size: ImageSize,
    ) -> Result<Intrinsics, SolverError> {
        (**self).calibrate_intrinsics(object_points, image_points, image_size)
    }

    fn solve_pose(
        &self,
        object_points: &[ObjectPoint],
        image_points: &[ImagePoint],
        intrinsics: &Intrinsics,
    ) -> Result<PlanarPose, SolverError> {
        (**self).solve_pose(object_points, image_points, intrinsics)
    }
}
