//! Top-level calibration flow.

use fringe_calib_core::{CalibrationResult, ObjectPoint};
use fringe_calib_solver::GeometricSolver;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    AcquisitionMode, CalibrationConfig, CalibrationError, CalibrationReport,
    CorrespondenceAcquirer, Rig,
};

/// Drives acquisition and the geometric solver for one device.
///
/// Each run builds the board's object points once, collects
/// `requested_samples` poses for the intrinsic solve and one more pose for
/// the extrinsic solve.
pub struct CalibrationOrchestrator<S> {
    config: CalibrationConfig,
    solver: S,
}

impl<S: GeometricSolver> CalibrationOrchestrator<S> {
    pub fn new(config: CalibrationConfig, solver: S) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Calibrate the camera from circle-grid detections.
    pub fn calibrate_camera(
        &self,
        rig: &mut Rig<'_>,
    ) -> Result<CalibrationResult, CalibrationError> {
        self.run(rig, AcquisitionMode::Camera)
    }

    /// Calibrate the projector from fringe-decoded correspondences.
    ///
    /// Intrinsics are expressed in projector pixels.
    pub fn calibrate_projector(
        &self,
        rig: &mut Rig<'_>,
    ) -> Result<CalibrationResult, CalibrationError> {
        self.run(rig, AcquisitionMode::Projector)
    }

    /// Run either mode and wrap the outcome in a report.
    pub fn calibrate(
        &self,
        rig: &mut Rig<'_>,
        mode: AcquisitionMode,
    ) -> Result<CalibrationReport, CalibrationError> {
        let result = self.run(rig, mode)?;
        Ok(CalibrationReport::new(mode, &self.config, result))
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, rig), fields(samples = self.config.requested_samples))
    )]
    fn run(
        &self,
        rig: &mut Rig<'_>,
        mode: AcquisitionMode,
    ) -> Result<CalibrationResult, CalibrationError> {
        let board = &self.config.board;
        let image_size = match mode {
            AcquisitionMode::Camera => rig.camera.size(),
            AcquisitionMode::Projector => rig
                .projector
                .as_deref()
                .ok_or(CalibrationError::MissingProjector)?
                .size(),
        };

        let object_points = board.object_points();
        let mut acquirer = CorrespondenceAcquirer::new(
            mode,
            board,
            &self.config.acquisition,
            &self.config.unwrap,
        )?;

        log::info!(
            "{:?} calibration: collecting {} poses of a {}x{} grid",
            mode,
            self.config.requested_samples,
            board.marker_rows(),
            board.marker_cols()
        );
        let views = acquirer.acquire(rig, self.config.requested_samples)?;
        let shared: Vec<&[ObjectPoint]> = vec![object_points.as_slice(); views.len()];
        for view in &views {
            assert_eq!(
                view.len(),
                object_points.len(),
                "image point set does not match the board"
            );
        }
        let intrinsics = self
            .solver
            .calibrate_intrinsics(&shared, &views, image_size)?;

        log::info!("intrinsics solved; collecting the extrinsic pose");
        let extrinsic = acquirer.acquire(rig, 1)?;
        let pose_points = &extrinsic[0];
        assert_eq!(
            pose_points.len(),
            object_points.len(),
            "image point set does not match the board"
        );
        let pose = self
            .solver
            .solve_pose(&object_points, pose_points, &intrinsics)?;

        log::info!(
            "{:?} calibration done after {} attempts",
            mode,
            acquirer.attempts()
        );
        Ok(CalibrationResult::new(intrinsics, pose))
    }
}
