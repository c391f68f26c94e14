//! Interactive capture loop.

use fringe_calib_core::{BoardGeometry, ImagePointSet};
use fringe_calib_phase::UnwrapParams;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::capture::{capture_gray, illuminate_then_capture, white_frame};
use crate::session::FeedbackSession;
use crate::{
    AcquisitionParams, CalibrationError, CaptureSource, FringeAcquisition, MarkerDetector, Overlay,
    ProjectionSink, Rig,
};

/// Which device the correspondences are collected for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMode {
    /// Marker centers in camera pixels.
    Camera,
    /// Marker centers mapped into projector pixels through fringe decoding.
    Projector,
}

/// State of the capture loop.
///
/// `AwaitingUserTrigger -> LiveFeedback -> DetectionAttempt -> {Accepted, Rejected}`,
/// and back to `LiveFeedback` until enough poses were accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    AwaitingUserTrigger,
    LiveFeedback,
    DetectionAttempt,
    Accepted,
    Rejected,
}

/// Outcome of one triggered attempt.
struct Attempt {
    /// Camera-side markers, kept for the overlay.
    markers: Option<ImagePointSet>,
    /// Correspondence to store, in the mode's pixel space.
    points: Option<ImagePointSet>,
}

impl Attempt {
    fn miss() -> Self {
        Self {
            markers: None,
            points: None,
        }
    }
}

/// Collects one ordered image-point set per accepted board pose.
///
/// The loop blocks on the operator only; a missed detection is retried
/// without limit.
pub struct CorrespondenceAcquirer<'b> {
    board: &'b BoardGeometry,
    params: AcquisitionParams,
    mode: AcquisitionMode,
    fringes: Option<FringeAcquisition>,
    state: CaptureState,
    attempts: usize,
}

impl<'b> CorrespondenceAcquirer<'b> {
    pub fn camera(board: &'b BoardGeometry, params: &AcquisitionParams) -> Self {
        Self {
            board,
            params: params.clone(),
            mode: AcquisitionMode::Camera,
            fringes: None,
            state: CaptureState::AwaitingUserTrigger,
            attempts: 0,
        }
    }

    pub fn projector(
        board: &'b BoardGeometry,
        params: &AcquisitionParams,
        unwrap: &UnwrapParams,
    ) -> Result<Self, CalibrationError> {
        Ok(Self {
            mode: AcquisitionMode::Projector,
            fringes: Some(FringeAcquisition::new(params, unwrap)?),
            ..Self::camera(board, params)
        })
    }

    pub fn new(
        mode: AcquisitionMode,
        board: &'b BoardGeometry,
        params: &AcquisitionParams,
        unwrap: &UnwrapParams,
    ) -> Result<Self, CalibrationError> {
        match mode {
            AcquisitionMode::Camera => Ok(Self::camera(board, params)),
            AcquisitionMode::Projector => Self::projector(board, params, unwrap),
        }
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Triggered attempts so far, accepted or not.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Run the loop until `requested` poses are accepted.
    ///
    /// Every returned set has exactly `board.marker_count()` points in
    /// board order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, rig), fields(mode = ?self.mode))
    )]
    pub fn acquire(
        &mut self,
        rig: &mut Rig<'_>,
        requested: usize,
    ) -> Result<Vec<ImagePointSet>, CalibrationError> {
        if self.mode == AcquisitionMode::Projector && rig.projector.is_none() {
            return Err(CalibrationError::MissingProjector);
        }
        if let (Some(fringes), Some(sink)) = (&self.fringes, rig.projector.as_deref()) {
            fringes.check_extent(sink)?;
        }

        let mut session = FeedbackSession::open(&mut *rig.display)?;
        let mut accepted: Vec<ImagePointSet> = Vec::with_capacity(requested);
        let mut last_markers: Option<ImagePointSet> = None;
        self.state = CaptureState::AwaitingUserTrigger;

        while accepted.len() < requested {
            let frame = rig.camera.frame()?;
            session.show(
                &frame,
                &Overlay {
                    accepted: accepted.len(),
                    requested,
                    state: self.state,
                    markers: last_markers.as_deref(),
                },
            )?;
            self.state = CaptureState::LiveFeedback;

            if !rig.trigger.poll(self.params.poll_interval())? {
                continue;
            }

            self.state = CaptureState::DetectionAttempt;
            self.attempts += 1;
            let projector = match rig.projector {
                Some(ref mut sink) => Some(&mut **sink as &mut dyn ProjectionSink),
                None => None,
            };
            let attempt = self.attempt(&mut *rig.camera, projector, &mut *rig.detector)?;
            last_markers = attempt.markers;
            match attempt.points {
                Some(points) if points.len() == self.board.marker_count() => {
                    accepted.push(points);
                    self.state = CaptureState::Accepted;
                    log::info!(
                        "{:?} pose {}/{} accepted",
                        self.mode,
                        accepted.len(),
                        requested
                    );
                }
                _ => {
                    self.state = CaptureState::Rejected;
                    log::debug!("attempt {} rejected", self.attempts);
                }
            }
        }

        Ok(accepted)
    }

    fn attempt(
        &self,
        camera: &mut dyn CaptureSource,
        mut projector: Option<&mut dyn ProjectionSink>,
        detector: &mut dyn MarkerDetector,
    ) -> Result<Attempt, CalibrationError> {
        let gray = match projector.as_deref_mut() {
            Some(sink)
                if self.mode == AcquisitionMode::Projector
                    && self.params.project_white_for_detection =>
            {
                let white = white_frame(sink.size());
                illuminate_then_capture(sink, camera, &white, &self.params)?
            }
            _ => capture_gray(camera, &self.params)?,
        };

        let expected = self.board.marker_count();
        let markers = match detector.detect(&gray, self.board) {
            Some(markers) if markers.len() == expected => markers,
            Some(markers) => {
                log::debug!("detected {} markers, expected {}", markers.len(), expected);
                return Ok(Attempt::miss());
            }
            None => return Ok(Attempt::miss()),
        };

        let (Some(fringes), Some(sink)) = (&self.fringes, projector) else {
            return Ok(Attempt {
                points: Some(markers.clone()),
                markers: Some(markers),
            });
        };

        let map = fringes.measure(camera, sink)?;
        let points = map.map_points(&markers);
        if points.is_none() {
            log::warn!("markers fall on pixels without valid phase; pose rejected");
        }
        Ok(Attempt {
            markers: Some(markers),
            points,
        })
    }
}
