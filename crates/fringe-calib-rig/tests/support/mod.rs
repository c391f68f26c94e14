//! Scripted devices for driving the acquisition loop in tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use fringe_calib_core::{
    BoardGeometry, ColorImage, Distortion, GrayImage, ImagePoint, ImagePointSet, ImageSize,
    Intrinsics, ObjectPoint, PlanarPose,
};
use fringe_calib_rig::{
    CaptureSource, CaptureState, DeviceError, FeedbackDisplay, MarkerDetector, Overlay,
    ProjectionSink, TriggerInput,
};
use fringe_calib_solver::{GeometricSolver, SolverError};
use nalgebra::{Point2, Vector3};

/// Camera returning a constant gray frame.
pub struct StaticCamera {
    pub size: ImageSize,
    pub frames: usize,
}

impl StaticCamera {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            size: ImageSize::new(width, height),
            frames: 0,
        }
    }
}

impl CaptureSource for StaticCamera {
    fn frame(&mut self) -> Result<ColorImage, DeviceError> {
        self.frames += 1;
        Ok(ColorImage::from_gray(&GrayImage::filled(
            self.size.width,
            self.size.height,
            90,
        )))
    }

    fn width(&self) -> usize {
        self.size.width
    }

    fn height(&self) -> usize {
        self.size.height
    }
}

/// Trigger that replays a script, then fires on every poll.
#[derive(Default)]
pub struct ScriptedTrigger {
    pub script: VecDeque<Result<bool, DeviceError>>,
    pub polls: usize,
    pub last_timeout: Option<Duration>,
}

impl ScriptedTrigger {
    pub fn always() -> Self {
        Self::default()
    }

    pub fn with_script(script: impl IntoIterator<Item = Result<bool, DeviceError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl TriggerInput for ScriptedTrigger {
    fn poll(&mut self, timeout: Duration) -> Result<bool, DeviceError> {
        self.polls += 1;
        self.last_timeout = Some(timeout);
        self.script.pop_front().unwrap_or(Ok(true))
    }
}

/// One `show` call as seen by the operator.
#[derive(Clone, Debug, PartialEq)]
pub struct Shown {
    pub accepted: usize,
    pub requested: usize,
    pub state: CaptureState,
    pub markers: Option<usize>,
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub opened: usize,
    pub closed: usize,
    pub shown: Vec<Shown>,
}

impl FeedbackDisplay for RecordingDisplay {
    fn open(&mut self) -> Result<(), DeviceError> {
        self.opened += 1;
        Ok(())
    }

    fn show(&mut self, _frame: &ColorImage, overlay: &Overlay<'_>) -> Result<(), DeviceError> {
        self.shown.push(Shown {
            accepted: overlay.accepted,
            requested: overlay.requested,
            state: overlay.state,
            markers: overlay.markers.map(<[ImagePoint]>::len),
        });
        Ok(())
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

/// Detector replaying a script of results, then returning `fallback`.
pub struct ScriptedDetector {
    pub script: VecDeque<Option<ImagePointSet>>,
    pub fallback: Option<ImagePointSet>,
    pub calls: usize,
    pub last_image: Option<GrayImage>,
}

impl ScriptedDetector {
    pub fn new(
        script: impl IntoIterator<Item = Option<ImagePointSet>>,
        fallback: Option<ImagePointSet>,
    ) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
            calls: 0,
            last_image: None,
        }
    }
}

impl MarkerDetector for ScriptedDetector {
    fn detect(&mut self, image: &GrayImage, _board: &BoardGeometry) -> Option<ImagePointSet> {
        self.calls += 1;
        self.last_image = Some(image.clone());
        match self.script.pop_front() {
            Some(result) => result,
            None => self.fallback.clone(),
        }
    }
}

/// Camera-pixel marker layout: the board seen fronto-parallel.
pub fn synthetic_markers(board: &BoardGeometry, scale: f32, offset: (f32, f32)) -> ImagePointSet {
    board
        .object_points()
        .iter()
        .map(|p| Point2::new(offset.0 + scale * p.x, offset.1 + scale * p.y))
        .collect()
}

#[derive(Clone, Debug)]
pub struct IntrinsicCall {
    pub views: usize,
    pub view_lengths: Vec<usize>,
    pub object_ptrs: Vec<*const ObjectPoint>,
    pub object_points: Vec<ObjectPoint>,
    pub image_points: Vec<ImagePointSet>,
    pub image_size: ImageSize,
}

#[derive(Clone, Debug)]
pub struct PoseCall {
    pub object_len: usize,
    pub image_points: ImagePointSet,
    pub intrinsics: Intrinsics,
}

/// Solver that records its inputs and returns fixed values.
#[derive(Default)]
pub struct RecordingSolver {
    pub intrinsic_calls: RefCell<Vec<IntrinsicCall>>,
    pub pose_calls: RefCell<Vec<PoseCall>>,
    pub fail_intrinsics: Option<SolverError>,
}

impl RecordingSolver {
    pub fn intrinsics() -> Intrinsics {
        Intrinsics::new(1000.0, 1001.0, 320.0, 240.0, 0.0, Distortion::NONE)
    }

    pub fn pose() -> PlanarPose {
        PlanarPose {
            rotation: Vector3::new(0.1, 0.2, 0.3),
            translation: Vector3::new(-1.0, 0.5, 40.0),
        }
    }
}

impl GeometricSolver for RecordingSolver {
    fn calibrate_intrinsics(
        &self,
        object_points: &[&[ObjectPoint]],
        image_points: &[ImagePointSet],
        image_size: ImageSize,
    ) -> Result<Intrinsics, SolverError> {
        self.intrinsic_calls.borrow_mut().push(IntrinsicCall {
            views: image_points.len(),
            view_lengths: image_points.iter().map(Vec::len).collect(),
            object_ptrs: object_points.iter().map(|o| o.as_ptr()).collect(),
            object_points: object_points.first().map(|o| o.to_vec()).unwrap_or_default(),
            image_points: image_points.to_vec(),
            image_size,
        });
        match &self.fail_intrinsics {
            Some(err) => Err(err.clone()),
            None => Ok(Self::intrinsics()),
        }
    }

    fn solve_pose(
        &self,
        object_points: &[ObjectPoint],
        image_points: &[ImagePoint],
        intrinsics: &Intrinsics,
    ) -> Result<PlanarPose, SolverError> {
        self.pose_calls.borrow_mut().push(PoseCall {
            object_len: object_points.len(),
            image_points: image_points.to_vec(),
            intrinsics: *intrinsics,
        });
        Ok(Self::pose())
    }
}

/// Projector whose output a [`MirrorCamera`] can see.
pub struct SharedProjector {
    pub size: ImageSize,
    pub screen: Rc<RefCell<GrayImage>>,
    pub projected: Vec<GrayImage>,
}

impl ProjectionSink for SharedProjector {
    fn project(&mut self, image: &GrayImage) -> Result<(), DeviceError> {
        *self.screen.borrow_mut() = image.clone();
        self.projected.push(image.clone());
        Ok(())
    }

    fn width(&self) -> usize {
        self.size.width
    }

    fn height(&self) -> usize {
        self.size.height
    }
}

/// Camera that sees projector pixel `(stride * x, stride * y)` at camera
/// pixel `(x, y)`. Columns from `shadow_from` on stay dark.
pub struct MirrorCamera {
    pub size: ImageSize,
    pub stride: usize,
    pub screen: Rc<RefCell<GrayImage>>,
    pub shadow_from: usize,
}

impl CaptureSource for MirrorCamera {
    fn frame(&mut self) -> Result<ColorImage, DeviceError> {
        let screen = self.screen.borrow();
        let mut data = Vec::with_capacity(self.size.pixel_count());
        for y in 0..self.size.height {
            for x in 0..self.size.width {
                let value = if x < self.shadow_from {
                    screen.get(x * self.stride, y * self.stride)
                } else {
                    0
                };
                data.push(value);
            }
        }
        let gray = GrayImage::from_raw(self.size.width, self.size.height, data)
            .ok_or_else(|| DeviceError::Capture("bad mirror size".into()))?;
        Ok(ColorImage::from_gray(&gray))
    }

    fn width(&self) -> usize {
        self.size.width
    }

    fn height(&self) -> usize {
        self.size.height
    }
}

/// Projector/camera pair with the camera at half the projector resolution.
pub fn mirror_pair(projector: ImageSize) -> (SharedProjector, MirrorCamera) {
    let screen = Rc::new(RefCell::new(GrayImage::filled(
        projector.width,
        projector.height,
        0,
    )));
    let sink = SharedProjector {
        size: projector,
        screen: Rc::clone(&screen),
        projected: Vec::new(),
    };
    let camera = MirrorCamera {
        size: ImageSize::new(projector.width / 2, projector.height / 2),
        stride: 2,
        screen,
        shadow_from: usize::MAX,
    };
    (sink, camera)
}

/// Camera whose frames lose their last column after `shrink_after` frames.
pub struct ShrinkingCamera {
    pub inner: MirrorCamera,
    pub frames: usize,
    pub shrink_after: usize,
}

impl CaptureSource for ShrinkingCamera {
    fn frame(&mut self) -> Result<ColorImage, DeviceError> {
        self.frames += 1;
        let frame = self.inner.frame()?;
        if self.frames <= self.shrink_after {
            return Ok(frame);
        }
        let gray = frame.to_gray();
        let width = gray.width - 1;
        let data = gray
            .data
            .chunks(gray.width)
            .flat_map(|row| row[..width].iter().copied())
            .collect();
        let cropped = GrayImage::from_raw(width, gray.height, data)
            .ok_or_else(|| DeviceError::Capture("bad crop".into()))?;
        Ok(ColorImage::from_gray(&cropped))
    }

    fn width(&self) -> usize {
        self.inner.width()
    }

    fn height(&self) -> usize {
        self.inner.height()
    }
}
