//! Hardware and operator contracts.
//!
//! The rig crate never talks to a camera SDK, a window system or a circle
//! grid detector directly. Front-ends implement these traits and hand them
//! over in a [`Rig`].

use std::time::Duration;

use fringe_calib_core::{BoardGeometry, ColorImage, GrayImage, ImagePoint, ImagePointSet, ImageSize};

use crate::CaptureState;

/// Failures reported by device implementations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("frame capture failed: {0}")]
    Capture(String),
    #[error("pattern projection failed: {0}")]
    Projection(String),
    #[error("trigger input failed: {0}")]
    Trigger(String),
    #[error("feedback display failed: {0}")]
    Display(String),
    #[error("camera frame size changed from {expected:?} to {got:?}")]
    FrameSizeChanged { expected: ImageSize, got: ImageSize },
    /// The operator closed the application.
    #[error("session closed by the operator")]
    Closed,
}

/// Live camera.
pub trait CaptureSource {
    /// Grab the current frame.
    fn frame(&mut self) -> Result<ColorImage, DeviceError>;
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn size(&self) -> ImageSize {
        ImageSize::new(self.width(), self.height())
    }
}

/// Projector (or any display the camera can see).
pub trait ProjectionSink {
    /// Show `image` full screen; returns once the image is submitted.
    fn project(&mut self, image: &GrayImage) -> Result<(), DeviceError>;
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn size(&self) -> ImageSize {
        ImageSize::new(self.width(), self.height())
    }
}

/// Single "capture this pose now" signal.
pub trait TriggerInput {
    /// Wait at most `timeout` for the signal; `Ok(true)` once it fired.
    fn poll(&mut self, timeout: Duration) -> Result<bool, DeviceError>;
}

/// What the operator sees on top of the live frame.
#[derive(Clone, Copy, Debug)]
pub struct Overlay<'a> {
    pub accepted: usize,
    pub requested: usize,
    pub state: CaptureState,
    /// Markers found by the previous detection attempt, if it found any.
    pub markers: Option<&'a [ImagePoint]>,
}

/// Operator feedback window.
pub trait FeedbackDisplay {
    fn open(&mut self) -> Result<(), DeviceError>;
    fn show(&mut self, frame: &ColorImage, overlay: &Overlay<'_>) -> Result<(), DeviceError>;
    fn close(&mut self);
}

/// Circle-grid detector.
pub trait MarkerDetector {
    /// Ordered marker centers in row-major board order, or `None` when the
    /// grid is not visible.
    fn detect(&mut self, image: &GrayImage, board: &BoardGeometry) -> Option<ImagePointSet>;
}

/// Devices driving one calibration run.
///
/// `projector` is only required for projector calibration.
pub struct Rig<'a> {
    pub camera: &'a mut dyn CaptureSource,
    pub projector: Option<&'a mut dyn ProjectionSink>,
    pub trigger: &'a mut dyn TriggerInput,
    pub display: &'a mut dyn FeedbackDisplay,
    pub detector: &'a mut dyn MarkerDetector,
}
