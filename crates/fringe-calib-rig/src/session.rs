use fringe_calib_core::ColorImage;

use crate::{DeviceError, FeedbackDisplay, Overlay};

/// Feedback window held open for one acquisition loop.
///
/// The window is opened on creation and closed when the session is dropped,
/// including when the loop exits early with an error.
pub struct FeedbackSession<'d> {
    display: &'d mut dyn FeedbackDisplay,
}

impl<'d> FeedbackSession<'d> {
    pub fn open(display: &'d mut dyn FeedbackDisplay) -> Result<Self, DeviceError> {
        display.open()?;
        Ok(Self { display })
    }

    pub fn show(&mut self, frame: &ColorImage, overlay: &Overlay<'_>) -> Result<(), DeviceError> {
        self.display.show(frame, overlay)
    }
}

impl Drop for FeedbackSession<'_> {
    fn drop(&mut self) {
        self.display.close();
    }
}
