//! Illuminate-then-capture primitives.

use std::thread;

use fringe_calib_core::{GrayImage, ImageSize};

use crate::{AcquisitionParams, CaptureSource, DeviceError, ProjectionSink};

/// Grab `frames_per_pattern` frames and average them into one grayscale image.
pub fn capture_gray(
    camera: &mut dyn CaptureSource,
    params: &AcquisitionParams,
) -> Result<GrayImage, DeviceError> {
    let count = params.frames_per_pattern.max(1);
    let first = camera.frame()?.to_gray();
    if count == 1 {
        return Ok(first);
    }

    let size = first.size();
    let mut sum: Vec<u32> = first.data.iter().map(|&v| v as u32).collect();
    for _ in 1..count {
        let frame = camera.frame()?.to_gray();
        if frame.size() != size {
            return Err(DeviceError::FrameSizeChanged {
                expected: size,
                got: frame.size(),
            });
        }
        for (acc, &v) in sum.iter_mut().zip(&frame.data) {
            *acc += v as u32;
        }
    }

    let n = count as u32;
    let data = sum.into_iter().map(|s| ((s + n / 2) / n) as u8).collect();
    Ok(GrayImage {
        width: size.width,
        height: size.height,
        data,
    })
}

/// Project `pattern`, wait for the settle delay, then capture.
pub fn illuminate_then_capture(
    sink: &mut dyn ProjectionSink,
    camera: &mut dyn CaptureSource,
    pattern: &GrayImage,
    params: &AcquisitionParams,
) -> Result<GrayImage, DeviceError> {
    sink.project(pattern)?;
    let delay = params.settle_delay();
    if !delay.is_zero() {
        thread::sleep(delay);
    }
    capture_gray(camera, params)
}

/// Full-white frame at the sink's resolution.
pub fn white_frame(size: ImageSize) -> GrayImage {
    GrayImage::filled(size.width, size.height, u8::MAX)
}
