//! Calibration outputs.

use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

/// Lens distortion in the Brown–Conrady layout `[k1, k2, p1, p2, k3]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Distortion(pub [f64; 5]);

impl Distortion {
    pub const NONE: Distortion = Distortion([0.0; 5]);

    #[inline]
    pub fn coefficients(&self) -> [f64; 5] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0.0)
    }

    /// Apply the distortion model to a normalized image point.
    pub fn distort(&self, p: Point2<f64>) -> Point2<f64> {
        let [k1, k2, p1, p2, k3] = self.0;
        let (x, y) = (p.x, p.y);
        let r2 = x * x + y * y;
        let radial = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;
        Point2::new(
            x * radial + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x),
            y * radial + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y,
        )
    }

    /// Invert [`Distortion::distort`] by fixed-point iteration.
    pub fn undistort(&self, distorted: Point2<f64>, iterations: usize) -> Point2<f64> {
        if self.is_zero() {
            return distorted;
        }
        let mut p = distorted;
        for _ in 0..iterations {
            let d = self.distort(p);
            p = Point2::new(p.x + distorted.x - d.x, p.y + distorted.y - d.y);
        }
        p
    }
}

/// Intrinsic matrix and lens distortion of one device.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub matrix: Matrix3<f64>,
    pub distortion: Distortion,
}

impl Intrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64, skew: f64, distortion: Distortion) -> Self {
        Self {
            matrix: Matrix3::new(fx, skew, cx, 0.0, fy, cy, 0.0, 0.0, 1.0),
            distortion,
        }
    }

    #[inline]
    pub fn fx(&self) -> f64 {
        self.matrix[(0, 0)]
    }

    #[inline]
    pub fn fy(&self) -> f64 {
        self.matrix[(1, 1)]
    }

    #[inline]
    pub fn cx(&self) -> f64 {
        self.matrix[(0, 2)]
    }

    #[inline]
    pub fn cy(&self) -> f64 {
        self.matrix[(1, 2)]
    }

    #[inline]
    pub fn skew(&self) -> f64 {
        self.matrix[(0, 1)]
    }

    /// Pixel coordinates -> undistorted normalized coordinates.
    pub fn normalize(&self, pixel: Point2<f64>) -> Point2<f64> {
        let y = (pixel.y - self.cy()) / self.fy();
        let x = (pixel.x - self.cx() - self.skew() * y) / self.fx();
        self.distortion.undistort(Point2::new(x, y), 20)
    }

    /// Undistorted normalized coordinates -> pixel coordinates.
    pub fn project_normalized(&self, normalized: Point2<f64>) -> Point2<f64> {
        let d = self.distortion.distort(normalized);
        Point2::new(
            self.fx() * d.x + self.skew() * d.y + self.cx(),
            self.fy() * d.y + self.cy(),
        )
    }
}

/// Board pose relative to the device: Rodrigues rotation vector and translation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanarPose {
    pub rotation: Vector3<f64>,
    pub translation: Vector3<f64>,
}

/// Full calibration of one device.
///
/// Only constructed once both the intrinsic and the extrinsic solve have
/// succeeded, so a value of this type is never partially populated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub intrinsic_matrix: Matrix3<f64>,
    pub distortion: Distortion,
    pub rotation: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl CalibrationResult {
    pub fn new(intrinsics: Intrinsics, pose: PlanarPose) -> Self {
        Self {
            intrinsic_matrix: intrinsics.matrix,
            distortion: intrinsics.distortion,
            rotation: pose.rotation,
            translation: pose.translation,
        }
    }

    pub fn intrinsics(&self) -> Intrinsics {
        Intrinsics {
            matrix: self.intrinsic_matrix,
            distortion: self.distortion,
        }
    }

    pub fn pose(&self) -> PlanarPose {
        PlanarPose {
            rotation: self.rotation,
            translation: self.translation,
        }
    }
}
