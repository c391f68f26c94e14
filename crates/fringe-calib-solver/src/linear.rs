//! Closed-form planar calibration.

use fringe_calib_core::{
    Distortion, ImagePoint, ImagePointSet, ImageSize, Intrinsics, ObjectPoint, PlanarPose,
};
use nalgebra::{DMatrix, Matrix3, Point2, Rotation3, SVector, Vector3};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::homography::{estimate_homography, smallest_singular_index};
use crate::{GeometricSolver, SolverError};

const MIN_VIEWS: usize = 3;
const PLANAR_EPS: f32 = 1e-6;

/// Zhang's method for intrinsics, homography decomposition for pose.
///
/// Intrinsics come back without distortion. Poses honour whatever
/// distortion the given intrinsics carry by undistorting the image points
/// first.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearSolver;

impl LinearSolver {
    pub fn new() -> Self {
        Self
    }
}

fn check_view(
    view: usize,
    object_points: &[ObjectPoint],
    image_points: &[ImagePoint],
) -> Result<(), SolverError> {
    if object_points.len() != image_points.len() {
        return Err(SolverError::LengthMismatch {
            view,
            object: object_points.len(),
            image: image_points.len(),
        });
    }
    if object_points.len() < 4 {
        return Err(SolverError::TooFewPoints {
            view,
            got: object_points.len(),
        });
    }
    if object_points.iter().any(|p| p.z.abs() > PLANAR_EPS) {
        return Err(SolverError::NonPlanarTarget);
    }
    Ok(())
}

fn board_xy(object_points: &[ObjectPoint]) -> Vec<Point2<f64>> {
    object_points
        .iter()
        .map(|p| Point2::new(p.x as f64, p.y as f64))
        .collect()
}

/// Build the 6-vector `v_ij(H)` of Zhang's constraint system.
fn v_ij(h: &Matrix3<f64>, i: usize, j: usize) -> SVector<f64, 6> {
    let hi = h.column(i);
    let hj = h.column(j);

    SVector::<f64, 6>::from_row_slice(&[
        hi[0] * hj[0],
        hi[0] * hj[1] + hi[1] * hj[0],
        hi[1] * hj[1],
        hi[2] * hj[0] + hi[0] * hj[2],
        hi[2] * hj[1] + hi[1] * hj[2],
        hi[2] * hj[2],
    ])
}

/// Closed-form `K` from plane homographies (no distortion).
fn intrinsics_from_homographies(hs: &[Matrix3<f64>]) -> Result<Matrix3<f64>, SolverError> {
    let mut v = DMatrix::<f64>::zeros(2 * hs.len(), 6);
    for (k, h) in hs.iter().enumerate() {
        let v11 = v_ij(h, 0, 0);
        let v22 = v_ij(h, 1, 1);
        let v12 = v_ij(h, 0, 1);
        v.row_mut(2 * k).copy_from(&v12.transpose());
        v.row_mut(2 * k + 1).copy_from(&(v11 - v22).transpose());
    }

    let svd = v.svd(false, true);
    let v_t = svd
        .v_t
        .ok_or(SolverError::Degenerate("SVD of the intrinsic system failed"))?;
    let b = v_t.row(smallest_singular_index(&svd.singular_values));
    let (b11, b12, b22, b13, b23, b33) = (b[0], b[1], b[2], b[3], b[4], b[5]);

    let denom = b11 * b22 - b12 * b12;
    let denom_norm = b11 * b11 + b22 * b22;
    if denom_norm <= 0.0 || denom.abs() / denom_norm < 1e-9 {
        return Err(SolverError::Degenerate("views do not constrain the intrinsics"));
    }

    let v0 = (b12 * b13 - b11 * b23) / denom;
    let lambda = b33 - (b13 * b13 + v0 * (b12 * b13 - b11 * b23)) / b11;
    if denom <= 0.0 || lambda.signum() != b11.signum() {
        return Err(SolverError::Degenerate("image of the absolute conic is not positive"));
    }

    let alpha = (lambda / b11).sqrt();
    let beta = (lambda * b11 / denom).sqrt();
    let gamma = -b12 * alpha * alpha * beta / lambda;
    let u0 = gamma * v0 / beta - b13 * alpha * alpha / lambda;

    let k = Matrix3::new(alpha, gamma, u0, 0.0, beta, v0, 0.0, 0.0, 1.0);
    if !k.iter().all(|x| x.is_finite()) {
        return Err(SolverError::Degenerate("non-finite intrinsics"));
    }
    Ok(k)
}

/// Pixel-to-unit conditioning from the image size.
fn conditioning(image_size: ImageSize) -> Matrix3<f64> {
    let (w, h) = (image_size.width as f64, image_size.height as f64);
    let s = (w + h).max(1.0);
    Matrix3::new(s, 0.0, 0.5 * w, 0.0, s, 0.5 * h, 0.0, 0.0, 1.0)
}

/// Decompose `H ~ [r1 r2 t]` (normalized image coordinates) into a pose.
fn pose_from_homography(h: &Matrix3<f64>) -> Result<PlanarPose, SolverError> {
    let h1 = h.column(0).into_owned();
    let h2 = h.column(1).into_owned();
    let h3 = h.column(2).into_owned();

    let mut lambda = 2.0 / (h1.norm() + h2.norm());
    if !lambda.is_finite() {
        return Err(SolverError::Degenerate("homography has no rotation part"));
    }
    // board in front of the device
    if lambda * h3.z < 0.0 {
        lambda = -lambda;
    }

    let r1 = lambda * h1;
    let r2 = lambda * h2;
    let r3 = r1.cross(&r2);
    let r = Matrix3::from_columns(&[r1, r2, r3]);

    // closest rotation in the Frobenius sense
    let svd = r.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(SolverError::Degenerate("SVD of the rotation failed")),
    };
    let mut r_orth = u * v_t;
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    let rotation: Vector3<f64> = Rotation3::from_matrix_unchecked(r_orth).scaled_axis();
    Ok(PlanarPose {
        rotation,
        translation: lambda * h3,
    })
}

impl GeometricSolver for LinearSolver {
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, object_points, image_points),
            fields(views = image_points.len())
        )
    )]
    fn calibrate_intrinsics(
        &self,
        object_points: &[&[ObjectPoint]],
        image_points: &[ImagePointSet],
        image_size: ImageSize,
    ) -> Result<Intrinsics, SolverError> {
        if object_points.len() != image_points.len() {
            return Err(SolverError::ViewCountMismatch {
                views: object_points.len(),
                images: image_points.len(),
            });
        }
        if image_points.len() < MIN_VIEWS {
            return Err(SolverError::TooFewViews {
                needed: MIN_VIEWS,
                got: image_points.len(),
            });
        }

        let k0 = conditioning(image_size);
        let (half_w, half_h, s) = (k0[(0, 2)], k0[(1, 2)], k0[(0, 0)]);

        let mut homographies = Vec::with_capacity(image_points.len());
        for (view, (obj, img)) in object_points.iter().zip(image_points).enumerate() {
            check_view(view, obj, img)?;
            let dst: Vec<Point2<f64>> = img
                .iter()
                .map(|p| Point2::new((p.x as f64 - half_w) / s, (p.y as f64 - half_h) / s))
                .collect();
            let h = estimate_homography(&board_xy(obj), &dst)
                .ok_or(SolverError::Degenerate("homography estimation failed"))?;
            homographies.push(h.h);
        }

        let k = k0 * intrinsics_from_homographies(&homographies)?;
        let intrinsics = Intrinsics {
            matrix: k,
            distortion: Distortion::NONE,
        };
        log::info!(
            "linear intrinsics from {} views: fx={:.2} fy={:.2} cx={:.2} cy={:.2}",
            image_points.len(),
            intrinsics.fx(),
            intrinsics.fy(),
            intrinsics.cx(),
            intrinsics.cy()
        );
        Ok(intrinsics)
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(points = image_points.len()))
    )]
    fn solve_pose(
        &self,
        object_points: &[ObjectPoint],
        image_points: &[ImagePoint],
        intrinsics: &Intrinsics,
    ) -> Result<PlanarPose, SolverError> {
        check_view(0, object_points, image_points)?;
        let normalized: Vec<Point2<f64>> = image_points
            .iter()
            .map(|p| intrinsics.normalize(Point2::new(p.x as f64, p.y as f64)))
            .collect();
        let h = estimate_homography(&board_xy(object_points), &normalized)
            .ok_or(SolverError::Degenerate("homography estimation failed"))?;
        let pose = pose_from_homography(&h.h)?;
        log::debug!(
            "pose: rvec={:?} t={:?}",
            pose.rotation.as_slice(),
            pose.translation.as_slice()
        );
        Ok(pose)
    }
}
