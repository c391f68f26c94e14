use nalgebra::{DMatrix, Matrix3, Point2, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0] / v[2], v[1] / v[2])
    }
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points(pts: &[Point2<f64>]) -> (Vec<Point2<f64>>, Matrix3<f64>) {
    // translate to centroid, scale so mean distance = sqrt(2)
    let n = pts.len() as f64;
    let (sx, sy) = pts.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let (cx, cy) = (sx / n, sy / n);
    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    let t = hartley_normalization(cx, cy, mean_dist);
    let out = pts
        .iter()
        .map(|p| {
            let v = t * Vector3::new(p.x, p.y, 1.0);
            Point2::new(v[0], v[1])
        })
        .collect();
    (out, t)
}

/// Index of the smallest singular value.
pub(crate) fn smallest_singular_index(values: &nalgebra::DVector<f64>) -> usize {
    values.argmin().0
}

/// Estimate `H` such that `dst ~ H * src` with the normalized DLT.
///
/// Needs at least four correspondences; returns `None` for degenerate input.
pub fn estimate_homography(src: &[Point2<f64>], dst: &[Point2<f64>]) -> Option<Homography> {
    if src.len() != dst.len() || src.len() < 4 {
        return None;
    }

    let (s, ts) = normalize_points(src);
    let (d, td) = normalize_points(dst);

    // Zero padding keeps V^T square for the minimal four-point case.
    let n = src.len();
    let rows = (2 * n).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);

    for k in 0..n {
        let (x, y) = (s[k].x, s[k].y);
        let (u, v) = (d[k].x, d[k].y);

        // [ -x -y -1   0  0  0   u*x u*y u ]
        a[(2 * k, 0)] = -x;
        a[(2 * k, 1)] = -y;
        a[(2 * k, 2)] = -1.0;
        a[(2 * k, 6)] = u * x;
        a[(2 * k, 7)] = u * y;
        a[(2 * k, 8)] = u;

        // [ 0  0  0  -x -y -1   v*x v*y v ]
        a[(2 * k + 1, 3)] = -x;
        a[(2 * k + 1, 4)] = -y;
        a[(2 * k + 1, 5)] = -1.0;
        a[(2 * k + 1, 6)] = v * x;
        a[(2 * k + 1, 7)] = v * y;
        a[(2 * k + 1, 8)] = v;
    }

    let svd = a.svd(false, true);
    let vt = svd.v_t?;
    let h = vt.row(smallest_singular_index(&svd.singular_values));
    let hn = Matrix3::<f64>::from_iterator(h.iter().copied()).transpose();

    // H = Td^{-1} * Hn * Ts
    let h_den = td.try_inverse()? * hn * ts;
    let scale = h_den[(2, 2)];
    if scale.abs() < 1e-12 || !h_den.iter().all(|v| v.is_finite()) {
        return None;
    }
    Some(Homography::new(h_den / scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Point2<f64>> {
        (0..4)
            .flat_map(|r| (0..5).map(move |c| Point2::new(c as f64, r as f64)))
            .collect()
    }

    #[test]
    fn recovers_projective_map() {
        let gt = Homography::new(Matrix3::new(
            120.0, 8.0, 300.0, //
            -5.0, 110.0, 200.0, //
            0.01, 0.02, 1.0,
        ));
        let src = grid();
        let dst: Vec<_> = src.iter().map(|&p| gt.apply(p)).collect();
        let est = estimate_homography(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(&dst) {
            assert!((est.apply(*s) - d).norm() < 1e-6);
        }
        assert!((est.h - gt.h).abs().max() < 1e-6);
    }

    #[test]
    fn minimal_four_points() {
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let dst = [
            Point2::new(10.0, 10.0),
            Point2::new(50.0, 12.0),
            Point2::new(48.0, 45.0),
            Point2::new(8.0, 40.0),
        ];
        let est = estimate_homography(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(&dst) {
            assert!((est.apply(*s) - d).norm() < 1e-8);
        }
    }

    #[test]
    fn rejects_short_or_mismatched_input() {
        let src = grid();
        assert!(estimate_homography(&src[..3], &src[..3]).is_none());
        assert!(estimate_homography(&src, &src[..10]).is_none());
    }
}
