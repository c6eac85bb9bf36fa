use nalgebra::{DMatrix, Matrix3, Point2, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

const SINGULAR_EPS: f64 = 1e-12;

/// Maps a point set through a planar projective transform.
///
/// A `None` entry marks a point sent to the line at infinity.
pub trait ProjectiveTransform {
    fn transform_points(&self, pts: &[Point2<f64>]) -> Vec<Option<Point2<f64>>>;

    /// Whether the transform can be applied at all.
    fn is_invertible(&self) -> bool {
        true
    }

    /// Determinant of the underlying matrix, if there is one.
    fn determinant(&self) -> Option<f64> {
        None
    }
}

/// 3x3 planar perspective transform: `p_dst ~ H * p_src`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_fn(|r, c| rows[r][c]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        let mut out = [[0.0; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = self.h[(r, c)];
            }
        }
        out
    }

    /// Apply without guarding the homogeneous divide.
    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0] / v[2], v[1] / v[2])
    }

    /// Apply, returning `None` when `p` maps to (or near) the line at infinity.
    ///
    /// The horizon test is relative to the homogeneous result, so it does not
    /// depend on the overall scale of `H`.
    pub fn try_apply(&self, p: Point2<f64>) -> Option<Point2<f64>> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if w.abs() <= SINGULAR_EPS * v.norm() {
            return None;
        }
        let out = Point2::new(v[0] / w, v[1] / w);
        (out.x.is_finite() && out.y.is_finite()).then_some(out)
    }

    /// Singularity test on `det(H) / |H|^3`, invariant to scaling `H`.
    pub fn is_singular(&self) -> bool {
        let norm = self.h.norm();
        if !norm.is_finite() || norm == 0.0 {
            return true;
        }
        let rel = self.h.determinant() / norm.powi(3);
        rel.is_nan() || rel.abs() < SINGULAR_EPS
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl ProjectiveTransform for Homography {
    fn transform_points(&self, pts: &[Point2<f64>]) -> Vec<Option<Point2<f64>>> {
        pts.iter().map(|&p| self.try_apply(p)).collect()
    }

    fn is_invertible(&self) -> bool {
        !self.is_singular()
    }

    fn determinant(&self) -> Option<f64> {
        Some(self.h.determinant())
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

// Translate to centroid, scale so mean distance = sqrt(2).
fn normalize_points(pts: &[Point2<f64>]) -> (Vec<Point2<f64>>, Matrix3<f64>) {
    let n = pts.len() as f64;
    let (sx, sy) = pts.iter().fold((0.0, 0.0), |(ax, ay), p| (ax + p.x, ay + p.y));
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

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < SINGULAR_EPS * h.norm() {
        return None;
    }
    Some(h / s)
}

fn denormalize_homography(
    hn: Matrix3<f64>,
    t_src: Matrix3<f64>,
    t_dst: Matrix3<f64>,
) -> Option<Matrix3<f64>> {
    let t_dst_inv = t_dst.try_inverse()?;
    Some(t_dst_inv * hn * t_src)
}

/// Estimate H such that `dst ~ H * src` from four or more correspondences.
///
/// Exactly four points use the closed 8x8 solve; more use a normalised DLT.
pub fn estimate_homography(src: &[Point2<f64>], dst: &[Point2<f64>]) -> Option<Homography> {
    if src.len() != dst.len() || src.len() < 4 {
        return None;
    }

    if src.len() == 4 {
        let s: &[Point2<f64>; 4] = src.try_into().ok()?;
        let d: &[Point2<f64>; 4] = dst.try_into().ok()?;
        return homography_from_4pt(s, d);
    }

    let (s, ts) = normalize_points(src);
    let (d, td) = normalize_points(dst);

    // Build A (2N x 9)
    let n = src.len();
    let mut a = DMatrix::<f64>::zeros(2 * n, 9);

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

    // h is the right singular vector with the smallest singular value
    let svd = a.svd(true, true);
    let vt = svd.v_t?;
    let last = vt.nrows().checked_sub(1)?;
    let h = vt.row(last);

    let hn = Matrix3::<f64>::from_fn(|r, c| h[3 * r + c]);
    let h_den = denormalize_homography(hn, ts, td)?;
    Some(Homography::new(normalize_homography(h_den)?))
}

/// Compute H such that `dst ~ H * src` from exactly four correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// for collinear or repeated points.
pub fn homography_from_4pt(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Option<Homography> {
    // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1
    let (src_n, t_src) = normalize_points(src);
    let (dst_n, t_dst) = normalize_points(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let (x, y) = (src_n[k].x, src_n[k].y);
        let (u, v) = (dst_n[k].x, dst_n[k].y);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h_den = denormalize_homography(hn, t_src, t_dst)?;
    let h = Homography::new(normalize_homography(h_den)?);
    (!h.is_singular()).then_some(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point2<f64>, b: Point2<f64>, tol: f64) {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        assert!(
            dx < tol && dy < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    fn shelf_to_map() -> Homography {
        Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ))
    }

    #[test]
    fn array_conversion_is_row_major() {
        let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 10.0]];
        let h = Homography::from_array(rows);
        assert_eq!(h.h[(0, 2)], 3.0);
        assert_eq!(h.h[(2, 0)], 7.0);
        assert_eq!(h.to_array(), rows);
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = shelf_to_map();
        let inv = h.inverse().expect("invertible");

        for p in [
            Point2::new(0.0, 0.0),
            Point2::new(50.0, -20.0),
            Point2::new(320.0, 200.0),
        ] {
            assert_close(inv.apply(h.apply(p)), p, 1e-9);
        }
    }

    #[test]
    fn four_point_solve_recovers_h() {
        let ground_truth = shelf_to_map();
        let rect = [
            Point2::new(0.0, 0.0),
            Point2::new(180.0, 0.0),
            Point2::new(180.0, 130.0),
            Point2::new(0.0, 130.0),
        ];
        let dst = rect.map(|p| ground_truth.apply(p));

        let recovered = homography_from_4pt(&rect, &dst).expect("recoverable");
        for p in [
            Point2::new(0.0, 0.0),
            Point2::new(60.0, 40.0),
            Point2::new(150.0, 120.0),
        ] {
            assert_close(recovered.apply(p), ground_truth.apply(p), 1e-6);
        }
    }

    #[test]
    fn dlt_handles_overdetermined_case() {
        let ground_truth = Homography::new(Matrix3::new(
            1.0, 0.2, 12.0, //
            -0.1, 0.9, 6.0, //
            0.0006, 0.0004, 1.0,
        ));

        let src: Vec<Point2<f64>> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Point2::new(x as f64 * 40.0, y as f64 * 50.0)))
            .collect();
        let dst: Vec<Point2<f64>> = src.iter().map(|&p| ground_truth.apply(p)).collect();

        let estimated = estimate_homography(&src, &dst).expect("estimate");
        for p in [Point2::new(0.0, 0.0), Point2::new(60.0, 40.0), Point2::new(80.0, 100.0)] {
            assert_close(estimated.apply(p), ground_truth.apply(p), 1e-6);
        }
    }

    #[test]
    fn mismatched_input_lengths_fail() {
        let src = [Point2::new(0.0, 0.0); 4];
        let dst = [Point2::new(1.0, 1.0); 3];
        assert!(estimate_homography(&src, &dst).is_none());
    }

    #[test]
    fn singular_matrix_is_detected() {
        let flat = Homography::from_array([[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(flat.is_singular());
        assert!(!flat.is_invertible());
        assert!(Homography::identity().is_invertible());
    }

    #[test]
    fn singularity_ignores_overall_scale() {
        let h = shelf_to_map();
        for s in [1e-6, 1e-3, 1.0, 1e4] {
            let scaled = Homography::new(h.h * s);
            assert!(!scaled.is_singular(), "scale {s} flagged singular");
            for p in [Point2::new(10.0, 20.0), Point2::new(300.0, 40.0)] {
                assert_close(scaled.try_apply(p).expect("finite"), h.apply(p), 1e-9);
            }
        }

        let tiny = Homography::new(Matrix3::identity() * 1e-5);
        assert!(tiny.is_invertible());
        assert_close(tiny.apply(Point2::new(10.0, 20.0)), Point2::new(10.0, 20.0), 1e-12);
        assert!(Homography::new(Matrix3::zeros()).is_singular());
    }

    #[test]
    fn points_on_the_horizon_are_rejected() {
        // w = x - 1, so x = 1 maps to infinity
        let h = Homography::from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, -1.0]]);
        let out = h.transform_points(&[Point2::new(1.0, 5.0), Point2::new(3.0, 4.0)]);
        assert!(out[0].is_none());
        assert_close(out[1].expect("finite"), Point2::new(1.5, 2.0), 1e-12);
    }
}
