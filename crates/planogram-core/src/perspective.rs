//! Perspective mapping of boxes into a target canvas.

use log::debug;

use crate::{BoundingBox, CanvasSize, GeometryError, ProjectiveTransform};

/// Push the four corners of `bbox` through `transform` and return the
/// axis-aligned box of the results.
///
/// The result encloses the warped quadrilateral, so it is generally larger
/// than the true image of the box. `canvas` names the target space; the
/// result is neither clipped nor rescaled to it.
///
/// Fails with [`GeometryError::SingularHomography`] for a singular transform
/// and [`GeometryError::PointAtInfinity`] when a corner has no finite image.
pub fn transform_bounding_box<T: ProjectiveTransform + ?Sized>(
    bbox: &BoundingBox,
    transform: &T,
    canvas: CanvasSize,
) -> Result<BoundingBox, GeometryError> {
    if !transform.is_invertible() {
        return Err(GeometryError::SingularHomography {
            det: transform.determinant().unwrap_or(0.0),
        });
    }

    let corners = bbox.corners();
    let mapped = transform
        .transform_points(&corners)
        .into_iter()
        .enumerate()
        .map(|(index, p)| p.ok_or(GeometryError::PointAtInfinity { index }))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(p) = mapped.iter().find(|p| !canvas.contains(**p)) {
        debug!(
            "corner ({:.1}, {:.1}) falls outside the {}x{} canvas",
            p.x, p.y, canvas.width, canvas.height
        );
    }

    BoundingBox::enclosing(&mapped).ok_or(GeometryError::PointAtInfinity { index: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Homography;
    use approx::assert_abs_diff_eq;
    use nalgebra::Point2;

    fn assert_box_close(a: &BoundingBox, b: &BoundingBox, tol: f64) {
        for (x, y) in a.to_array().iter().zip(b.to_array()) {
            assert_abs_diff_eq!(*x, y, epsilon = tol);
        }
    }

    #[test]
    fn identity_leaves_box_unchanged() {
        let b = BoundingBox::new(12.0, 30.5, 200.0, 310.25);
        let out =
            transform_bounding_box(&b, &Homography::identity(), CanvasSize::new(640, 480))
                .expect("identity");
        assert_box_close(&out, &b, 1e-12);
    }

    #[test]
    fn affine_scale_and_shift() {
        let h = Homography::from_array([[2.0, 0.0, 10.0], [0.0, 0.5, -4.0], [0.0, 0.0, 1.0]]);
        let b = BoundingBox::new(1.0, 2.0, 3.0, 6.0);
        let out = transform_bounding_box(&b, &h, CanvasSize::new(100, 100)).expect("affine");
        assert_box_close(&out, &BoundingBox::new(12.0, -3.0, 16.0, -1.0), 1e-12);
    }

    #[test]
    fn result_encloses_warped_corners() {
        let h = Homography::from_array([
            [0.9, 0.2, 15.0],
            [-0.1, 1.05, 4.0],
            [0.0008, 0.0003, 1.0],
        ]);
        let b = BoundingBox::new(40.0, 60.0, 220.0, 180.0);
        let out = transform_bounding_box(&b, &h, CanvasSize::new(400, 300)).expect("warp");

        let warped: Vec<Point2<f64>> = b.corners().iter().map(|&p| h.apply(p)).collect();
        for p in &warped {
            assert!(p.x >= out.xmin - 1e-9 && p.x <= out.xmax + 1e-9);
            assert!(p.y >= out.ymin - 1e-9 && p.y <= out.ymax + 1e-9);
        }
        // each edge of the result touches at least one corner
        assert!(warped.iter().any(|p| (p.x - out.xmin).abs() < 1e-9));
        assert!(warped.iter().any(|p| (p.y - out.ymax).abs() < 1e-9));
    }

    #[test]
    fn rotation_grows_the_box() {
        let (s, c) = std::f64::consts::FRAC_PI_4.sin_cos();
        let h = Homography::from_array([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]);
        let b = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        let out = transform_bounding_box(&b, &h, CanvasSize::new(10, 10)).expect("rotation");
        assert!(out.area() > b.area());
        assert_abs_diff_eq!(out.xmax, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn scaled_homography_maps_box_identically() {
        let h = Homography::from_array([
            [0.9, 0.2, 15.0],
            [-0.1, 1.05, 4.0],
            [0.0008, 0.0003, 1.0],
        ]);
        let b = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        let canvas = CanvasSize::new(400, 300);
        let expected = transform_bounding_box(&b, &h, canvas).expect("warp");

        for s in [1e-5, 1e-2, 250.0] {
            let scaled = Homography::new(h.h * s);
            let out = transform_bounding_box(&b, &scaled, canvas).expect("scaled warp");
            assert_box_close(&out, &expected, 1e-9);
        }

        let small_identity = Homography::new(nalgebra::Matrix3::identity() * 1e-5);
        let out = transform_bounding_box(&b, &small_identity, canvas).expect("small identity");
        assert_box_close(&out, &b, 1e-9);
    }

    #[test]
    fn singular_homography_is_rejected() {
        let h = Homography::from_array([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]);
        let b = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let err = transform_bounding_box(&b, &h, CanvasSize::new(10, 10)).expect_err("singular");
        assert!(matches!(err, GeometryError::SingularHomography { .. }));
    }

    #[test]
    fn corner_on_horizon_is_rejected() {
        let h = Homography::from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, -1.0]]);
        let b = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let err = transform_bounding_box(&b, &h, CanvasSize::new(10, 10)).expect_err("horizon");
        assert_eq!(err, GeometryError::PointAtInfinity { index: 1 });
    }
}
