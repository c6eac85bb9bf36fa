//! Intersection-over-Union scoring of axis-aligned boxes.

use crate::{BoundingBox, GeometryError};

/// Intersection rectangle of two boxes, or `None` when they do not overlap.
///
/// Touching boxes yield a zero-area rectangle rather than `None`.
pub fn intersection(a: &BoundingBox, b: &BoundingBox) -> Option<BoundingBox> {
    let left = a.xmin.max(b.xmin);
    let top = a.ymin.max(b.ymin);
    let right = a.xmax.min(b.xmax);
    let bottom = a.ymax.min(b.ymax);

    if right < left || bottom < top {
        return None;
    }
    Some(BoundingBox::new(left, top, right, bottom))
}

/// IoU of two boxes in the same coordinate space.
///
/// Disjoint boxes score exactly `0.0`. A zero union (two coincident
/// zero-area boxes) is not guarded and yields `NaN`; use [`try_iou`] when
/// the inputs may be degenerate.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let Some(inter) = intersection(a, b) else {
        return 0.0;
    };
    let inter_area = inter.area();
    let union = a.area() + b.area() - inter_area;
    inter_area / union
}

/// Checked IoU: fails when the union area is not strictly positive.
pub fn try_iou(a: &BoundingBox, b: &BoundingBox) -> Result<f64, GeometryError> {
    let Some(inter) = intersection(a, b) else {
        return Ok(0.0);
    };
    let inter_area = inter.area();
    let union = a.area() + b.area() - inter_area;
    if union.is_nan() || union <= 0.0 {
        return Err(GeometryError::DegenerateUnion { union });
    }
    Ok(inter_area / union)
}
