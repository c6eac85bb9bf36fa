//! Geometry primitives for planogram compliance checking.
//!
//! This crate is purely geometric and does no image IO. It covers:
//! - reading reference layouts (`class x_center y_center width height` rows),
//! - IoU scoring of axis-aligned boxes,
//! - normalized-to-pixel mapping,
//! - perspective mapping of boxes through a homography,
//! - matching detections against a layout.
//!
//! ```
//! use planogram_core::{iou, BoundingBox};
//!
//! let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
//! let b = BoundingBox::new(1.0, 1.0, 3.0, 3.0);
//! assert!((iou(&a, &b) - 1.0 / 7.0).abs() < 1e-12);
//! ```

mod bbox;
mod compliance;
mod error;
mod homography;
mod iou;
mod layout;
mod logger;
mod perspective;

pub use bbox::{convert_normalized_to_pixel, BoundingBox, CanvasSize, ImageDimensions, PixelBox};
pub use compliance::{
    check_compliance, ComplianceParams, ComplianceReport, Detection, SlotResult, SlotStatus,
};
pub use error::GeometryError;
pub use homography::{estimate_homography, homography_from_4pt, Homography, ProjectiveTransform};
pub use iou::{intersection, iou, try_iou};
pub use layout::{
    parse_layout, read_reference_file, LayoutError, LayoutTable, PixelEntry, ReferenceEntry,
};
pub use perspective::transform_bounding_box;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
