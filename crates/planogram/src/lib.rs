//! Planogram compliance checks.
//!
//! This crate provides:
//! - re-exports of the geometry in `planogram-core` (layouts, IoU, pixel and
//!   perspective mapping, detection matching)
//! - JSON config/report helpers and an end-to-end [`io::run_check`]
//! - (feature `image`) image-size probing from files on disk
//! - (feature `cli`) the `planogram` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use planogram::{check_compliance, read_reference_file, ComplianceParams, Detection};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = read_reference_file("shelf.txt")?.scaled(640, 480);
//! let detections: Vec<Detection> = Vec::new();
//! let report = check_compliance(&layout, &detections, &ComplianceParams::default());
//! println!("compliance: {:.0}%", report.compliance_ratio() * 100.0);
//! # Ok(())
//! # }
//! ```

pub use planogram_core as core;

pub use planogram_core::{
    check_compliance, convert_normalized_to_pixel, estimate_homography, homography_from_4pt,
    intersection, iou, parse_layout, read_reference_file, transform_bounding_box, try_iou,
    BoundingBox, CanvasSize, ComplianceParams, ComplianceReport, Detection, GeometryError,
    Homography, ImageDimensions, LayoutError, LayoutTable, PixelBox, PixelEntry, ProjectiveTransform,
    ReferenceEntry, SlotResult, SlotStatus,
};

pub mod io;

#[cfg(feature = "image")]
mod image_file;
#[cfg(feature = "image")]
pub use image_file::ImageFile;

/// Route `log` records into the `tracing` subscriber installed by
/// `planogram_core::init_tracing`.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    planogram_core::init_tracing(json);
    // no-op when the subscriber already installed its own bridge
    let _ = tracing_log::LogTracer::init();
}
