//! JSON configuration and report helpers for compliance checks.

use crate::{
    check_compliance, read_reference_file, transform_bounding_box, CanvasSize, ComplianceParams,
    ComplianceReport, Detection, GeometryError, Homography, LayoutError,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum PlanogramIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors from an end-to-end compliance check.
#[derive(thiserror::Error, Debug)]
pub enum PlanogramError {
    #[error(transparent)]
    Io(#[from] PlanogramIoError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error("image size unknown: set `image_size` or `image_path`")]
    MissingImageSize,
    #[error("detection {index}: {source}")]
    Detection {
        index: usize,
        #[source]
        source: GeometryError,
    },
}

/// Configuration for one compliance check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanogramCheckConfig {
    /// Reference layout file (normalized rows).
    pub layout_path: String,
    /// JSON array of detections in image pixels.
    pub detections_path: String,
    /// Size of the image the detections come from.
    #[serde(default)]
    pub image_size: Option<CanvasSize>,
    /// Image to probe for its size when `image_size` is absent.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Image-to-map homography, row major. Absent means detections are
    /// already in the layout's frame.
    #[serde(default)]
    pub homography: Option<[[f64; 3]; 3]>,
    /// Size of the map the homography projects into; defaults to the image size.
    #[serde(default)]
    pub map_size: Option<CanvasSize>,
    #[serde(default)]
    pub compliance: ComplianceParams,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl PlanogramCheckConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PlanogramIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PlanogramIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("planogram_report.json"))
    }

    pub fn homography(&self) -> Option<Homography> {
        self.homography.map(Homography::from_array)
    }

    /// Size of the detection image, from the config or by probing the file.
    pub fn resolve_image_size(&self) -> Result<CanvasSize, PlanogramError> {
        if let Some(size) = self.image_size {
            return Ok(size);
        }
        #[cfg(feature = "image")]
        if let Some(path) = self.image_path.as_deref() {
            use planogram_core::ImageDimensions;
            return Ok(crate::ImageFile::probe(path)?.canvas());
        }
        Err(PlanogramError::MissingImageSize)
    }
}

/// Read a JSON array of detections.
pub fn load_detections(path: impl AsRef<Path>) -> Result<Vec<Detection>, PlanogramIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Run the full pipeline described by `cfg`.
///
/// Without a homography the layout is scaled to the image size; with one,
/// detections are projected into the map and the layout is scaled to the map.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg)))]
pub fn run_check(cfg: &PlanogramCheckConfig) -> Result<ComplianceReport, PlanogramError> {
    let layout = read_reference_file(&cfg.layout_path)?;
    let detections = load_detections(&cfg.detections_path)?;
    let image_size = cfg.resolve_image_size()?;
    info!(
        "layout entries: {}, detections: {}, image {}x{}",
        layout.len(),
        detections.len(),
        image_size.width,
        image_size.height
    );

    let (target, detections) = match cfg.homography() {
        None => (image_size, detections),
        Some(h) => {
            let target = cfg.map_size.unwrap_or(image_size);
            let mapped = project_detections(&detections, &h, target)?;
            debug!("projected {} detections into the map", mapped.len());
            (target, mapped)
        }
    };

    let layout = layout.scaled(target.width, target.height);
    Ok(check_compliance(&layout, &detections, &cfg.compliance))
}

/// Project every detection box through `h` into `target`.
pub fn project_detections(
    detections: &[Detection],
    h: &Homography,
    target: CanvasSize,
) -> Result<Vec<Detection>, PlanogramError> {
    detections
        .iter()
        .enumerate()
        .map(|(index, d)| {
            let bbox = transform_bounding_box(&d.bbox, h, target)
                .map_err(|source| PlanogramError::Detection { index, source })?;
            Ok(Detection { bbox, ..*d })
        })
        .collect()
}

/// Report written by the `check` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanogramCheckReport {
    pub layout_path: String,
    pub detections_path: String,
    pub config_path: String,
    #[serde(default)]
    pub compliance: Option<ComplianceReport>,
    #[serde(default)]
    pub compliance_ratio: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PlanogramCheckReport {
    /// Build an empty report for `cfg`.
    pub fn new(cfg: &PlanogramCheckConfig, config_path: &Path) -> Self {
        Self {
            layout_path: cfg.layout_path.clone(),
            detections_path: cfg.detections_path.clone(),
            config_path: config_path.to_string_lossy().into_owned(),
            compliance: None,
            compliance_ratio: None,
            error: None,
        }
    }

    pub fn set_result(&mut self, report: ComplianceReport) {
        self.compliance_ratio = Some(report.compliance_ratio());
        self.compliance = Some(report);
        self.error = None;
    }

    pub fn set_error(&mut self, err: &PlanogramError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PlanogramIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PlanogramIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_in() {
        let cfg: PlanogramCheckConfig = serde_json::from_str(
            r#"{ "layout_path": "shelf.txt", "detections_path": "dets.json" }"#,
        )
        .expect("parse");
        assert!(cfg.homography().is_none());
        assert_eq!(cfg.compliance.iou_threshold, 0.5);
        assert_eq!(cfg.output_path(), PathBuf::from("planogram_report.json"));
        assert!(matches!(
            cfg.resolve_image_size(),
            Err(PlanogramError::MissingImageSize)
        ));
    }

    #[test]
    fn projection_reports_failing_detection() {
        let h = Homography::from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, -1.0]]);
        let dets = [
            Detection {
                class_id: 0,
                bbox: planogram_core::BoundingBox::new(2.0, 0.0, 3.0, 1.0),
                score: None,
            },
            Detection {
                class_id: 1,
                bbox: planogram_core::BoundingBox::new(0.0, 0.0, 1.0, 1.0),
                score: Some(0.9),
            },
        ];
        let err = project_detections(&dets, &h, CanvasSize::new(10, 10)).expect_err("horizon");
        assert!(matches!(err, PlanogramError::Detection { index: 1, .. }));
    }
}
