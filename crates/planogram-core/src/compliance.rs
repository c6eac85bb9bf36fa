//! Placement compliance: match detections against a reference layout.
//!
//! Reference boxes and detections must already share a coordinate space
//! (see [`LayoutTable::scaled`](crate::LayoutTable::scaled) and
//! [`transform_bounding_box`](crate::transform_bounding_box)). Pairs are
//! formed greedily, highest IoU first, each detection used at most once.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{try_iou, BoundingBox, LayoutTable};

/// One detector output in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub score: Option<f32>,
}

fn default_iou_threshold() -> f64 {
    0.5
}

/// Compliance matching settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComplianceParams {
    /// Minimum IoU for a detection to occupy a reference slot.
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f64,
    /// Ignore detections scoring below this confidence.
    #[serde(default)]
    pub min_score: Option<f32>,
}

impl Default for ComplianceParams {
    fn default() -> Self {
        Self {
            iou_threshold: default_iou_threshold(),
            min_score: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotStatus {
    Compliant,
    WrongProduct { found: u32 },
    Missing,
}

/// Outcome for one reference entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotResult {
    pub index: usize,
    pub expected_class: f64,
    pub reference: BoundingBox,
    #[serde(flatten)]
    pub status: SlotStatus,
    /// Index into the detection list, when matched.
    pub detection: Option<usize>,
    pub iou: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub slots: Vec<SlotResult>,
    /// Detections that did not occupy any reference slot.
    pub unexpected: Vec<usize>,
}

impl ComplianceReport {
    pub fn count(&self, pred: impl Fn(&SlotStatus) -> bool) -> usize {
        self.slots.iter().filter(|s| pred(&s.status)).count()
    }

    pub fn compliant(&self) -> usize {
        self.count(|s| matches!(s, SlotStatus::Compliant))
    }

    pub fn missing(&self) -> usize {
        self.count(|s| matches!(s, SlotStatus::Missing))
    }

    pub fn wrong_product(&self) -> usize {
        self.count(|s| matches!(s, SlotStatus::WrongProduct { .. }))
    }

    /// Fraction of compliant slots; an empty layout is fully compliant.
    pub fn compliance_ratio(&self) -> f64 {
        if self.slots.is_empty() {
            return 1.0;
        }
        self.compliant() as f64 / self.slots.len() as f64
    }
}

/// Compare `detections` against `layout` (both in the same space).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(slots = layout.len(), detections = detections.len()))
)]
pub fn check_compliance(
    layout: &LayoutTable,
    detections: &[Detection],
    params: &ComplianceParams,
) -> ComplianceReport {
    let usable = |d: &Detection| match (params.min_score, d.score) {
        (Some(min), Some(score)) => score >= min,
        _ => true,
    };

    let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
    for (ri, entry) in layout.iter().enumerate() {
        for (di, det) in detections.iter().enumerate().filter(|(_, d)| usable(d)) {
            match try_iou(&entry.bbox, &det.bbox) {
                Ok(v) if v >= params.iou_threshold && v > 0.0 => candidates.push((ri, di, v)),
                Ok(_) => {}
                Err(err) => warn!("skipping slot {ri} vs detection {di}: {err}"),
            }
        }
    }
    candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut slot_match: Vec<Option<(usize, f64)>> = vec![None; layout.len()];
    let mut used = vec![false; detections.len()];
    for (ri, di, v) in candidates {
        if slot_match[ri].is_none() && !used[di] {
            slot_match[ri] = Some((di, v));
            used[di] = true;
        }
    }

    let slots = layout
        .iter()
        .zip(slot_match)
        .enumerate()
        .map(|(index, (entry, m))| {
            let status = match m {
                None => SlotStatus::Missing,
                Some((di, _)) => {
                    let found = detections[di].class_id;
                    if entry.class_index() == Some(found) {
                        SlotStatus::Compliant
                    } else {
                        SlotStatus::WrongProduct { found }
                    }
                }
            };
            SlotResult {
                index,
                expected_class: entry.class_id,
                reference: entry.bbox,
                status,
                detection: m.map(|(di, _)| di),
                iou: m.map(|(_, v)| v),
            }
        })
        .collect();

    let unexpected = used
        .iter()
        .enumerate()
        .filter(|(di, u)| !**u && usable(&detections[*di]))
        .map(|(di, _)| di)
        .collect();

    let report = ComplianceReport { slots, unexpected };
    debug!(
        "compliance: {} ok, {} wrong, {} missing, {} unexpected",
        report.compliant(),
        report.wrong_product(),
        report.missing(),
        report.unexpected.len()
    );
    report
}
