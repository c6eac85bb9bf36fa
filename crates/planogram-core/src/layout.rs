//! Reference planogram layouts.
//!
//! A layout file holds one row per expected product, five whitespace-separated
//! numbers per row: `class_id x_center y_center width height`, normalized to
//! the reference image. Rows are converted to corner-encoded boxes on read.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{BoundingBox, PixelBox};

const COLUMNS: usize = 5;

/// Errors raised while reading a layout. Parsing aborts on the first one.
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line_no} '{line}' has {found} columns, expected 5")]
    ColumnCount {
        line_no: usize,
        line: String,
        found: usize,
    },
    #[error("line {line_no} '{line}': '{token}' is not a number")]
    InvalidNumber {
        line_no: usize,
        line: String,
        token: String,
    },
}

impl LayoutError {
    /// Raw text of the offending line, when the error is a format error.
    pub fn line(&self) -> Option<&str> {
        match self {
            LayoutError::Io(_) => None,
            LayoutError::ColumnCount { line, .. } | LayoutError::InvalidNumber { line, .. } => {
                Some(line)
            }
        }
    }
}

/// One expected product placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Class id as written in the file (integer-valued in practice).
    pub class_id: f64,
    pub bbox: BoundingBox,
}

impl ReferenceEntry {
    /// Class id as an index, if it is a non-negative integer.
    pub fn class_index(&self) -> Option<u32> {
        let c = self.class_id;
        if c >= 0.0 && c.fract() == 0.0 && c <= u32::MAX as f64 {
            Some(c as u32)
        } else {
            None
        }
    }

    /// Render back to the center/size row format.
    pub fn to_line(&self) -> String {
        let c = self.bbox.center();
        format!(
            "{} {} {} {} {}",
            self.class_id,
            c.x,
            c.y,
            self.bbox.width(),
            self.bbox.height()
        )
    }

    fn parse_line(line_no: usize, line: &str) -> Result<Self, LayoutError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != COLUMNS {
            return Err(LayoutError::ColumnCount {
                line_no,
                line: line.to_string(),
                found: tokens.len(),
            });
        }

        let mut v = [0.0_f64; COLUMNS];
        for (slot, token) in v.iter_mut().zip(&tokens) {
            *slot = token.parse().map_err(|_| LayoutError::InvalidNumber {
                line_no,
                line: line.to_string(),
                token: token.to_string(),
            })?;
        }

        let [class_id, x_center, y_center, width, height] = v;
        Ok(Self {
            class_id,
            bbox: BoundingBox::from_center_size(x_center, y_center, width, height),
        })
    }
}

/// A layout entry mapped onto an image's pixel grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelEntry {
    pub class_id: f64,
    pub bbox: PixelBox,
}

/// Parsed layout, in file order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable {
    pub entries: Vec<ReferenceEntry>,
}

impl LayoutTable {
    /// Parse rows from any buffered reader. Blank lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LayoutError> {
        let mut entries = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            entries.push(ReferenceEntry::parse_line(idx + 1, line)?);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceEntry> {
        self.entries.iter()
    }

    /// Render the table back to layout-file text, one row per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for e in &self.entries {
            let _ = writeln!(out, "{}", e.to_line());
        }
        out
    }

    /// Every entry's box mapped to pixels for an image of the given size.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> Vec<PixelEntry> {
        self.entries
            .iter()
            .map(|e| PixelEntry {
                class_id: e.class_id,
                bbox: e.bbox.to_pixels(image_width, image_height),
            })
            .collect()
    }

    /// Same table with boxes scaled by the image size, without truncation.
    pub fn scaled(&self, image_width: u32, image_height: u32) -> Self {
        let (sx, sy) = (image_width as f64, image_height as f64);
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| ReferenceEntry {
                    class_id: e.class_id,
                    bbox: e.bbox.scaled(sx, sy),
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LayoutTable {
    type Item = &'a ReferenceEntry;
    type IntoIter = std::slice::Iter<'a, ReferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse layout text held in memory.
pub fn parse_layout(text: &str) -> Result<LayoutTable, LayoutError> {
    LayoutTable::from_reader(text.as_bytes())
}

/// Read a layout file. The file is closed before returning, on success or error.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path)))]
pub fn read_reference_file(path: impl AsRef<Path>) -> Result<LayoutTable, LayoutError> {
    let path = path.as_ref();
    let table = {
        let file = File::open(path)?;
        LayoutTable::from_reader(BufReader::new(file))?
    };
    debug!("read {} layout entries from {}", table.len(), path.display());
    Ok(table)
}
