use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box as `(xmin, ymin, xmax, ymax)`.
///
/// Units depend on context: layout files carry normalized `[0, 1]`
/// coordinates, detections carry pixels. Corner ordering is not enforced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Build from the center/size encoding used by layout files.
    pub fn from_center_size(x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        let xmin = x_center - width / 2.0;
        let ymin = y_center - height / 2.0;
        Self::new(xmin, ymin, xmin + width, ymin + height)
    }

    pub fn from_array(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Signed area; negative when the corners are swapped on one axis.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            self.xmin + self.width() / 2.0,
            self.ymin + self.height() / 2.0,
        )
    }

    /// Corners in the fixed order top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            Point2::new(self.xmin, self.ymin),
            Point2::new(self.xmax, self.ymin),
            Point2::new(self.xmax, self.ymax),
            Point2::new(self.xmin, self.ymax),
        ]
    }

    /// Smallest axis-aligned box containing all `points`.
    ///
    /// Returns `None` for an empty slice.
    pub fn enclosing(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut out = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            out.xmin = out.xmin.min(p.x);
            out.ymin = out.ymin.min(p.y);
            out.xmax = out.xmax.max(p.x);
            out.ymax = out.ymax.max(p.y);
        }
        Some(out)
    }

    /// Scale normalized coordinates to pixels, truncating toward zero.
    ///
    /// No clamping: coordinates outside `[0, 1]` land outside the image.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> PixelBox {
        let w = image_width as f64;
        let h = image_height as f64;
        PixelBox {
            xmin: (self.xmin * w) as i64,
            ymin: (self.ymin * h) as i64,
            xmax: (self.xmax * w) as i64,
            ymax: (self.ymax * h) as i64,
        }
    }

    /// Scale normalized coordinates to pixels without truncation.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.xmin * sx, self.ymin * sy, self.xmax * sx, self.ymax * sy)
    }
}

/// Integer pixel box produced by [`BoundingBox::to_pixels`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PixelBox {
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

impl PixelBox {
    pub fn to_tuple(self) -> (i64, i64, i64, i64) {
        (self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

impl From<PixelBox> for BoundingBox {
    fn from(b: PixelBox) -> Self {
        BoundingBox::new(b.xmin as f64, b.ymin as f64, b.xmax as f64, b.ymax as f64)
    }
}

/// Free-function form of [`BoundingBox::to_pixels`].
pub fn convert_normalized_to_pixel(
    normalized: &BoundingBox,
    image_width: u32,
    image_height: u32,
) -> PixelBox {
    normalized.to_pixels(image_width, image_height)
}

/// Target surface of a perspective mapping, in pixels.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, p: Point2<f64>) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width as f64 && p.y <= self.height as f64
    }
}

/// Anything that knows its pixel dimensions.
pub trait ImageDimensions {
    fn dimensions(&self) -> (u32, u32);

    fn canvas(&self) -> CanvasSize {
        let (width, height) = self.dimensions();
        CanvasSize { width, height }
    }
}

impl ImageDimensions for CanvasSize {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
