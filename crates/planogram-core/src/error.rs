/// Degenerate-geometry failures reported by the checked APIs.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("union area is not positive (union={union})")]
    DegenerateUnion { union: f64 },
    #[error("homography is singular (det={det:e})")]
    SingularHomography { det: f64 },
    #[error("corner {index} maps to the line at infinity")]
    PointAtInfinity { index: usize },
}
