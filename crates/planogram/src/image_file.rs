use std::path::{Path, PathBuf};

use planogram_core::{CanvasSize, ImageDimensions};

/// An image on disk whose size was read from its header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub size: CanvasSize,
}

impl ImageFile {
    /// Read the dimensions of `path` without decoding pixel data.
    pub fn probe(path: impl AsRef<Path>) -> Result<Self, ::image::ImageError> {
        let path = path.as_ref();
        let (width, height) = ::image::image_dimensions(path)?;
        log::debug!("{}: {}x{}", path.display(), width, height);
        Ok(Self {
            path: path.to_path_buf(),
            size: CanvasSize { width, height },
        })
    }
}

impl ImageDimensions for ImageFile {
    fn dimensions(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }
}
