use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ImageError, ImageFormat, RgbImage};
use log::{debug, error};
use tempfile::NamedTempFile;

use crate::error::AuroraError;
use crate::result::Result;

/// Loads and persists the carrier image of a card.
///
/// Implementations hand out plain RGB pixels, alpha and palette images are
/// normalized before any region is computed. `save` must be lossless.
pub trait ImageSurface: Send + Sync {
    fn load(&self, path: &Path) -> Result<RgbImage>;

    fn save(&self, image: &RgbImage, path: &Path) -> Result<()>;
}

/// PNG files on the local file system, decoded and encoded by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct PngSurface;

impl ImageSurface for PngSurface {
    fn load(&self, path: &Path) -> Result<RgbImage> {
        let image = image::open(path).map_err(|source| {
            error!("Error reading image {path:?}: {source}");
            AuroraError::ReadError {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(
            "loaded {path:?} ({}x{}, {:?})",
            image.width(),
            image.height(),
            image.color()
        );

        Ok(image.to_rgb8())
    }

    /// Encodes into a temporary file next to `path` and renames it over the
    /// target, a failed save leaves the previous file intact.
    fn save(&self, image: &RgbImage, path: &Path) -> Result<()> {
        let write_error = |source: ImageError| {
            error!("Error saving image {path:?}: {source}");
            AuroraError::WriteError {
                path: path.to_path_buf(),
                source,
            }
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir).map_err(|e| write_error(e.into()))?;
        if let Ok(existing) = std::fs::metadata(path) {
            staged
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| write_error(e.into()))?;
        }
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            image
                .write_to(&mut writer, ImageFormat::Png)
                .map_err(write_error)?;
            writer.flush().map_err(|e| write_error(e.into()))?;
        }
        staged
            .persist(path)
            .map_err(|e| write_error(e.error.into()))?;

        Ok(())
    }
}
