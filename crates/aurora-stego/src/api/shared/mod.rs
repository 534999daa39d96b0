use std::path::{Path, PathBuf};

use crate::{AuroraError, Result};

pub(crate) fn is_jpeg_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false)
}

pub(crate) fn is_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Only PNG keeps the least significant bits intact.
///
/// JPEG targets are refused, any other target gets `.png` appended.
pub(crate) fn png_output_path(path: &Path) -> Result<PathBuf> {
    if is_jpeg_extension(path) {
        return Err(AuroraError::LossyOutputFormat(path.to_path_buf()));
    }
    if is_png_extension(path) {
        return Ok(path.to_path_buf());
    }

    let mut with_png = path.as_os_str().to_owned();
    with_png.push(".png");

    Ok(PathBuf::from(with_png))
}

/// `<dir>/<stem>_embedded.png` next to the source image
pub(crate) fn derived_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "card".to_string());

    source.with_file_name(format!("{stem}_embedded.png"))
}
