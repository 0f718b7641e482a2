pub mod manifest_loader;
pub mod synthetic_loader;

use std::fs;
use std::path::Path;

use image::DynamicImage;

use crate::dataset::error::DatasetError;

/// Decode an image file, normalized to 3-channel RGB8.
///
/// Reads the bytes first so a missing file surfaces as `Io` and only a
/// corrupt payload as `Decode`.
pub(crate) fn decode_rgb(path: &Path) -> Result<DynamicImage, DatasetError> {
    let bytes = fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes).map_err(|source| DatasetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}
