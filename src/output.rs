//! PNG output

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error creating the output directory
    #[error("Cannot create directory '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Image encoding error
    #[error("Cannot write '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Save an RGBA image to a PNG file, creating parent directories as needed.
///
/// # Arguments
///
/// * `image` - The image to save
/// * `path` - The output file path
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(OutputError::Io)` if a parent directory cannot be created
/// * `Err(OutputError::Image)` if encoding or writing the PNG fails
///
/// # Example
/// ```ignore
/// let card = compositor.compose(&quest)?;
/// save_png(&card, Path::new("out/quest.png"))?;
/// ```
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| OutputError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    image.save_with_format(path, image::ImageFormat::Png).map_err(|source| {
        OutputError::Image {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "wrote png"
    );
    Ok(())
}
