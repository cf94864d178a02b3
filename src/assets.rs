//! Asset lookup for sheets, decorative icons, the card template and fonts
//!
//! Rendering never touches the filesystem directly; it asks an
//! [`AssetStore`]. [`DirAssets`] reads the configured directories and
//! [`MemoryAssets`] serves images held in memory.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::config::PathsConfig;
use crate::text::Face;

/// Kind of resource an asset lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Sheet,
    Icon,
    Template,
    Font,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Sheet => "sheet",
            AssetKind::Icon => "icon",
            AssetKind::Template => "template",
            AssetKind::Font => "font",
        };
        f.write_str(name)
    }
}

/// Error loading an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// No asset with this identifier exists
    #[error("Missing {kind} '{id}'")]
    NotFound { kind: AssetKind, id: String },
    /// The file exists but is not a decodable image
    #[error("Cannot decode {kind} '{id}': {source}")]
    Decode {
        kind: AssetKind,
        id: String,
        #[source]
        source: image::ImageError,
    },
    /// The file exists but is not a usable font
    #[error("Invalid font '{id}'")]
    InvalidFont { id: String },
    /// Other I/O failure reading an asset
    #[error("Cannot read {kind} '{id}': {source}")]
    Io {
        kind: AssetKind,
        id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Source of every image and font the renderer needs.
pub trait AssetStore {
    /// Sprite sheet by name, without extension.
    fn sheet(&self, name: &str) -> Result<RgbaImage, AssetError>;

    /// Decorative icon by category name (also `Chooseable`).
    fn icon(&self, name: &str) -> Result<RgbaImage, AssetError>;

    /// Background every infographic is drawn on.
    fn template(&self) -> Result<RgbaImage, AssetError>;

    /// Face for quest titles.
    fn title_face(&self) -> Result<Face, AssetError>;

    /// Face for quantity badges.
    fn quantity_face(&self) -> Result<Face, AssetError>;
}

/// Assets read from directories on disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    sheets: PathBuf,
    icons: PathBuf,
    template: PathBuf,
    title_font: PathBuf,
    quantity_font: Option<PathBuf>,
}

impl DirAssets {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            sheets: paths.sheets.clone(),
            icons: paths.icons.clone(),
            template: paths.template.clone(),
            title_font: paths.title_font.clone(),
            quantity_font: paths.quantity_font.clone(),
        }
    }

    fn load_image(path: &Path, kind: AssetKind, id: &str) -> Result<RgbaImage, AssetError> {
        if !path.exists() {
            return Err(AssetError::NotFound { kind, id: id.to_string() });
        }
        let image = image::open(path).map_err(|source| AssetError::Decode {
            kind,
            id: id.to_string(),
            source,
        })?;
        tracing::debug!(%kind, id, path = %path.display(), "loaded image");
        Ok(image.to_rgba8())
    }

    fn load_face(path: &Path) -> Result<Face, AssetError> {
        let id = path.display().to_string();
        let bytes = fs::read(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound {
                kind: AssetKind::Font,
                id: id.clone(),
            },
            _ => AssetError::Io {
                kind: AssetKind::Font,
                id: id.clone(),
                source,
            },
        })?;
        Face::from_font_bytes(bytes).ok_or(AssetError::InvalidFont { id })
    }
}

impl AssetStore for DirAssets {
    fn sheet(&self, name: &str) -> Result<RgbaImage, AssetError> {
        Self::load_image(&self.sheets.join(format!("{}.png", name)), AssetKind::Sheet, name)
    }

    fn icon(&self, name: &str) -> Result<RgbaImage, AssetError> {
        Self::load_image(&self.icons.join(format!("{}.png", name)), AssetKind::Icon, name)
    }

    fn template(&self) -> Result<RgbaImage, AssetError> {
        let id = self.template.display().to_string();
        Self::load_image(&self.template, AssetKind::Template, &id)
    }

    fn title_face(&self) -> Result<Face, AssetError> {
        Self::load_face(&self.title_font)
    }

    fn quantity_face(&self) -> Result<Face, AssetError> {
        match &self.quantity_font {
            Some(path) => Self::load_face(path),
            None => Ok(Face::pixel()),
        }
    }
}

/// Where a [`MemoryAssets`] face comes from.
#[derive(Debug, Clone)]
enum FontSource {
    Bytes(Vec<u8>),
    Pixel,
}

/// Assets held in memory.
///
/// Like [`DirAssets`], the title face must be set explicitly and is
/// `NotFound` otherwise. The quantity face falls back to the pixel digits.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    sheets: HashMap<String, RgbaImage>,
    icons: HashMap<String, RgbaImage>,
    template: Option<RgbaImage>,
    title_font: Option<FontSource>,
    quantity_font: Option<FontSource>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, sheet: RgbaImage) -> Self {
        self.sheets.insert(name.into(), sheet);
        self
    }

    pub fn with_icon(mut self, name: impl Into<String>, icon: RgbaImage) -> Self {
        self.icons.insert(name.into(), icon);
        self
    }

    pub fn with_template(mut self, template: RgbaImage) -> Self {
        self.template = Some(template);
        self
    }

    /// Use TTF/OTF bytes for titles.
    pub fn with_title_font(mut self, bytes: Vec<u8>) -> Self {
        self.title_font = Some(FontSource::Bytes(bytes));
        self
    }

    /// Draw titles with the built-in pixel face. Only digits have glyphs.
    pub fn with_pixel_title(mut self) -> Self {
        self.title_font = Some(FontSource::Pixel);
        self
    }

    /// Use TTF/OTF bytes for quantity badges instead of the pixel face.
    pub fn with_quantity_font(mut self, bytes: Vec<u8>) -> Self {
        self.quantity_font = Some(FontSource::Bytes(bytes));
        self
    }

    fn face(source: &FontSource, id: &str) -> Result<Face, AssetError> {
        match source {
            FontSource::Bytes(bytes) => Face::from_font_bytes(bytes.clone())
                .ok_or(AssetError::InvalidFont { id: id.to_string() }),
            FontSource::Pixel => Ok(Face::pixel()),
        }
    }
}

impl AssetStore for MemoryAssets {
    fn sheet(&self, name: &str) -> Result<RgbaImage, AssetError> {
        self.sheets.get(name).cloned().ok_or(AssetError::NotFound {
            kind: AssetKind::Sheet,
            id: name.to_string(),
        })
    }

    fn icon(&self, name: &str) -> Result<RgbaImage, AssetError> {
        self.icons.get(name).cloned().ok_or(AssetError::NotFound {
            kind: AssetKind::Icon,
            id: name.to_string(),
        })
    }

    fn template(&self) -> Result<RgbaImage, AssetError> {
        self.template.clone().ok_or(AssetError::NotFound {
            kind: AssetKind::Template,
            id: "template".to_string(),
        })
    }

    fn title_face(&self) -> Result<Face, AssetError> {
        match &self.title_font {
            Some(source) => Self::face(source, "title"),
            None => Err(AssetError::NotFound {
                kind: AssetKind::Font,
                id: "title".to_string(),
            }),
        }
    }

    fn quantity_face(&self) -> Result<Face, AssetError> {
        Self::face(self.quantity_font.as_ref().unwrap_or(&FontSource::Pixel), "quantity")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_memory_missing_sheet() {
        let assets = MemoryAssets::new();
        let err = assets.sheet("lofiObj").unwrap_err();
        assert!(matches!(
            err,
            AssetError::NotFound { kind: AssetKind::Sheet, ref id } if id == "lofiObj"
        ));
        assert_eq!(err.to_string(), "Missing sheet 'lofiObj'");
    }

    #[test]
    fn test_memory_lookup() {
        let sheet = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
        let assets = MemoryAssets::new().with_sheet("misc", sheet.clone());
        assert_eq!(assets.sheet("misc").unwrap(), sheet);
        assert!(matches!(assets.quantity_face().unwrap(), Face::Pixel(_)));
    }

    #[test]
    fn test_memory_title_face_must_be_set() {
        let err = MemoryAssets::new().title_face().unwrap_err();
        assert!(matches!(err, AssetError::NotFound { kind: AssetKind::Font, .. }));

        let assets = MemoryAssets::new().with_pixel_title();
        assert!(matches!(assets.title_face(), Ok(Face::Pixel(_))));

        let assets = MemoryAssets::new().with_title_font(b"not a font".to_vec());
        assert!(matches!(assets.title_face(), Err(AssetError::InvalidFont { .. })));
    }

    #[test]
    fn test_dir_assets_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let sheets = dir.path().join("sheets");
        fs::create_dir_all(&sheets).unwrap();
        let sheet = RgbaImage::from_pixel(16, 8, Rgba([9, 8, 7, 255]));
        sheet.save(sheets.join("misc.png")).unwrap();

        let paths = PathsConfig { sheets, ..PathsConfig::default() };
        let assets = DirAssets::new(&paths);
        assert_eq!(assets.sheet("misc").unwrap(), sheet);
        assert!(matches!(assets.sheet("nope"), Err(AssetError::NotFound { .. })));
    }

    #[test]
    fn test_dir_assets_missing_font() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathsConfig {
            title_font: dir.path().join("title.ttf"),
            ..PathsConfig::default()
        };
        let assets = DirAssets::new(&paths);
        assert!(matches!(
            assets.title_face(),
            Err(AssetError::NotFound { kind: AssetKind::Font, .. })
        ));
        assert!(matches!(assets.quantity_face(), Ok(Face::Pixel(_))));
    }

    #[test]
    fn test_dir_assets_rejects_garbage_font() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("title.ttf");
        fs::write(&font, b"not a font").unwrap();
        let paths = PathsConfig {
            title_font: font,
            ..PathsConfig::default()
        };
        assert!(matches!(
            DirAssets::new(&paths).title_face(),
            Err(AssetError::InvalidFont { .. })
        ));
    }
}
