//! Icon group layout and vertical stacking
//!
//! A group is a fixed canvas (160x80 by default) holding up to eight icons in
//! centered rows of four. Finished cards are stacked top to bottom with their
//! frame borders overlapping.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use thiserror::Error;

use crate::blend::{alpha_composite, paste};
use crate::config::{LayoutConfig, RenderConfig};

/// Error laying out icons or cards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// More icons than a group can hold
    #[error("Too many icons in group: {count} (at most {max})")]
    TooManyImages { count: usize, max: usize },
    /// Nothing to stack
    #[error("No images to stack")]
    NothingToStack,
}

/// Geometry of an icon group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLayout {
    pub width: u32,
    pub height: u32,
    pub row_length: usize,
    pub max_images: usize,
    /// Icon size for groups of zero or one
    pub large_size: u32,
    /// Icon size for groups of two or more
    pub small_size: u32,
}

impl Default for GroupLayout {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default(), &LayoutConfig::default())
    }
}

/// Where one icon goes inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub size: u32,
}

impl GroupLayout {
    pub fn from_config(render: &RenderConfig, layout: &LayoutConfig) -> Self {
        Self {
            width: layout.group_width,
            height: layout.group_height,
            row_length: layout.row_length.max(1) as usize,
            max_images: layout.max_group_images as usize,
            large_size: render.large_size,
            small_size: render.small_size,
        }
    }

    /// Icon size for a group of `count` icons.
    pub fn render_size(&self, count: usize) -> u32 {
        if count < 2 {
            self.large_size
        } else {
            self.small_size
        }
    }

    /// Positions for `count` icons, row-major.
    ///
    /// Each row is centered horizontally and the block of rows vertically:
    /// `start_x = width / 2 - 0.5 * row_len * size`,
    /// `start_y = height / 2 - 0.5 * rows * size`.
    pub fn plan(&self, count: usize) -> Result<Vec<Placement>, LayoutError> {
        if count > self.max_images {
            return Err(LayoutError::TooManyImages { count, max: self.max_images });
        }

        let size = self.render_size(count);
        let rows = count.div_ceil(self.row_length);
        let start_y = (self.height as f64 / 2.0 - 0.5 * rows as f64 * size as f64) as i64;

        let mut placements = Vec::with_capacity(count);
        for row in 0..rows {
            let row_len = (count - row * self.row_length).min(self.row_length);
            let start_x = (self.width as f64 / 2.0 - 0.5 * row_len as f64 * size as f64) as i64;
            let y = start_y + (row as u32 * size) as i64;

            for column in 0..row_len {
                placements.push(Placement {
                    x: start_x + (column as u32 * size) as i64,
                    y,
                    size,
                });
            }
        }

        Ok(placements)
    }
}

/// Lay icons out on a transparent group canvas.
pub fn generate_image_group(
    images: &[RgbaImage],
    layout: &GroupLayout,
) -> Result<RgbaImage, LayoutError> {
    let placements = layout.plan(images.len())?;
    let mut canvas = RgbaImage::new(layout.width, layout.height);

    for (image, placement) in images.iter().zip(&placements) {
        let sized = imageops::resize(image, placement.size, placement.size, FilterType::Nearest);
        alpha_composite(&mut canvas, &sized, placement.x, placement.y);
    }

    Ok(canvas)
}

/// Stack images top to bottom, each overlapping the previous by `overlap` rows.
///
/// Height is the sum of heights minus `overlap` per junction; width is the
/// widest image. Later images replace pixels rather than blend, so shared
/// frame borders are not darkened twice.
pub fn combine_images_vertically(
    images: &[RgbaImage],
    overlap: u32,
) -> Result<RgbaImage, LayoutError> {
    if images.is_empty() {
        return Err(LayoutError::NothingToStack);
    }

    let width = images.iter().map(RgbaImage::width).max().unwrap_or(0);
    let total: u64 = images.iter().map(|i| i.height() as u64).sum();
    let junctions = (images.len() - 1) as u64;
    let height = total.saturating_sub(overlap as u64 * junctions) as u32;

    let mut canvas = RgbaImage::new(width, height);
    let mut y = 0i64;
    for image in images {
        paste(&mut canvas, image, 0, y);
        y += image.height() as i64 - overlap as i64;
    }

    Ok(canvas)
}
