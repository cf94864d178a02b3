//! Icon rendering - shadowed, outlined, upscaled item icons
//!
//! An icon is the sprite scaled by `upscale`, sitting in a one-cell
//! transparent margin, with a soft black shadow, a one pixel black outline
//! and an optional quantity badge in the top-left corner.
//!
//! Layer order:
//!
//! | Step | Layer |
//! |------|-------|
//! | 1 | silhouette, blurred by `upscale / 2` |
//! | 2 | silhouette again, whole canvas blurred by `upscale / 4` |
//! | 3 | silhouette at the four diagonal 1px offsets (outline) |
//! | 4 | upscaled sprite |
//! | 5 | quantity text, black at the diagonals then white |

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::blend::alpha_composite;
use crate::blur::gaussian_blur;
use crate::text::Face;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const DIAGONALS: [(i64, i64); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Quantity text origin inside the icon.
const QUANTITY_ORIGIN: (i64, i64) = (1, 1);

/// Solid black copy of `image`: every pixel with any alpha becomes opaque
/// black, fully transparent pixels stay transparent.
pub fn create_silhouette(image: &RgbaImage) -> RgbaImage {
    let mut silhouette = RgbaImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            silhouette.put_pixel(x, y, BLACK);
        }
    }
    silhouette
}

/// Side length of an icon for a sprite `size` pixels wide.
pub fn icon_size(size: u32, upscale: u32) -> u32 {
    (size + 2) * upscale
}

/// Renders item icons with a fixed badge face.
#[derive(Debug)]
pub struct IconRenderer<'a> {
    face: &'a Face,
    font_size: f32,
}

impl<'a> IconRenderer<'a> {
    pub fn new(face: &'a Face, font_size: f32) -> Self {
        Self { face, font_size }
    }

    /// Render `sprite` as an icon. A quantity of 0 draws no badge.
    pub fn render(&self, sprite: &RgbaImage, quantity: u32, upscale: u32) -> RgbaImage {
        let upscale = upscale.max(1);
        let (width, height) = sprite.dimensions();
        let scaled = (width * upscale, height * upscale);
        let margin = upscale as i64;

        let mut canvas = RgbaImage::new((width + 2) * upscale, (height + 2) * upscale);

        let silhouette =
            imageops::resize(&create_silhouette(sprite), scaled.0, scaled.1, FilterType::Nearest);

        alpha_composite(&mut canvas, &silhouette, margin, margin);
        canvas = gaussian_blur(&canvas, upscale as f32 / 2.0);
        alpha_composite(&mut canvas, &silhouette, margin, margin);
        canvas = gaussian_blur(&canvas, upscale as f32 / 4.0);

        for (dx, dy) in DIAGONALS {
            alpha_composite(&mut canvas, &silhouette, margin + dx, margin + dy);
        }

        let upscaled = imageops::resize(sprite, scaled.0, scaled.1, FilterType::Nearest);
        alpha_composite(&mut canvas, &upscaled, margin, margin);

        if quantity == 0 {
            return canvas;
        }

        let text = quantity.to_string();
        let (qx, qy) = QUANTITY_ORIGIN;
        for (dx, dy) in DIAGONALS {
            self.face.draw(&mut canvas, &text, self.font_size, qx + dx, qy + dy, BLACK, None);
        }
        self.face.draw(&mut canvas, &text, self.font_size, qx, qy, WHITE, None);

        canvas
    }
}

/// Composite contained-item badges down the left edge of `base`.
///
/// Each badge is resized to `badge_size` and placed at
/// `y = (base_width - badge_size) / count * index`.
pub fn overlay_contained(base: &mut RgbaImage, badges: &[RgbaImage], badge_size: u32) {
    if badges.is_empty() {
        return;
    }
    let step = base.width().saturating_sub(badge_size) / badges.len() as u32;

    for (index, badge) in badges.iter().enumerate() {
        let resized = imageops::resize(badge, badge_size, badge_size, FilterType::Nearest);
        alpha_composite(base, &resized, 0, (step * index as u32) as i64);
    }
}
