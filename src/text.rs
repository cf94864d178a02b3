//! Text drawing without anti-aliasing
//!
//! Quest titles and quantity badges are drawn with hard pixel edges so they
//! match the pixel-art sprites. Outline fonts are rasterized with `ab_glyph`
//! and thresholded at 50% coverage; the built-in [`PixelDigits`] face draws
//! quantities when no font file is configured.

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::blend::source_over;

/// Coverage at or above this is drawn as a solid pixel.
const COVERAGE_THRESHOLD: f32 = 0.5;

/// A typeface text can be drawn with.
pub enum Face {
    /// TrueType/OpenType outlines
    Outline(FontVec),
    /// Built-in blocky digits
    Pixel(PixelDigits),
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::Outline(_) => f.write_str("Face::Outline"),
            Face::Pixel(_) => f.write_str("Face::Pixel"),
        }
    }
}

/// Stroke drawn around every glyph before the fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: u32,
    pub color: Rgba<u8>,
}

impl Face {
    /// Load a font from raw TTF/OTF bytes.
    pub fn from_font_bytes(bytes: Vec<u8>) -> Option<Self> {
        FontVec::try_from_vec(bytes).ok().map(Face::Outline)
    }

    /// The built-in pixel digit face.
    pub fn pixel() -> Self {
        Face::Pixel(PixelDigits)
    }

    /// Horizontal advance of `text` at `size` pixels, kerning included.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match self {
            Face::Outline(font) => {
                let scaled = font.as_scaled(PxScale::from(size));
                let mut width = 0.0;
                let mut previous = None;
                for c in text.chars() {
                    let id = scaled.glyph_id(c);
                    if let Some(prev) = previous {
                        width += scaled.kern(prev, id);
                    }
                    width += scaled.h_advance(id);
                    previous = Some(id);
                }
                width
            }
            Face::Pixel(digits) => digits.measure(text, size) as f32,
        }
    }

    /// Draw `text` with its top-left at `(x, y)`, the stroke (if any) first.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size: f32,
        x: i64,
        y: i64,
        color: Rgba<u8>,
        stroke: Option<Stroke>,
    ) {
        let mask = self.coverage_mask(text, size);

        if let Some(stroke) = stroke {
            let w = stroke.width as i64;
            for dy in -w..=w {
                for dx in -w..=w {
                    if dx * dx + dy * dy <= w * w {
                        mask.fill(canvas, x + dx, y + dy, stroke.color);
                    }
                }
            }
        }
        mask.fill(canvas, x, y, color);
    }

    fn coverage_mask(&self, text: &str, size: f32) -> Mask {
        match self {
            Face::Outline(font) => outline_mask(font, text, size),
            Face::Pixel(digits) => digits.mask(text, size),
        }
    }
}

/// Set of pixel offsets covered by rendered text, relative to its top-left.
#[derive(Debug, Default)]
struct Mask {
    points: Vec<(i64, i64)>,
}

impl Mask {
    fn fill(&self, canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
        let (width, height) = (canvas.width() as i64, canvas.height() as i64);
        for &(px, py) in &self.points {
            let (cx, cy) = (x + px, y + py);
            if cx < 0 || cy < 0 || cx >= width || cy >= height {
                continue;
            }
            let dst = *canvas.get_pixel(cx as u32, cy as u32);
            canvas.put_pixel(cx as u32, cy as u32, source_over(&color, &dst));
        }
    }
}

fn outline_mask(font: &FontVec, text: &str, size: f32) -> Mask {
    let scaled = font.as_scaled(PxScale::from(size));
    let ascent = scaled.ascent();
    let mut mask = Mask::default();
    let mut caret = 0.0f32;
    let mut previous = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(PxScale::from(size), point(caret, ascent));
        caret += scaled.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            if coverage >= COVERAGE_THRESHOLD {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                mask.points.push((x, y));
            }
        });
    }

    mask
}

/// 3x5 pixel digits, scaled up to the requested size.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelDigits;

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;

/// Rows of each digit, most significant bit on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

impl PixelDigits {
    /// Size of one glyph pixel for a font size.
    fn dot(size: f32) -> u32 {
        ((size / GLYPH_HEIGHT as f32).floor() as u32).max(1)
    }

    fn measure(&self, text: &str, size: f32) -> u32 {
        let advance = (GLYPH_WIDTH + 1) * Self::dot(size);
        text.chars().count() as u32 * advance
    }

    fn mask(&self, text: &str, size: f32) -> Mask {
        let dot = Self::dot(size) as i64;
        let advance = (GLYPH_WIDTH as i64 + 1) * dot;
        let mut mask = Mask::default();

        // characters other than digits advance without ink
        let digits = text.chars().enumerate().filter_map(|(i, c)| c.to_digit(10).map(|d| (i, d)));
        for (i, digit) in digits {
            let origin_x = i as i64 * advance;
            for (row, bits) in DIGITS[digit as usize].iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    for dy in 0..dot {
                        for dx in 0..dot {
                            let x = origin_x + col as i64 * dot + dx;
                            mask.points.push((x, row as i64 * dot + dy));
                        }
                    }
                }
            }
        }

        mask
    }
}
