//! Pixel compositing onto RGBA canvases
//!
//! Positions are signed: layers may hang off any edge of the canvas and are
//! clipped rather than rejected.

use image::{Rgba, RgbaImage};

/// Composite `layer` over `canvas` with its top-left at `(x, y)`.
///
/// Porter-Duff "source over" on straight (non-premultiplied) alpha.
pub fn alpha_composite(canvas: &mut RgbaImage, layer: &RgbaImage, x: i64, y: i64) {
    for_each_overlap(canvas, layer, x, y, |canvas, dest_x, dest_y, src| {
        if src[3] == 0 {
            return;
        }
        let dst = canvas.get_pixel(dest_x, dest_y);
        let blended = source_over(src, dst);
        canvas.put_pixel(dest_x, dest_y, blended);
    });
}

/// Copy `layer` onto `canvas` at `(x, y)`, replacing pixels outright.
///
/// Used where semi-transparent borders must not stack up.
pub fn paste(canvas: &mut RgbaImage, layer: &RgbaImage, x: i64, y: i64) {
    for_each_overlap(canvas, layer, x, y, |canvas, dest_x, dest_y, src| {
        canvas.put_pixel(dest_x, dest_y, *src);
    });
}

fn for_each_overlap<F>(canvas: &mut RgbaImage, layer: &RgbaImage, x: i64, y: i64, mut apply: F)
where
    F: FnMut(&mut RgbaImage, u32, u32, &Rgba<u8>),
{
    let canvas_width = canvas.width() as i64;
    let canvas_height = canvas.height() as i64;

    for (sy, row) in layer.rows().enumerate() {
        let dest_y = y + sy as i64;
        if dest_y < 0 {
            continue;
        }
        if dest_y >= canvas_height {
            break;
        }

        for (sx, pixel) in row.enumerate() {
            let dest_x = x + sx as i64;
            if dest_x < 0 {
                continue;
            }
            if dest_x >= canvas_width {
                break;
            }
            apply(canvas, dest_x as u32, dest_y as u32, pixel);
        }
    }
}

/// Blend `src` over `dst`.
pub(crate) fn source_over(src: &Rgba<u8>, dst: &Rgba<u8>) -> Rgba<u8> {
    let src_alpha = src[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;

    // out_alpha = src_alpha + dst_alpha * (1 - src_alpha)
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let composite = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let result = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        composite(src[0], dst[0]),
        composite(src[1], dst[1]),
        composite(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
