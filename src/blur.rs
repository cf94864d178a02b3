//! Gaussian blur for drop shadows
//!
//! `radius` is the standard deviation of the Gaussian, so a radius of 2.5
//! spreads a silhouette roughly 7 pixels out. The kernel is applied in two
//! separable passes with edge pixels clamped.

use image::{Rgba, RgbaImage};

/// Kernel extends this many standard deviations each side.
const KERNEL_SPAN: f32 = 3.0;

/// Blur an image, returning a new buffer. Radii at or below zero copy the input.
pub fn gaussian_blur(image: &RgbaImage, radius: f32) -> RgbaImage {
    if radius <= 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    let kernel = generate_gaussian_kernel(radius);
    let horizontal = convolve(image, &kernel, Axis::Horizontal);
    convolve(&horizontal, &kernel, Axis::Vertical)
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Generate a normalized 1D Gaussian kernel.
fn generate_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let half = (sigma * KERNEL_SPAN).ceil().max(1.0) as i32;
    let sigma2 = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-half..=half).map(|d| (-((d * d) as f32) / sigma2).exp()).collect();
    let sum: f32 = kernel.iter().sum();

    // Normalize
    for w in &mut kernel {
        *w /= sum;
    }

    kernel
}

fn convolve(image: &RgbaImage, kernel: &[f32], axis: Axis) -> RgbaImage {
    let (width, height) = image.dimensions();
    let half = (kernel.len() / 2) as i32;

    RgbaImage::from_fn(width, height, |x, y| {
        let mut acc = [0.0f32; 4];

        for (k, weight) in kernel.iter().enumerate() {
            let offset = k as i32 - half;
            let (px, py) = match axis {
                Axis::Horizontal => ((x as i32 + offset).clamp(0, width as i32 - 1) as u32, y),
                Axis::Vertical => (x, (y as i32 + offset).clamp(0, height as i32 - 1) as u32),
            };

            let pixel = image.get_pixel(px, py);
            for c in 0..4 {
                acc[c] += pixel[c] as f32 * weight;
            }
        }

        Rgba(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernel_generation() {
        let kernel = generate_gaussian_kernel(1.0);
        assert_eq!(kernel.len(), 7);

        // Sum should be 1.0 (normalized)
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 0.001);

        // Center should be highest weight, symmetric
        assert!(kernel[3] > kernel[2]);
        assert!((kernel[0] - kernel[6]).abs() < f32::EPSILON);
    }

    #[test]
    fn test_small_radius_still_blurs() {
        let kernel = generate_gaussian_kernel(0.25);
        assert_eq!(kernel.len(), 3);
    }

    #[test]
    fn test_zero_radius_is_copy() {
        let mut img = RgbaImage::new(3, 3);
        img.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        assert_eq!(gaussian_blur(&img, 0.0), img);
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let img = RgbaImage::from_pixel(5, 4, Rgba([10, 20, 30, 200]));
        assert_eq!(gaussian_blur(&img, 2.0), img);
    }

    #[test]
    fn test_point_spreads_alpha() {
        let mut img = RgbaImage::new(9, 9);
        img.put_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let blurred = gaussian_blur(&img, 1.0);

        let center = blurred.get_pixel(4, 4)[3];
        let near = blurred.get_pixel(5, 4)[3];
        let far = blurred.get_pixel(8, 4)[3];
        assert!(center < 255);
        assert!(center > near);
        assert!(near > far);
        // symmetric spread
        assert_eq!(blurred.get_pixel(3, 4)[3], near);
        assert_eq!(blurred.get_pixel(4, 5)[3], near);
    }
}
