//! Alpha blending math for watermark removal.
//!
//! The watermark is composited with forward alpha blending against a white logo:
//! `watermarked = alpha * 255 + (1 - alpha) * original`
//!
//! This module provides the reverse operation to recover original pixels.

use image::RgbaImage;

use crate::mask::Mask;

/// Maximum alpha: clamp to avoid division by near-zero in reverse blending.
///
/// Pixels whose true alpha was above this keep a residual bias.
pub const MAX_ALPHA: f64 = 0.99;

/// Logo color value (white).
const LOGO_VALUE: f64 = 255.0;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Remove the watermark from a region in place using reverse alpha blending.
///
/// Applies `original = (watermarked - alpha * 255) / (1 - alpha)` to the R, G
/// and B channels of every pixel. The region's own alpha channel is untouched.
/// Pixels where the mask alpha is exactly zero are left unchanged; elsewhere
/// alpha is clamped to [`MAX_ALPHA`].
///
/// # Panics
///
/// Panics if `region` and `mask` differ in dimensions.
pub fn blend(region: &mut RgbaImage, mask: &Mask) {
    assert_eq!(
        region.dimensions(),
        mask.pixels().dimensions(),
        "region and mask must have identical dimensions"
    );

    for (x, y, px) in region.enumerate_pixels_mut() {
        let alpha = mask.alpha_at(x, y);
        if alpha == 0.0 {
            continue;
        }

        let alpha = alpha.min(MAX_ALPHA);
        let inv_alpha = 1.0 - alpha;

        for ch in 0..3 {
            let watermarked = f64::from(px[ch]);
            px[ch] = to_channel((watermarked - alpha * LOGO_VALUE) / inv_alpha);
        }
    }
}

/// Composite the watermark onto a region in place (forward alpha blending).
///
/// Uses the unclamped mask alpha. This is the operation [`blend`] inverts and
/// is useful for building watermarked fixtures.
///
/// # Panics
///
/// Panics if `region` and `mask` differ in dimensions.
pub fn apply_watermark(region: &mut RgbaImage, mask: &Mask) {
    assert_eq!(
        region.dimensions(),
        mask.pixels().dimensions(),
        "region and mask must have identical dimensions"
    );

    for (x, y, px) in region.enumerate_pixels_mut() {
        let alpha = mask.alpha_at(x, y);
        for ch in 0..3 {
            let original = f64::from(px[ch]);
            px[ch] = to_channel(alpha * LOGO_VALUE + (1.0 - alpha) * original);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba};
    use rstest::rstest;

    fn uniform_mask(size: u32, value: u8) -> Mask {
        let pixels = RgbaImage::from_pixel(size, size, Rgba([value, value, value, 255]));
        Mask::from_image(size, &DynamicImage::ImageRgba8(pixels)).unwrap()
    }

    fn gradient_mask(size: u32) -> Mask {
        let pixels = RgbaImage::from_fn(size, size, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let v = ((x + y) * 200 / (2 * (size - 1))) as u8;
            Rgba([v, v / 2, 0, 0])
        });
        Mask::from_image(size, &DynamicImage::ImageRgba8(pixels)).unwrap()
    }

    fn textured_region(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let texel = [(x * 5) as u8, (y * 5) as u8, ((x * y) % 256) as u8, 200];
            Rgba(texel)
        })
    }

    #[test]
    fn zero_alpha_leaves_pixels_identical() {
        let mask = uniform_mask(8, 0);
        let mut region = textured_region(8);
        let before = region.clone();

        blend(&mut region, &mask);

        assert_eq!(region, before);
    }

    #[rstest]
    #[case(255, 255)]
    #[case(254, 155)]
    #[case(253, 55)]
    #[case(252, 0)]
    #[case(0, 0)]
    fn full_alpha_is_clamped_to_max(#[case] observed: u8, #[case] expected: u8) {
        let mask = uniform_mask(1, 255);
        let mut region = RgbaImage::from_pixel(1, 1, Rgba([observed, observed, observed, 77]));

        blend(&mut region, &mask);

        assert_eq!(region.get_pixel(0, 0), &Rgba([expected, expected, expected, 77]));
    }

    #[test]
    fn region_alpha_channel_is_untouched() {
        let mask = uniform_mask(4, 128);
        let mut region = RgbaImage::from_pixel(4, 4, Rgba([200, 180, 160, 33]));

        blend(&mut region, &mask);

        for px in region.pixels() {
            assert_eq!(px[3], 33);
        }
    }

    #[test]
    fn half_alpha_on_white_recovers_white() {
        // 255 observed under any alpha < 1 inverts to 255.
        let mask = uniform_mask(2, 128);
        let mut region = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        blend(&mut region, &mask);
        assert_eq!(region.get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn blend_is_deterministic() {
        let mask = gradient_mask(16);
        let mut a = textured_region(16);
        let mut b = a.clone();

        blend(&mut a, &mask);
        blend(&mut b, &mask);

        assert_eq!(a, b);
    }

    #[test]
    fn blend_is_not_idempotent() {
        let mask = uniform_mask(4, 100);
        let mut region = RgbaImage::from_pixel(4, 4, Rgba([150, 150, 150, 255]));
        blend(&mut region, &mask);
        let once = region.clone();
        blend(&mut region, &mask);
        assert_ne!(region, once);
    }

    #[test]
    fn reverse_blend_recovers_original_within_tolerance() {
        let size = 24;
        let mask = gradient_mask(size);
        let original = textured_region(size);
        let mut region = original.clone();

        apply_watermark(&mut region, &mask);
        blend(&mut region, &mask);

        for (x, y, restored) in region.enumerate_pixels() {
            let alpha = mask.alpha_at(x, y);
            // Forward rounding error is amplified by 1 / (1 - alpha).
            #[allow(clippy::cast_possible_truncation)]
            let tolerance = (0.5 / (1.0 - alpha)).ceil() as i32 + 1;
            let orig = original.get_pixel(x, y);
            for ch in 0..3 {
                let diff = (i32::from(restored[ch]) - i32::from(orig[ch])).abs();
                assert!(
                    diff <= tolerance,
                    "Pixel ({x},{y}) ch {ch} diff {diff} (restored={}, orig={})",
                    restored[ch],
                    orig[ch]
                );
            }
        }
    }

    #[test]
    #[should_panic(expected = "identical dimensions")]
    fn mismatched_dimensions_panic() {
        let mask = uniform_mask(4, 10);
        let mut region = RgbaImage::new(5, 4);
        blend(&mut region, &mask);
    }
}
