//! 4×4 box blur over the raw occlusion buffer.

use crate::image::Image;

/// Tap offsets along each axis. The window is not centered.
pub const BLUR_OFFSETS: [i32; 4] = [-2, -1, 0, 1];

/// Blurred occlusion at pixel `(x, y)`; edge taps clamp to the border.
#[must_use]
pub fn blur_at(input: &Image<f32>, x: u32, y: u32, enabled: bool) -> f32 {
    if !enabled {
        return input.get(x, y);
    }
    let mut sum = 0.0;
    for dy in BLUR_OFFSETS {
        for dx in BLUR_OFFSETS {
            sum += input.load_clamped(x as i32 + dx, y as i32 + dy);
        }
    }
    sum / (BLUR_OFFSETS.len() * BLUR_OFFSETS.len()) as f32
}

/// Blurs `input` into a new image. The input is never written.
#[must_use]
pub fn blur_pass(input: &Image<f32>, enabled: bool) -> Image<f32> {
    Image::from_fn(input.width(), input.height(), |x, y| blur_at(input, x, y, enabled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_disabled_passes_center_through() {
        let input = Image::from_fn(5, 3, |x, y| (x * 7 + y) as f32 / 40.0);
        assert_eq!(blur_pass(&input, false), input);
    }

    #[test]
    fn test_constant_input_is_unchanged() {
        let input = Image::new(9, 9, 0.25);
        let out = blur_pass(&input, true);
        assert!(out.data().iter().all(|&v| (v - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_window_is_offset_toward_negative() {
        // A single bright texel at (5, 5) reaches pixels 4..=7 on each axis.
        let mut input = Image::new(12, 12, 0.0);
        input.set(5, 5, 16.0);
        let out = blur_pass(&input, true);
        assert_eq!(out.get(4, 4), 1.0);
        assert_eq!(out.get(7, 7), 1.0);
        assert_eq!(out.get(3, 5), 0.0);
        assert_eq!(out.get(8, 5), 0.0);
    }

    proptest! {
        #[test]
        fn prop_blur_is_window_mean(
            values in proptest::collection::vec(0.0f32..1.0, 64),
            x in 0u32..8,
            y in 0u32..8,
        ) {
            let input = Image::from_vec(8, 8, values).unwrap();
            let mut expected = 0.0;
            for dy in -2..=1 {
                for dx in -2..=1 {
                    let sx = (x as i32 + dx).clamp(0, 7) as u32;
                    let sy = (y as i32 + dy).clamp(0, 7) as u32;
                    expected += input.get(sx, sy);
                }
            }
            expected /= 16.0;
            prop_assert!((blur_at(&input, x, y, true) - expected).abs() < 1e-5);
            prop_assert_eq!(blur_at(&input, x, y, false), input.get(x, y));
        }
    }
}
