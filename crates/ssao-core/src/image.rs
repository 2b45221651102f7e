//! Row-major CPU images used by the reference passes.

use glam::Vec2;

use crate::error::{Result, SsaoError};

/// A width × height grid of texels, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Copy> Image<T> {
    /// Creates an image filled with `value`.
    #[must_use]
    pub fn new(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Wraps existing row-major data.
    pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(SsaoError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texels in row-major order.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Texel at `(x, y)`. Panics when out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> T {
        self.data[self.index(x, y)]
    }

    /// Overwrites the texel at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let index = self.index(x, y);
        self.data[index] = value;
    }

    /// Integer fetch with coordinates clamped to the edge.
    #[must_use]
    pub fn load_clamped(&self, x: i32, y: i32) -> T {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        let y = y.clamp(0, self.height as i32 - 1) as u32;
        self.get(x, y)
    }

    /// Nearest-neighbour sample at normalized `uv` with clamp-to-edge.
    #[must_use]
    pub fn sample_nearest_clamp(&self, uv: Vec2) -> T {
        let x = (uv.x * self.width as f32).floor() as i32;
        let y = (uv.y * self.height as f32).floor() as i32;
        self.load_clamped(x, y)
    }

    /// Builds an image by evaluating `f` at each pixel.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }
}

/// Normalized texture coordinate of the center of pixel `(x, y)`.
#[must_use]
pub fn pixel_center_uv(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32,
        (y as f32 + 0.5) / height as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_checks_size() {
        assert!(Image::from_vec(2, 2, vec![0u8; 3]).is_err());
        let image = Image::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(image.get(1, 1), 4);
    }

    #[test]
    fn test_load_clamped_edges() {
        let image = Image::from_fn(3, 2, |x, y| x + 10 * y);
        assert_eq!(image.load_clamped(-5, -5), 0);
        assert_eq!(image.load_clamped(7, 0), 2);
        assert_eq!(image.load_clamped(1, 9), 11);
    }

    #[test]
    fn test_nearest_sample_at_pixel_centers() {
        let image = Image::from_fn(4, 4, |x, y| (x, y));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(image.sample_nearest_clamp(pixel_center_uv(x, y, 4, 4)), (x, y));
            }
        }
        assert_eq!(image.sample_nearest_clamp(Vec2::new(1.5, -0.5)), (3, 0));
    }
}
