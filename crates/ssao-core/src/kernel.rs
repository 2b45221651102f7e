//! Hemisphere sample kernel and rotation noise tile for the SSAO pass.

use std::sync::OnceLock;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of hemisphere samples per pixel.
pub const KERNEL_SIZE: usize = 64;

/// Edge length of the square noise tile, in texels.
pub const NOISE_DIM: u32 = 4;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x55A0;

static GLOBAL_KERNEL: OnceLock<SsaoKernel> = OnceLock::new();

/// Scale applied to sample `index`: `0.1 + 0.9·t²` with `t = index / 64`.
#[must_use]
pub fn sample_scale(index: usize) -> f32 {
    let t = index as f32 / KERNEL_SIZE as f32;
    0.1 + 0.9 * t * t
}

/// Ordered hemisphere samples in tangent space (z ≥ 0).
#[derive(Debug, Clone, PartialEq)]
pub struct SsaoKernel {
    seed: u64,
    samples: [Vec3; KERNEL_SIZE],
}

impl SsaoKernel {
    /// Generates a kernel from a seed. The same seed always yields the same kernel.
    #[must_use]
    pub fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut samples = [Vec3::ZERO; KERNEL_SIZE];
        for (i, sample) in samples.iter_mut().enumerate() {
            let direction = loop {
                let candidate = Vec3::new(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(0.0..=1.0),
                );
                if let Some(unit) = candidate.try_normalize() {
                    break unit;
                }
            };
            *sample = direction * sample_scale(i);
        }
        Self { seed, samples }
    }

    /// The seed this kernel was generated from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The samples, nearest first.
    #[must_use]
    pub fn samples(&self) -> &[Vec3; KERNEL_SIZE] {
        &self.samples
    }

    /// Packs the samples as `vec4`s for a uniform array upload.
    #[must_use]
    pub fn as_uniform_array(&self) -> [[f32; 4]; KERNEL_SIZE] {
        let mut packed = [[0.0; 4]; KERNEL_SIZE];
        for (slot, sample) in packed.iter_mut().zip(&self.samples) {
            *slot = sample.extend(0.0).to_array();
        }
        packed
    }
}

/// Generates the process-wide kernel on first call and returns it.
///
/// Later calls return the existing kernel; a different seed is ignored.
pub fn init_global(seed: u64) -> &'static SsaoKernel {
    let mut generated = false;
    let kernel = GLOBAL_KERNEL.get_or_init(|| {
        generated = true;
        SsaoKernel::generate(seed)
    });
    if generated {
        log::debug!("generated SSAO kernel with seed {seed:#x}");
    }
    kernel
}

/// Returns the process-wide kernel if it has been generated.
#[must_use]
pub fn global() -> Option<&'static SsaoKernel> {
    GLOBAL_KERNEL.get()
}

/// The process-wide kernel plus a noise tile generated from the kernel's own seed.
///
/// When the global kernel already exists with a different seed, that seed wins
/// for the noise too, so both always come from one seed.
pub fn seeded_sampling(seed: u64) -> (&'static SsaoKernel, NoiseTile) {
    let kernel = init_global(seed);
    if kernel.seed() != seed {
        log::warn!(
            "SSAO kernel already generated with seed {:#x}; ignoring seed {seed:#x}",
            kernel.seed()
        );
    }
    (kernel, NoiseTile::generate(kernel.seed()))
}

/// A 4×4 tile of random rotation vectors in the tangent plane.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseTile {
    texels: [Vec3; (NOISE_DIM * NOISE_DIM) as usize],
}

impl NoiseTile {
    /// Generates a tile from a seed.
    #[must_use]
    pub fn generate(seed: u64) -> Self {
        // Offset the stream so the tile does not mirror the kernel's first draws.
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let mut texels = [Vec3::ZERO; (NOISE_DIM * NOISE_DIM) as usize];
        for texel in &mut texels {
            // A near-zero rotation vector would leave the tangent undefined.
            *texel = loop {
                let candidate = Vec3::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0), 0.0);
                if candidate.length_squared() > 1e-4 {
                    break candidate;
                }
            };
        }
        Self { texels }
    }

    /// Texels in row-major order.
    #[must_use]
    pub fn texels(&self) -> &[Vec3] {
        &self.texels
    }

    /// Returns the texel covering `uv` with repeat wrapping.
    #[must_use]
    pub fn sample_repeat(&self, uv: Vec2) -> Vec3 {
        let dim = NOISE_DIM as i32;
        let x = ((uv.x * NOISE_DIM as f32).floor() as i32).rem_euclid(dim);
        let y = ((uv.y * NOISE_DIM as f32).floor() as i32).rem_euclid(dim);
        self.texels[(y * dim + x) as usize]
    }

    /// Texels as RGBA `f32` quadruples, alpha 1.
    #[must_use]
    pub fn to_rgba(&self) -> Vec<[f32; 4]> {
        self.texels.iter().map(|t| t.extend(1.0).to_array()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_kernel_magnitudes_follow_scale_curve() {
        let kernel = SsaoKernel::generate(DEFAULT_SEED);
        for (i, sample) in kernel.samples().iter().enumerate() {
            assert!((sample.length() - sample_scale(i)).abs() < 1e-5);
            assert!(sample.z >= 0.0);
        }
        assert!((kernel.samples()[0].length() - 0.1).abs() < 1e-6);
        let last = 0.1 + 0.9 * (63.0f32 / 64.0).powi(2);
        assert!((kernel.samples()[63].length() - last).abs() < 1e-5);
    }

    #[test]
    fn test_kernel_is_deterministic_per_seed() {
        assert_eq!(SsaoKernel::generate(7), SsaoKernel::generate(7));
        assert_ne!(SsaoKernel::generate(7), SsaoKernel::generate(8));
    }

    #[test]
    fn test_global_kernel_generated_once() {
        let first = init_global(DEFAULT_SEED);
        let second = init_global(12345);
        assert!(std::ptr::eq(first, second));
        assert!(global().is_some_and(|k| std::ptr::eq(k, first)));
    }

    #[test]
    fn test_sampling_noise_follows_global_kernel_seed() {
        let (kernel, noise) = seeded_sampling(0xBEEF);
        let (again, other_noise) = seeded_sampling(0xF00D);
        assert!(std::ptr::eq(kernel, again));
        assert_eq!(noise, NoiseTile::generate(kernel.seed()));
        assert_eq!(other_noise, noise);
    }

    #[test]
    fn test_uniform_array_packs_xyz() {
        let kernel = SsaoKernel::generate(1);
        let packed = kernel.as_uniform_array();
        assert_eq!(packed[5][..3], kernel.samples()[5].to_array());
        assert_eq!(packed[5][3], 0.0);
    }

    #[test]
    fn test_noise_tile_has_sixteen_planar_entries() {
        let tile = NoiseTile::generate(DEFAULT_SEED);
        assert_eq!(tile.texels().len(), 16);
        for texel in tile.texels() {
            assert_eq!(texel.z, 0.0);
            assert!(texel.x.abs() <= 1.0 && texel.y.abs() <= 1.0);
        }
    }

    #[test]
    fn test_noise_tile_repeats() {
        let tile = NoiseTile::generate(3);
        let a = tile.sample_repeat(Vec2::new(0.3, 0.6));
        assert_eq!(a, tile.sample_repeat(Vec2::new(1.3, 2.6)));
        assert_eq!(a, tile.sample_repeat(Vec2::new(-0.7, -0.4)));
        assert_eq!(tile.sample_repeat(Vec2::ZERO), tile.texels()[0]);
        assert_eq!(tile.sample_repeat(Vec2::new(0.99, 0.0)), tile.texels()[3]);
        assert_eq!(tile.sample_repeat(Vec2::new(0.0, 0.26)), tile.texels()[4]);
    }

    proptest! {
        #[test]
        fn prop_kernel_samples_in_hemisphere(seed in any::<u64>()) {
            let kernel = SsaoKernel::generate(seed);
            for sample in kernel.samples() {
                prop_assert!(sample.z >= 0.0);
                let len = sample.length();
                prop_assert!((0.1 - 1e-5..=1.0 + 1e-5).contains(&len));
            }
        }
    }
}
