//! Procedural asteroid ring
//!
//! Rocks are spread evenly by angle around a ring, pushed off it by a random
//! offset on each axis (vertical offset flattened to 40%), given a random
//! uniform scale in `[0.05, 0.25)` and a random spin about one shared axis.
//! Each rock becomes `translate · scale · rotate` applied to the identity.
//!
//! Randomness comes through [`UniformSource`] so the generator is
//! reproducible from a seed and scriptable in tests.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::AsteroidFieldConfig;
use crate::foundation::math::{constants, utils, Mat4, Mat4Ext, Vec3};
use crate::render::instancing::InstanceMatrix;

/// Fraction of the jitter applied vertically
pub const VERTICAL_FLATTENING: f32 = 0.4;

/// Smallest rock scale
pub const MIN_SCALE: f32 = 0.05;

/// Width of the random scale range above [`MIN_SCALE`]
pub const SCALE_RANGE: f32 = 0.20;

/// Source of uniformly distributed floats
pub trait UniformSource {
    /// Next value in `[0, 1)`
    fn next_unit(&mut self) -> f32;

    /// Next value in `[low, high)`; exactly `low` when the range is empty
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_unit()
    }
}

impl<R: rand::Rng + ?Sized> UniformSource for R {
    fn next_unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// Where one rock sits before it is turned into a matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsteroidPlacement {
    /// World-space position
    pub translation: Vec3,
    /// Uniform scale factor
    pub scale: f32,
    /// Spin about the field's rotation axis, in degrees
    pub rotation_deg: f32,
}

impl AsteroidPlacement {
    /// `translate · scale · rotate` applied to the identity
    pub fn to_matrix(&self, axis: Vec3) -> Mat4 {
        Mat4::identity()
            .translated(self.translation)
            .scaled(self.scale)
            .rotated(utils::deg_to_rad(self.rotation_deg), axis)
    }
}

/// Immutable, fixed-length set of instance transforms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceTransformSet {
    instances: Vec<InstanceMatrix>,
}

impl InstanceTransformSet {
    /// Wrap already composed matrices
    pub fn from_matrices(matrices: impl IntoIterator<Item = Mat4>) -> Self {
        Self {
            instances: matrices.into_iter().map(|m| InstanceMatrix::from(&m)).collect(),
        }
    }

    /// Number of instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instances in upload order
    pub fn as_slice(&self) -> &[InstanceMatrix] {
        &self.instances
    }

    /// Raw bytes as they are uploaded
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Matrix of instance `index`
    pub fn matrix(&self, index: usize) -> Option<Mat4> {
        self.instances.get(index).map(InstanceMatrix::to_mat4)
    }

    /// All matrices in order
    pub fn matrices(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.instances.iter().map(InstanceMatrix::to_mat4)
    }
}

/// Place `count` rocks around a ring
///
/// Per rock the source is drawn five times, in order: x offset, y offset,
/// z offset, scale, rotation.
pub fn placements(count: u32, ring_radius: f32, jitter: f32, source: &mut impl UniformSource) -> Vec<AsteroidPlacement> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * 2.0 * constants::PI;

            let x = angle.sin() * ring_radius + source.uniform(-jitter, jitter);
            let y = source.uniform(-jitter, jitter) * VERTICAL_FLATTENING;
            let z = angle.cos() * ring_radius + source.uniform(-jitter, jitter);

            let scale = source.uniform(0.0, SCALE_RANGE) + MIN_SCALE;
            let rotation_deg = source.uniform(0.0, 360.0);

            AsteroidPlacement {
                translation: Vec3::new(x, y, z),
                scale,
                rotation_deg,
            }
        })
        .collect()
}

/// Generate the transform set from any uniform source
pub fn generate(
    count: u32,
    ring_radius: f32,
    jitter: f32,
    axis: Vec3,
    source: &mut impl UniformSource,
) -> InstanceTransformSet {
    InstanceTransformSet::from_matrices(
        placements(count, ring_radius, jitter, source)
            .iter()
            .map(|placement| placement.to_matrix(axis)),
    )
}

/// Generate the transform set from a seed; identical seeds give identical sets
pub fn generate_seeded(count: u32, ring_radius: f32, jitter: f32, axis: Vec3, seed: u64) -> InstanceTransformSet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate(count, ring_radius, jitter, axis, &mut rng)
}

/// Generate the configured field; returns the set and the seed used
///
/// Without a configured seed one is derived from the clock and logged so
/// the run can be reproduced.
pub fn generate_from_config(config: &AsteroidFieldConfig) -> (InstanceTransformSet, u64) {
    let seed = config.seed.unwrap_or_else(clock_seed);
    let set = generate_seeded(config.count, config.ring_radius, config.jitter, config.rotation_axis, seed);

    log::info!(
        "Generated {} asteroids on a ring of radius {} (jitter {}, seed {})",
        set.len(),
        config.ring_radius,
        config.jitter,
        seed
    );
    (set, seed)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const AXIS: Vec3 = Vec3::new(0.4, 0.6, 0.8);

    /// Replays a fixed list of unit values
    struct ScriptedSource {
        values: Vec<f32>,
        next: usize,
    }

    impl ScriptedSource {
        fn new(values: Vec<f32>) -> Self {
            Self { values, next: 0 }
        }
    }

    impl UniformSource for ScriptedSource {
        fn next_unit(&mut self) -> f32 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value
        }
    }

    #[test]
    fn test_count_is_exact() {
        for count in [0, 1, 7, 1000] {
            assert_eq!(generate_seeded(count, 150.0, 25.0, AXIS, 3).len(), count as usize);
        }
    }

    #[test]
    fn test_zero_count_is_empty() {
        let set = generate_seeded(0, 150.0, 25.0, AXIS, 3);
        assert!(set.is_empty());
        assert!(set.as_bytes().is_empty());
    }

    #[test]
    fn test_scale_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for placement in placements(5000, 150.0, 25.0, &mut rng) {
            assert!(placement.scale >= MIN_SCALE);
            assert!(placement.scale < MIN_SCALE + SCALE_RANGE);
        }

        for matrix in generate_seeded(2000, 150.0, 25.0, AXIS, 11).matrices() {
            let scales = utils::column_scales(&matrix);
            assert_relative_eq!(scales.x, scales.y, epsilon = 1e-5);
            assert_relative_eq!(scales.y, scales.z, epsilon = 1e-5);
            assert!(scales.x >= MIN_SCALE - 1e-5);
            assert!(scales.x < MIN_SCALE + SCALE_RANGE + 1e-5);
        }
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let a = generate_seeded(500, 150.0, 25.0, AXIS, 1234);
        let b = generate_seeded(500, 150.0, 25.0, AXIS, 1234);
        assert_eq!(a.as_bytes(), b.as_bytes());

        let c = generate_seeded(500, 150.0, 25.0, AXIS, 1235);
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn test_single_rock_without_jitter_sits_on_positive_z() {
        let set = generate_seeded(1, 150.0, 0.0, AXIS, 99);
        let matrix = set.matrix(0).expect("one instance");
        assert_eq!(utils::translation_of(&matrix), Vec3::new(0.0, 0.0, 150.0));
    }

    #[test]
    fn test_zero_jitter_gives_perfect_ring() {
        let mut source = ScriptedSource::new(vec![0.0, 0.99, 0.5, 0.25, 0.75]);
        let set = generate(64, 150.0, 0.0, AXIS, &mut source);

        for (i, matrix) in set.matrices().enumerate() {
            let position = utils::translation_of(&matrix);
            let angle = i as f32 / 64.0 * 2.0 * constants::PI;

            assert_eq!(position.y, 0.0);
            assert_relative_eq!(position.x, angle.sin() * 150.0, epsilon = 1e-4);
            assert_relative_eq!(position.z, angle.cos() * 150.0, epsilon = 1e-4);
            assert_relative_eq!((position.x * position.x + position.z * position.z).sqrt(), 150.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_draw_order_and_ranges() {
        // x, y, z, scale, rotation
        let mut source = ScriptedSource::new(vec![1.0, 0.0, 0.5, 0.5, 0.25]);
        let placement = placements(1, 150.0, 10.0, &mut source)[0];

        assert_relative_eq!(placement.translation.x, 10.0);
        assert_relative_eq!(placement.translation.y, -4.0);
        assert_relative_eq!(placement.translation.z, 150.0);
        assert_relative_eq!(placement.scale, 0.15);
        assert_relative_eq!(placement.rotation_deg, 90.0);
    }

    #[test]
    fn test_matrix_is_translate_scale_rotate() {
        let placement = AsteroidPlacement {
            translation: Vec3::new(1.0, 2.0, 3.0),
            scale: 0.5,
            rotation_deg: 90.0,
        };
        let matrix = placement.to_matrix(Vec3::new(0.0, 1.0, 0.0));

        // +X spun a quarter turn about +Y is -Z, halved, then moved
        let p = matrix.transform_point(&crate::foundation::math::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.coords, Vec3::new(1.0, 2.0, 2.5), epsilon = 1e-5);
    }

    #[test]
    fn test_configured_seed_is_used() {
        let config = AsteroidFieldConfig {
            count: 10,
            seed: Some(77),
            ..AsteroidFieldConfig::default()
        };
        let (set, seed) = generate_from_config(&config);
        assert_eq!(seed, 77);
        assert_eq!(set, generate_seeded(10, 150.0, 25.0, config.rotation_axis, 77));
    }
}
