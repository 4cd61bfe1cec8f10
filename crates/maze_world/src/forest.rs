//! Procedural forest placement
//!
//! Positions come from rejection sampling: draw a candidate on the spawn
//! surface, keep it if it is at least `min_spacing` from every accepted
//! tree. Sampling stops at `tree_count` trees or after `10 * tree_count`
//! attempts, whichever comes first. A short forest is not an error.
//!
//! The result is either a list of transforms for instanced drawing
//! (submitted in chunks of `batch_size`) or a list of per-tree spawns the
//! host turns into entities with their own colliders.

use crate::terrain::{uniform, SpawnSurface};
use glam::{Mat4, Quat, Vec2, Vec3};
use maze_core::yaw_rotation;
use rand::Rng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Attempts allowed per requested tree
const ATTEMPTS_PER_TREE: usize = 10;

/// Largest forest a generator will reserve space for up front
const PREALLOCATED_TREES: usize = 4096;

/// Forest settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub tree_count: usize,
    /// Minimum distance between two trees
    pub min_spacing: f32,
    /// Flat spawn rectangle, used when there is no terrain
    pub spawn_area: Vec2,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Random yaw in [0, 360) degrees per tree
    pub random_rotation: bool,
    /// Emit instanced transforms instead of entity spawns
    pub instanced: bool,
    /// Instances per draw submission
    pub batch_size: usize,
    /// Fixed seed for reproducible layouts
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            tree_count: 500,
            min_spacing: 2.0,
            spawn_area: Vec2::new(100.0, 100.0),
            min_scale: 0.8,
            max_scale: 1.5,
            random_rotation: true,
            instanced: true,
            batch_size: 1023,
            seed: None,
        }
    }
}

impl ForestConfig {
    pub fn with_tree_count(mut self, count: usize) -> Self {
        self.tree_count = count;
        self
    }

    pub fn with_min_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = spacing;
        self
    }

    pub fn with_spawn_area(mut self, area: Vec2) -> Self {
        self.spawn_area = area;
        self
    }

    pub fn with_scale_range(mut self, min: f32, max: f32) -> Self {
        self.min_scale = min;
        self.max_scale = max;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Spawn entities instead of instanced transforms
    pub fn as_entities(mut self) -> Self {
        self.instanced = false;
        self
    }
}

/// Transform of one instanced tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestInstance {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl ForestInstance {
    /// Translation * rotation * uniform scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

/// A tree to be created as an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeSpawn {
    /// Index into the host's prefab list
    pub prefab: usize,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

/// Generated forest content
#[derive(Debug, Clone, PartialEq)]
pub enum ForestLayout {
    Instanced(Vec<ForestInstance>),
    Entities(Vec<TreeSpawn>),
}

/// Receives instanced draw submissions
pub trait InstancedRenderer {
    /// Draw one batch of model matrices
    fn draw_instanced(&mut self, transforms: &[Mat4]);
}

/// A generated forest
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    layout: ForestLayout,
    matrices: Vec<Mat4>,
    batch_size: usize,
}

impl Forest {
    fn new(layout: ForestLayout, batch_size: usize) -> Self {
        let matrices = match &layout {
            ForestLayout::Instanced(instances) => instances.iter().map(ForestInstance::matrix).collect(),
            ForestLayout::Entities(_) => Vec::new(),
        };
        Self {
            layout,
            matrices,
            batch_size: batch_size.max(1),
        }
    }

    pub fn layout(&self) -> &ForestLayout {
        &self.layout
    }

    /// Number of trees
    pub fn len(&self) -> usize {
        match &self.layout {
            ForestLayout::Instanced(instances) => instances.len(),
            ForestLayout::Entities(spawns) => spawns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tree positions in generation order
    pub fn positions(&self) -> Vec<Vec3> {
        match &self.layout {
            ForestLayout::Instanced(instances) => instances.iter().map(|i| i.position).collect(),
            ForestLayout::Entities(spawns) => spawns.iter().map(|s| s.position).collect(),
        }
    }

    /// Entity spawns, empty for an instanced forest
    pub fn spawns(&self) -> &[TreeSpawn] {
        match &self.layout {
            ForestLayout::Entities(spawns) => spawns,
            ForestLayout::Instanced(_) => &[],
        }
    }

    /// Instanced transforms in chunks of at most `batch_size`
    pub fn batches(&self) -> impl Iterator<Item = &[Mat4]> {
        self.matrices.chunks(self.batch_size)
    }

    pub fn batch_count(&self) -> usize {
        self.matrices.len().div_ceil(self.batch_size)
    }

    /// Submit every batch. Returns the number of draw calls made.
    pub fn submit<R: InstancedRenderer + ?Sized>(&self, renderer: &mut R) -> usize {
        let mut calls = 0;
        for batch in self.batches() {
            renderer.draw_instanced(batch);
            calls += 1;
        }
        calls
    }

    /// Remove every tree
    pub fn clear(&mut self) {
        self.matrices.clear();
        match &mut self.layout {
            ForestLayout::Instanced(instances) => instances.clear(),
            ForestLayout::Entities(spawns) => spawns.clear(),
        }
    }
}

/// Places trees on a spawn surface
#[derive(Debug, Clone)]
pub struct ForestGenerator {
    pub config: ForestConfig,
    pub surface: SpawnSurface,
    prefab_count: usize,
}

impl ForestGenerator {
    pub fn new(config: ForestConfig, surface: SpawnSurface) -> Self {
        Self {
            config,
            surface,
            prefab_count: 0,
        }
    }

    /// Flat generator over the configured spawn area, centred on the origin
    pub fn flat(config: ForestConfig) -> Self {
        let surface = SpawnSurface::Flat {
            center: Vec3::ZERO,
            size: config.spawn_area,
        };
        Self::new(config, surface)
    }

    /// Number of tree prefabs available in entity mode
    pub fn with_prefabs(mut self, count: usize) -> Self {
        self.prefab_count = count;
        self
    }

    /// Random source for this generator, seeded when the config has a seed
    pub fn rng(&self) -> Pcg64 {
        crate::make_rng(self.config.seed)
    }

    /// Rejection-sample tree positions
    pub fn generate_positions<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec3> {
        let target = self.config.tree_count;
        let max_attempts = target.saturating_mul(ATTEMPTS_PER_TREE);
        let min_sq = self.config.min_spacing * self.config.min_spacing;

        let mut positions: Vec<Vec3> = Vec::with_capacity(target.min(PREALLOCATED_TREES));
        let mut attempts = 0;
        while positions.len() < target && attempts < max_attempts {
            attempts += 1;
            let candidate = self.surface.sample(rng);
            if positions.iter().all(|p| p.distance_squared(candidate) >= min_sq) {
                positions.push(candidate);
            }
        }

        if positions.len() < target {
            log::debug!(
                "forest placement stopped after {} attempts with {}/{} trees",
                attempts,
                positions.len(),
                target
            );
        }
        positions
    }

    fn random_transform<R: Rng + ?Sized>(&self, rng: &mut R) -> (Quat, f32) {
        let scale = uniform(rng, self.config.min_scale, self.config.max_scale);
        let rotation = if self.config.random_rotation {
            yaw_rotation(uniform(rng, 0.0, 360.0))
        } else {
            Quat::IDENTITY
        };
        (rotation, scale)
    }

    /// Generate a whole forest
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Forest {
        let positions = self.generate_positions(rng);

        let layout = if self.config.instanced {
            let instances = positions
                .into_iter()
                .map(|position| {
                    let (rotation, scale) = self.random_transform(rng);
                    ForestInstance {
                        position,
                        rotation,
                        scale,
                    }
                })
                .collect::<Vec<_>>();
            log::info!("forest generated: {} instanced trees", instances.len());
            ForestLayout::Instanced(instances)
        } else if self.prefab_count == 0 {
            log::error!("forest has no tree prefabs, nothing spawned");
            ForestLayout::Entities(Vec::new())
        } else {
            let spawns = positions
                .into_iter()
                .map(|position| {
                    let prefab = rng.gen_range(0..self.prefab_count);
                    let (rotation, scale) = self.random_transform(rng);
                    TreeSpawn {
                        prefab,
                        position,
                        rotation,
                        scale,
                    }
                })
                .collect::<Vec<_>>();
            log::info!("forest generated: {} tree entities", spawns.len());
            ForestLayout::Entities(spawns)
        };

        Forest::new(layout, self.config.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::HeightField;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[derive(Default)]
    struct CountingRenderer {
        batch_sizes: Vec<usize>,
    }

    impl InstancedRenderer for CountingRenderer {
        fn draw_instanced(&mut self, transforms: &[Mat4]) {
            self.batch_sizes.push(transforms.len());
        }
    }

    fn small() -> ForestConfig {
        ForestConfig::default()
            .with_tree_count(100)
            .with_spawn_area(Vec2::new(50.0, 50.0))
            .with_seed(42)
    }

    #[test]
    fn test_spacing_holds() {
        let generator = ForestGenerator::flat(small().with_min_spacing(3.0));
        let positions = generator.generate_positions(&mut generator.rng());

        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance(*b) >= 3.0);
            }
        }
    }

    #[test]
    fn test_spacing_holds_on_terrain() {
        // Height rises 1 unit per unit of x from y = 2
        let ramp = HeightField::from_fn(Vec3::new(0.0, 2.0, 0.0), Vec2::new(20.0, 20.0), 21, 21, |x, _| x);
        let config = small().with_tree_count(40).with_min_spacing(2.5);
        let generator = ForestGenerator::new(config, SpawnSurface::Terrain(ramp.clone()));
        let positions = generator.generate_positions(&mut generator.rng());

        assert!(!positions.is_empty());
        for (i, a) in positions.iter().enumerate() {
            assert!((0.0..=20.0).contains(&a.x) && (0.0..=20.0).contains(&a.z));
            assert_relative_eq!(a.y, ramp.sample_height(a.x, a.z), epsilon = 1e-4);
            for b in &positions[i + 1..] {
                assert!(a.distance(*b) >= 2.5);
            }
        }
    }

    #[test]
    fn test_unbounded_area_does_not_panic() {
        let config = small()
            .with_tree_count(5)
            .with_spawn_area(Vec2::new(f32::INFINITY, f32::INFINITY));
        let generator = ForestGenerator::flat(config);
        let forest = generator.generate(&mut generator.rng());
        assert!(forest.len() <= 5);
    }

    #[test]
    fn test_reaches_count_when_room() {
        let generator = ForestGenerator::flat(small());
        let positions = generator.generate_positions(&mut generator.rng());
        assert_eq!(positions.len(), 100);
        for p in &positions {
            assert!(p.x.abs() <= 25.0 && p.z.abs() <= 25.0);
        }
    }

    #[test]
    fn test_crowded_area_returns_partial() {
        // A 4x4 patch cannot hold 50 trees spaced 2 apart
        let config = small()
            .with_tree_count(50)
            .with_spawn_area(Vec2::new(4.0, 4.0));
        let generator = ForestGenerator::flat(config);
        let positions = generator.generate_positions(&mut generator.rng());
        assert!(!positions.is_empty());
        assert!(positions.len() < 50);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let generator = ForestGenerator::flat(small());
        let a = generator.generate(&mut generator.rng());
        let b = generator.generate(&mut generator.rng());
        assert_eq!(a, b);

        let other = generator.generate(&mut Pcg64::seed_from_u64(43));
        assert_ne!(a, other);
    }

    #[test]
    fn test_instances_within_scale_range() {
        let generator = ForestGenerator::flat(small().with_scale_range(0.5, 0.7));
        let forest = generator.generate(&mut generator.rng());

        let ForestLayout::Instanced(instances) = forest.layout() else {
            panic!("expected instanced layout");
        };
        for instance in instances {
            assert!((0.5..0.7).contains(&instance.scale));
            let (scale, _, translation) = instance.matrix().to_scale_rotation_translation();
            assert_relative_eq!(scale.x, instance.scale, epsilon = 1e-4);
            assert_relative_eq!(translation.x, instance.position.x, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_batches_chunked() {
        let generator = ForestGenerator::flat(small().with_tree_count(25).with_batch_size(10));
        let forest = generator.generate(&mut generator.rng());
        assert_eq!(forest.len(), 25);
        assert_eq!(forest.batch_count(), 3);

        let mut renderer = CountingRenderer::default();
        assert_eq!(forest.submit(&mut renderer), 3);
        assert_eq!(renderer.batch_sizes, vec![10, 10, 5]);
    }

    #[test]
    fn test_entity_mode_picks_prefabs() {
        let generator = ForestGenerator::flat(small().as_entities()).with_prefabs(3);
        let forest = generator.generate(&mut generator.rng());

        assert_eq!(forest.spawns().len(), 100);
        assert!(forest.spawns().iter().all(|s| s.prefab < 3));
        assert_eq!(forest.batches().count(), 0);
    }

    #[test]
    fn test_entity_mode_without_prefabs_is_empty() {
        let generator = ForestGenerator::flat(small().as_entities());
        let forest = generator.generate(&mut generator.rng());
        assert!(forest.is_empty());
    }

    #[test]
    fn test_no_rotation() {
        let mut config = small();
        config.random_rotation = false;
        let generator = ForestGenerator::flat(config);
        let forest = generator.generate(&mut generator.rng());
        let ForestLayout::Instanced(instances) = forest.layout() else {
            panic!("expected instanced layout");
        };
        assert!(instances.iter().all(|i| i.rotation == Quat::IDENTITY));
    }

    #[test]
    fn test_clear() {
        let generator = ForestGenerator::flat(small());
        let mut forest = generator.generate(&mut generator.rng());
        forest.clear();
        assert!(forest.is_empty());
        assert_eq!(forest.batch_count(), 0);
    }
}
