// tree.rs     Tree module
//
// Copyright (c) 2024-2025  Douglas Lau
//
use crate::batch::{PointBatch, PointSink};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::gltf;
use fastrand::Rng;
use glam::Vec3;
use std::f32::consts::PI;
use std::io::Write;

/// Height slices along the trunk
const TRUNK_SEGMENTS: usize = 20;

/// Points along each branch
const BRANCH_SEGMENTS: usize = 10;

/// Points in each leaf cluster
const CLUSTER_POINTS: usize = 20;

/// Sway drift per animation step
const SWAY_AMPLITUDE: f32 = 0.001;

/// Trunk base color (brown)
const TRUNK_COLOR: Color = Color {
    r: 0.294,
    g: 0.212,
    b: 0.129,
};

/// Branch base color (darker brown)
const BRANCH_COLOR: Color = Color {
    r: 0.231,
    g: 0.165,
    b: 0.102,
};

/// Minimum squared magnitude for branch direction sampling
const MIN_DIR_MAG_SQ: f32 = 1e-4;

/// Shape parameters for tree generation
///
/// Fully determines the output distribution, modulo the random source passed
/// to [generate].
///
/// ```rust
/// # use sapling::TreeParams;
/// let params = TreeParams::default().height(8.0).branch_levels(3);
/// ```
///
/// [generate]: struct.Tree.html#method.generate
#[derive(Clone, Debug)]
pub struct TreeParams {
    /// Total height
    height: f32,

    /// Radius at base of trunk
    radius_base: f32,

    /// Number of branch levels
    branch_levels: usize,

    /// Points generated per level
    points_per_level: usize,

    /// Foliage color variation `[0, 1]`
    color_variation: f32,

    /// Foliage base color
    base_color: Color,
}

/// Generated point-cloud tree model
///
/// Owns one [PointBatch] each for trunk, branches and leaves.  Batches share
/// no state; the only mutation after generation is the in-place [animate]
/// step.
///
/// ```rust
/// # use sapling::{Result, Tree, TreeParams};
/// # fn main() -> Result<()> {
/// let mut rng = fastrand::Rng::with_seed(42);
/// let tree = Tree::generate(&TreeParams::default(), &mut rng)?;
/// # Ok(())
/// # }
/// ```
///
/// [animate]: struct.Tree.html#method.animate
/// [pointbatch]: struct.PointBatch.html
#[derive(Clone, Debug)]
pub struct Tree {
    /// Trunk surface points
    trunk: PointBatch,

    /// Branch walk points
    branches: PointBatch,

    /// Leaf cluster points
    leaves: PointBatch,
}

/// Sample uniform noise in `[-bound, bound]`
fn noise(rng: &mut Rng, bound: f32) -> f32 {
    (rng.f32() - 0.5) * 2.0 * bound
}

/// Calculate trunk radius at a height fraction
///
/// The trunk narrows linearly toward the top.
fn trunk_radius(radius_base: f32, h: f32) -> f32 {
    radius_base * (1.0 - h * 0.7)
}

/// Sample a branch direction, biased downward
///
/// Resamples when the magnitude is too close to zero to normalize.
fn sample_direction(rng: &mut Rng) -> Vec3 {
    loop {
        let dir =
            Vec3::new(noise(rng, 1.0), -rng.f32(), noise(rng, 1.0));
        if dir.length_squared() > MIN_DIR_MAG_SQ {
            return dir.normalize();
        }
    }
}

/// Sample a branch attachment point on the trunk surface
fn attachment_point(params: &TreeParams, h: f32, rng: &mut Rng) -> Vec3 {
    let angle = rng.f32() * 2.0 * PI;
    let radius = trunk_radius(params.radius_base, h);
    Vec3::new(
        angle.cos() * radius,
        h * params.height,
        angle.sin() * radius,
    )
}

/// Sample a branch length, biased shorter near the top
fn branch_length(height: f32, h: f32, rng: &mut Rng) -> f32 {
    (1.0 - h) * height * 0.5 * (rng.f32() + 0.5)
}

/// Sample a point offset within a leaf cluster disk
fn cluster_offset(cluster_radius: f32, rng: &mut Rng) -> Vec3 {
    let angle = rng.f32() * 2.0 * PI;
    let dist = rng.f32() * cluster_radius;
    Vec3::new(
        angle.cos() * dist + noise(rng, 0.05),
        angle.sin() * dist + noise(rng, 0.05),
        noise(rng, 0.05),
    )
}

/// Generate the trunk batch
fn generate_trunk(params: &TreeParams, rng: &mut Rng) -> PointBatch {
    let count = params.points_per_level;
    let mut batch = PointBatch::with_capacity(TRUNK_SEGMENTS * count);
    for seg in 0..TRUNK_SEGMENTS {
        let t = seg as f32 / TRUNK_SEGMENTS as f32;
        let radius =
            trunk_radius(params.radius_base, t) * (1.0 + noise(rng, 0.1));
        let y = t * params.height;
        for i in 0..count {
            let angle = 2.0 * PI * i as f32 / count as f32;
            let x = angle.cos() * radius + noise(rng, 0.05);
            let z = angle.sin() * radius + noise(rng, 0.05);
            let color = TRUNK_COLOR.offset_hsl(0.0, 0.0, noise(rng, 0.1));
            batch.push(Vec3::new(x, y, z), color);
        }
    }
    batch
}

/// Generate the branches batch
fn generate_branches(params: &TreeParams, rng: &mut Rng) -> PointBatch {
    let count = params.branch_levels * params.points_per_level;
    let mut batch = PointBatch::with_capacity(count * BRANCH_SEGMENTS);
    for _ in 0..count {
        let h = rng.f32();
        let attach = attachment_point(params, h, rng);
        let length = branch_length(params.height, h, rng);
        let dir = sample_direction(rng);
        for seg in 0..BRANCH_SEGMENTS {
            let t = seg as f32 / BRANCH_SEGMENTS as f32;
            let pos = attach
                + dir * (length * t)
                + Vec3::new(
                    noise(rng, 0.025),
                    noise(rng, 0.025),
                    noise(rng, 0.025),
                );
            let color = BRANCH_COLOR.offset_hsl(0.0, 0.0, noise(rng, 0.075));
            batch.push(pos, color);
        }
    }
    batch
}

/// Generate the leaves batch
fn generate_leaves(params: &TreeParams, rng: &mut Rng) -> PointBatch {
    let clusters = params.branch_levels * params.points_per_level / 2;
    let mut batch = PointBatch::with_capacity(clusters * CLUSTER_POINTS);
    for _ in 0..clusters {
        let h = rng.f32();
        let attach = attachment_point(params, h, rng);
        let length = branch_length(params.height, h, rng);
        let dir = sample_direction(rng);
        let center = attach + dir * (length * rng.f32());
        let cluster_radius = rng.f32() * 0.3 + 0.1;
        for _ in 0..CLUSTER_POINTS {
            let pos = center + cluster_offset(cluster_radius, rng);
            let color = params.base_color.offset_hsl(
                noise(rng, params.color_variation * 0.25),
                noise(rng, params.color_variation * 0.15),
                noise(rng, params.color_variation * 0.5),
            );
            batch.push(pos, color);
        }
    }
    batch
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            height: 10.0,
            radius_base: 1.0,
            branch_levels: 4,
            points_per_level: 1000,
            color_variation: 0.2,
            base_color: Color::rgb(0.13, 0.55, 0.13),
        }
    }
}

impl TreeParams {
    /// Set total height
    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Set radius at base of trunk
    pub fn radius_base(mut self, radius_base: f32) -> Self {
        self.radius_base = radius_base;
        self
    }

    /// Set number of branch levels
    pub fn branch_levels(mut self, branch_levels: usize) -> Self {
        self.branch_levels = branch_levels;
        self
    }

    /// Set points generated per level
    pub fn points_per_level(mut self, points_per_level: usize) -> Self {
        self.points_per_level = points_per_level;
        self
    }

    /// Set foliage color variation
    pub fn color_variation(mut self, color_variation: f32) -> Self {
        self.color_variation = color_variation;
        self
    }

    /// Set foliage base color
    pub fn base_color(mut self, base_color: Color) -> Self {
        self.base_color = base_color;
        self
    }

    /// Validate all parameters
    fn validate(&self) -> Result<()> {
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(Error::InvalidParameter("height"));
        }
        if !(self.radius_base.is_finite() && self.radius_base > 0.0) {
            return Err(Error::InvalidParameter("radius_base"));
        }
        if self.branch_levels == 0 {
            return Err(Error::InvalidParameter("branch_levels"));
        }
        if self.points_per_level == 0 {
            return Err(Error::InvalidParameter("points_per_level"));
        }
        if !(0.0..=1.0).contains(&self.color_variation) {
            return Err(Error::InvalidParameter("color_variation"));
        }
        let c = self.base_color;
        if ![c.r, c.g, c.b].iter().all(|ch| (0.0..=1.0).contains(ch)) {
            return Err(Error::InvalidParameter("base_color"));
        }
        Ok(())
    }
}

impl Tree {
    /// Generate a tree model
    ///
    /// Each batch is generated independently from the given random source, so
    /// the same seed always yields the same tree.
    pub fn generate(params: &TreeParams, rng: &mut Rng) -> Result<Self> {
        params.validate()?;
        let trunk = generate_trunk(params, rng);
        let branches = generate_branches(params, rng);
        let leaves = generate_leaves(params, rng);
        Ok(Tree {
            trunk,
            branches,
            leaves,
        })
    }

    /// Get the trunk batch
    pub fn trunk(&self) -> &PointBatch {
        &self.trunk
    }

    /// Get the branches batch
    pub fn branches(&self) -> &PointBatch {
        &self.branches
    }

    /// Get the leaves batch
    pub fn leaves(&self) -> &PointBatch {
        &self.leaves
    }

    /// Get an iterator of all batches, in generation order
    pub fn batches(&self) -> impl Iterator<Item = &PointBatch> {
        [&self.trunk, &self.branches, &self.leaves].into_iter()
    }

    /// Get the bounding box of all batches
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for batch in self.batches().filter(|b| !b.is_empty()) {
            min = min.min(batch.pos_min());
            max = max.max(batch.pos_max());
        }
        (min, max)
    }

    /// Apply one sway animation step
    ///
    /// Adds a gentle per-batch drift to point positions; colors are left
    /// untouched.  The drift is additive across calls.  Must be called from a
    /// single rendering loop, once per frame.
    pub fn animate(&mut self, elapsed: f32) {
        let batches =
            [&mut self.trunk, &mut self.branches, &mut self.leaves];
        for (i, batch) in batches.into_iter().enumerate() {
            let dx = (elapsed + i as f32).sin() * SWAY_AMPLITUDE;
            let dz = (elapsed + i as f32).cos() * SWAY_AMPLITUDE;
            for pos in batch.positions_mut() {
                pos.x += dx;
                pos.z += dz;
            }
        }
    }

    /// Draw all batches on a point sink
    pub fn draw(&self, sink: &mut impl PointSink) {
        for batch in self.batches() {
            sink.draw_batch(batch);
        }
    }

    /// Write tree as [glTF] `.glb`
    ///
    /// Each batch becomes one point-mode primitive with vertex colors.
    ///
    /// ```rust,no_run
    /// # use sapling::{Tree, TreeParams};
    /// # use std::fs::File;
    /// let mut rng = fastrand::Rng::new();
    /// let tree = Tree::generate(&TreeParams::default(), &mut rng).unwrap();
    /// let file = File::create("tree.glb").unwrap();
    /// tree.write_gltf(file).unwrap();
    /// ```
    ///
    /// [gltf]: https://en.wikipedia.org/wiki/GlTF
    pub fn write_gltf<W: Write>(&self, writer: W) -> Result<()> {
        gltf::export(writer, &[&self.trunk, &self.branches, &self.leaves])?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> TreeParams {
        TreeParams::default()
            .height(10.0)
            .radius_base(1.0)
            .branch_levels(4)
            .points_per_level(1000)
            .color_variation(0.2)
            .base_color(Color::rgb(0.13, 0.55, 0.13))
    }

    #[test]
    fn batch_point_counts() {
        let mut rng = Rng::with_seed(1);
        let tree = Tree::generate(&params(), &mut rng).unwrap();
        assert_eq!(tree.trunk().len(), 20_000);
        assert_eq!(tree.branches().len(), 40_000);
        assert_eq!(tree.leaves().len(), 40_000);
    }

    #[test]
    fn trunk_stays_within_radius() {
        let mut rng = Rng::with_seed(2);
        let p = params();
        let tree = Tree::generate(&p, &mut rng).unwrap();
        // taper jitter tops out at 1.1x, plus x/z noise of 0.05 each
        let bound = 1.1 + 0.08;
        for pos in tree.trunk().positions() {
            let radius = (pos.x * pos.x + pos.z * pos.z).sqrt();
            assert!(radius <= bound, "radius {radius} > {bound}");
            assert!(pos.y >= 0.0);
            assert!(pos.y < 10.0);
        }
    }

    #[test]
    fn color_channels_in_range() {
        let mut rng = Rng::with_seed(3);
        let tree = Tree::generate(
            &params().color_variation(1.0),
            &mut rng,
        )
        .unwrap();
        for batch in tree.batches() {
            for c in batch.colors() {
                assert!((0.0..=1.0).contains(&c.r));
                assert!((0.0..=1.0).contains(&c.g));
                assert!((0.0..=1.0).contains(&c.b));
            }
        }
    }

    #[test]
    fn directions_are_unit_length() {
        let mut rng = Rng::with_seed(4);
        for _ in 0..1000 {
            let dir = sample_direction(&mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-6);
            assert!(dir.y <= 0.0);
        }
    }

    #[test]
    fn cluster_points_stay_in_disk() {
        let mut rng = Rng::with_seed(5);
        for _ in 0..100 {
            let cluster_radius = rng.f32() * 0.3 + 0.1;
            let offset = cluster_offset(cluster_radius, &mut rng);
            let dist = (offset.x * offset.x + offset.y * offset.y).sqrt();
            // noise of 0.05 on both disk axes
            assert!(dist <= cluster_radius + 0.08);
            assert!(offset.z.abs() <= 0.05);
        }
    }

    #[test]
    fn same_seed_same_tree() {
        let p = params();
        let a = Tree::generate(&p, &mut Rng::with_seed(42)).unwrap();
        let b = Tree::generate(&p, &mut Rng::with_seed(42)).unwrap();
        assert_eq!(a.trunk().positions(), b.trunk().positions());
        assert_eq!(a.branches().positions(), b.branches().positions());
        assert_eq!(a.leaves().positions(), b.leaves().positions());
        assert_eq!(a.leaves().colors(), b.leaves().colors());
    }

    #[test]
    fn animate_is_deterministic() {
        let p = params().points_per_level(10);
        let tree = Tree::generate(&p, &mut Rng::with_seed(6)).unwrap();
        let mut a = tree.clone();
        let mut b = tree.clone();
        a.animate(1.25);
        b.animate(1.25);
        for (ba, bb) in a.batches().zip(b.batches()) {
            assert_eq!(ba.positions(), bb.positions());
        }
        // drift is additive, so positions moved away from the original
        assert_ne!(a.trunk().positions(), tree.trunk().positions());
        // colors are fixed
        assert_eq!(a.trunk().colors(), tree.trunk().colors());
    }

    #[test]
    fn animate_applies_per_batch_drift() {
        let p = params().points_per_level(10);
        let tree = Tree::generate(&p, &mut Rng::with_seed(7)).unwrap();
        let mut swayed = tree.clone();
        swayed.animate(0.5);
        for (i, (before, after)) in
            tree.batches().zip(swayed.batches()).enumerate()
        {
            let dx = (0.5 + i as f32).sin() * 0.001;
            let dz = (0.5 + i as f32).cos() * 0.001;
            for (p0, p1) in
                before.positions().iter().zip(after.positions())
            {
                assert!((p1.x - p0.x - dx).abs() < 1e-5);
                assert!((p1.y - p0.y).abs() < 1e-6);
                assert!((p1.z - p0.z - dz).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn invalid_parameters_rejected() {
        let mut rng = Rng::with_seed(8);
        assert!(Tree::generate(&params().height(0.0), &mut rng).is_err());
        assert!(Tree::generate(&params().height(f32::NAN), &mut rng).is_err());
        assert!(
            Tree::generate(&params().radius_base(-1.0), &mut rng).is_err()
        );
        assert!(
            Tree::generate(&params().branch_levels(0), &mut rng).is_err()
        );
        assert!(
            Tree::generate(&params().points_per_level(0), &mut rng).is_err()
        );
        assert!(
            Tree::generate(&params().color_variation(1.5), &mut rng).is_err()
        );
        let color = Color {
            r: 1.5,
            g: 0.0,
            b: 0.0,
        };
        assert!(
            Tree::generate(&params().base_color(color), &mut rng).is_err()
        );
    }
}
