// stage.rs     Stage module
//
// Copyright (c) 2024-2025  Douglas Lau
//
use fastrand::Rng;
use glam::Vec3;
use sapling::{Color, PointBatch};

/// Number of points in the stage cloud
const STAGE_POINTS: usize = 20_000;

/// Build the box environment point batch
///
/// Points are scattered over the six faces of a cube centered on the origin,
/// with slight variance along each face normal.  Colors fade from blue-white
/// at the center toward the corners.
pub fn build_stage(size: f32, rng: &mut Rng) -> PointBatch {
    let half = size / 2.0;
    let variance = size * 0.02;
    let mut batch = PointBatch::with_capacity(STAGE_POINTS);
    for _ in 0..STAGE_POINTS {
        let a = (rng.f32() * 2.0 - 1.0) * half;
        let b = (rng.f32() * 2.0 - 1.0) * half;
        let c = half + (rng.f32() - 0.5) * variance;
        let pos = match rng.usize(..6) {
            0 => Vec3::new(a, b, c),
            1 => Vec3::new(a, b, -c),
            2 => Vec3::new(a, c, b),
            3 => Vec3::new(a, -c, b),
            4 => Vec3::new(c, a, b),
            _ => Vec3::new(-c, a, b),
        };
        let intensity = (1.0 - pos.length() / half).max(0.2);
        let color =
            Color::rgb(intensity * 0.8, intensity * 0.8, intensity * 0.9);
        batch.push(pos, color);
    }
    batch
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn points_lie_on_box_shell() {
        let mut rng = Rng::with_seed(9);
        let size = 10.0;
        let batch = build_stage(size, &mut rng);
        assert_eq!(batch.len(), STAGE_POINTS);
        let shell = size / 2.0;
        let variance = size * 0.02;
        for pos in batch.positions() {
            let extent = pos.x.abs().max(pos.y.abs()).max(pos.z.abs());
            assert!((extent - shell).abs() <= variance / 2.0);
        }
    }
}
