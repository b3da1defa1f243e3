// batch.rs     Point batch module
//
// Copyright (c) 2024-2025  Douglas Lau
//
use crate::color::Color;
use glam::Vec3;

/// Batch of colored point samples
///
/// A flat set of positioned, colored points rendered without connectivity.
/// Positions and colors are parallel, one color per position, kept in
/// generation order.
#[derive(Clone, Debug, Default)]
pub struct PointBatch {
    /// Point positions
    pos: Vec<Vec3>,

    /// Point colors
    colors: Vec<Color>,
}

/// Receiver of point batches
///
/// Rendering surface abstraction: an implementor maps each batch to a
/// drawable point-cloud primitive with vertex coloring.  The generator never
/// touches window or surface state.
pub trait PointSink {
    /// Draw one batch of colored points
    fn draw_batch(&mut self, batch: &PointBatch);
}

impl PointBatch {
    /// Create an empty batch with capacity for `n` points
    pub fn with_capacity(n: usize) -> Self {
        PointBatch {
            pos: Vec::with_capacity(n),
            colors: Vec::with_capacity(n),
        }
    }

    /// Push one point
    pub fn push(&mut self, pos: Vec3, color: Color) {
        self.pos.push(pos);
        self.colors.push(color);
    }

    /// Get the number of points
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    /// Check if the batch is empty
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Get slice of all point positions
    pub fn positions(&self) -> &[Vec3] {
        &self.pos[..]
    }

    /// Get slice of all point colors
    pub fn colors(&self) -> &[Color] {
        &self.colors[..]
    }

    /// Get mutable slice of all point positions
    pub(crate) fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.pos[..]
    }

    /// Get minimum position
    pub fn pos_min(&self) -> Vec3 {
        self.positions()
            .iter()
            .copied()
            .reduce(|min, v| v.min(min))
            .unwrap_or(Vec3::ZERO)
    }

    /// Get maximum position
    pub fn pos_max(&self) -> Vec3 {
        self.positions()
            .iter()
            .copied()
            .reduce(|max, v| v.max(max))
            .unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn positions_parallel_colors() {
        let mut batch = PointBatch::with_capacity(2);
        assert!(batch.is_empty());
        batch.push(Vec3::new(1.0, 2.0, 3.0), Color::rgb(1.0, 0.0, 0.0));
        batch.push(Vec3::new(-1.0, 0.5, 0.0), Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.positions().len(), batch.colors().len());
    }

    #[test]
    fn min_max() {
        let mut batch = PointBatch::default();
        batch.push(Vec3::new(1.0, 2.0, 3.0), Color::default());
        batch.push(Vec3::new(-1.0, 4.0, 0.0), Color::default());
        assert_eq!(batch.pos_min(), Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(batch.pos_max(), Vec3::new(1.0, 4.0, 3.0));
    }
}
