// mesh.rs      Point cloud mesh module
//
// Copyright (c) 2024-2025  Douglas Lau
//
use bevy::render::mesh::Mesh;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::PrimitiveTopology;
use sapling::{PointBatch, PointSink};

/// Build a bevy Mesh with PointList primitives from one batch
pub fn build_cloud(batch: &PointBatch) -> Mesh {
    let pos: Vec<[f32; 3]> =
        batch.positions().iter().map(|p| p.to_array()).collect();
    let colors: Vec<[f32; 4]> = batch
        .colors()
        .iter()
        .map(|c| [c.r, c.g, c.b, 1.0])
        .collect();
    let mut mesh = Mesh::new(
        PrimitiveTopology::PointList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, pos);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    mesh
}

/// Point sink collecting one mesh per batch
#[derive(Default)]
pub struct CloudBuilder {
    /// Finished point-cloud meshes, in batch order
    meshes: Vec<Mesh>,
}

impl CloudBuilder {
    /// Take the finished meshes
    pub fn take_meshes(self) -> Vec<Mesh> {
        self.meshes
    }
}

impl PointSink for CloudBuilder {
    fn draw_batch(&mut self, batch: &PointBatch) {
        self.meshes.push(build_cloud(batch));
    }
}
