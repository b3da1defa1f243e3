// gltf.rs      glTF module
//
// Copyright (c) 2024-2025  Douglas Lau
//
use crate::batch::PointBatch;
use serde_json::{json, Value};
use serde_repr::Serialize_repr;
use std::io::{Result, Write};
use std::mem::size_of;

/// Component types for glTF accessor
#[derive(Serialize_repr)]
#[repr(u32)]
#[allow(unused)]
enum ComponentType {
    I8 = 5120,
    U8 = 5121,
    I16 = 5122,
    U16 = 5123,
    U32 = 5125,
    F32 = 5126,
}

/// Target for glTF buffer view
#[derive(Serialize_repr)]
#[repr(u32)]
enum Target {
    ArrayBuffer = 34962,
}

/// Primitive mode for point clouds
const MODE_POINTS: u32 = 0;

/// Builder for glTF
#[derive(Default)]
struct Builder {
    bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
    primitives: Vec<Value>,
}

/// GLB writer
struct Glb<W: Write> {
    writer: W,
}

/// Transmute a slice of `T` to a slice of `u8`
fn as_u8_slice<T: Sized>(p: &[T]) -> &[u8] {
    let (_head, body, _tail) = unsafe { p.align_to::<u8>() };
    body
}

impl Builder {
    /// Add one point batch as an unindexed point primitive
    fn add_batch(&mut self, batch: &PointBatch) {
        let count = batch.len();
        // positions
        let pos_view = self.views.len();
        self.accessors.push(json!({
            "bufferView": pos_view,
            "componentType": ComponentType::F32,
            "type": "VEC3",
            "count": count,
            "min": batch.pos_min(),
            "max": batch.pos_max(),
        }));
        let v = self.push_array_view(batch.positions());
        self.views.push(v);
        // colors
        let color_view = self.views.len();
        self.accessors.push(json!({
            "bufferView": color_view,
            "componentType": ComponentType::F32,
            "type": "VEC3",
            "count": count,
        }));
        let v = self.push_array_view(batch.colors());
        self.views.push(v);
        // primitive
        self.primitives.push(json!({
            "attributes": {
                "POSITION": pos_view,
                "COLOR_0": color_view,
            },
            "mode": MODE_POINTS,
        }));
    }

    /// Push an array view
    fn push_array_view<V>(&mut self, buf: &[V]) -> Value {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let byte_offset = self.bin.len();
        let bytes = as_u8_slice(buf);
        self.bin.extend_from_slice(bytes);
        json!({
            "buffer": 0,
            "byteLength": bytes.len(),
            "byteOffset": byte_offset,
            "byteStride": size_of::<V>(),
            "target": Target::ArrayBuffer,
        })
    }

    /// Get root JSON of glTF
    fn json(&self) -> Value {
        json!({
            "asset": {
                "version": "2.0"
            },
            "buffers": [{
                "byteLength": self.bin.len(),
            }],
            "bufferViews": self.views,
            "accessors": self.accessors,
            "meshes": [{
                "primitives": self.primitives,
            }],
            "nodes": [{
                "mesh": 0
            }],
            "scenes": [{
                "nodes": [0]
            }],
        })
    }

    /// Get binary buffer
    fn bin(&self) -> &[u8] {
        &self.bin
    }
}

/// Export point batches to a writer as a GLB
///
/// Empty batches are skipped; glTF forbids zero-count accessors.
pub fn export<W: Write>(writer: W, batches: &[&PointBatch]) -> Result<()> {
    let mut builder = Builder::default();
    for batch in batches {
        if !batch.is_empty() {
            builder.add_batch(batch);
        }
    }
    let bin = builder.bin();
    let mut root_json = builder.json().to_string();
    while root_json.len() % 4 != 0 {
        root_json.push(' ');
    }
    let mut glb = Glb::new(writer);
    glb.write_header(2, (root_json.len() + bin.len()).try_into().unwrap())?;
    glb.write_json(&root_json)?;
    glb.write_bin(bin)?;
    Ok(())
}

impl<W: Write> Glb<W> {
    /// Create new GLB writer
    fn new(writer: W) -> Self {
        Glb { writer }
    }

    /// Write GLB header
    fn write_header(&mut self, chunks: u32, len: u32) -> Result<()> {
        let total_len = 12 + chunks * 8 + len;
        self.writer.write_all(b"glTF")?;
        self.writer.write_all(&2u32.to_le_bytes())?;
        self.writer.write_all(&total_len.to_le_bytes())?;
        Ok(())
    }

    /// Write one chunk
    fn write_chunk(&mut self, ctype: &[u8], data: &[u8]) -> Result<()> {
        let len: u32 = data.len().try_into().unwrap();
        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(ctype)?;
        self.writer.write_all(data)?;
        Ok(())
    }

    /// Write a JSON chunk
    fn write_json(&mut self, json: &str) -> Result<()> {
        self.write_chunk(b"JSON", json.as_bytes())
    }

    /// Write a BIN chunk
    fn write_bin(&mut self, bin: &[u8]) -> Result<()> {
        self.write_chunk(b"BIN\0", bin)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Color;
    use glam::Vec3;

    fn batch() -> PointBatch {
        let mut batch = PointBatch::with_capacity(2);
        batch.push(Vec3::new(0.0, 1.0, 0.0), Color::rgb(0.1, 0.5, 0.1));
        batch.push(Vec3::new(1.0, 0.0, -1.0), Color::rgb(0.3, 0.2, 0.1));
        batch
    }

    #[test]
    fn glb_framing() {
        let batch = batch();
        let mut glb = Vec::new();
        export(&mut glb, &[&batch]).unwrap();
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(glb[4..8].try_into().unwrap()), 2);
        let total = u32::from_le_bytes(glb[8..12].try_into().unwrap());
        assert_eq!(total as usize, glb.len());
        // first chunk is JSON, padded to 4 bytes
        let json_len =
            u32::from_le_bytes(glb[12..16].try_into().unwrap()) as usize;
        assert_eq!(json_len % 4, 0);
        assert_eq!(&glb[16..20], b"JSON");
    }

    #[test]
    fn empty_batches_skipped() {
        let batch = batch();
        let empty = PointBatch::default();
        let mut glb = Vec::new();
        export(&mut glb, &[&empty, &batch]).unwrap();
        let json_len =
            u32::from_le_bytes(glb[12..16].try_into().unwrap()) as usize;
        let json: serde_json::Value =
            serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
        assert_eq!(json["meshes"][0]["primitives"].as_array().unwrap().len(), 1);
        assert_eq!(json["accessors"][0]["count"], 2);
        assert_eq!(json["meshes"][0]["primitives"][0]["mode"], 0);
    }
}
