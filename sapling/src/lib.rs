// lib.rs      sapling crate.
//
// Copyright (c) 2024-2025  Douglas Lau
//
mod batch;
mod color;
mod error;
mod gltf;
mod tree;

pub use batch::{PointBatch, PointSink};
pub use color::Color;
pub use error::{Error, Result};
pub use tree::{Tree, TreeParams};
