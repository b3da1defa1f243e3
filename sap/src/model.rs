// model.rs     Tree definitions
//
// Copyright (c) 2024-2025  Douglas Lau
//
use anyhow::{bail, Error};
use sapling::{Color, TreeParams};
use serde_derive::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, Error>;

/// Definition of a point-cloud tree
///
/// Unset values fall back to the library defaults.
#[derive(Debug, Deserialize, Serialize)]
pub struct TreeDef {
    /// Total height
    height: Option<f32>,

    /// Radius at base of trunk
    radius_base: Option<f32>,

    /// Number of branch levels
    branch_levels: Option<usize>,

    /// Points generated per level
    points_per_level: Option<usize>,

    /// Foliage color variation
    color_variation: Option<f32>,

    /// Foliage base color, as `r g b` channels
    base_color: Option<String>,
}

impl TreeDef {
    /// Parse base color channels
    fn base_color(&self) -> Result<Option<Color>> {
        match &self.base_color {
            Some(color) => {
                let mut rgb = color.splitn(3, ' ');
                if let (Some(r), Some(g), Some(b)) =
                    (rgb.next(), rgb.next(), rgb.next())
                {
                    if let (Ok(r), Ok(g), Ok(b)) =
                        (r.parse::<f32>(), g.parse::<f32>(), b.parse::<f32>())
                    {
                        return Ok(Some(Color::rgb(r, g, b)));
                    }
                }
                bail!("Invalid base color: {color}")
            }
            None => Ok(None),
        }
    }
}

impl TryFrom<&TreeDef> for TreeParams {
    type Error = Error;

    fn try_from(def: &TreeDef) -> Result<Self> {
        let mut params = TreeParams::default();
        if let Some(height) = def.height {
            params = params.height(height);
        }
        if let Some(radius_base) = def.radius_base {
            params = params.radius_base(radius_base);
        }
        if let Some(branch_levels) = def.branch_levels {
            params = params.branch_levels(branch_levels);
        }
        if let Some(points_per_level) = def.points_per_level {
            params = params.points_per_level(points_per_level);
        }
        if let Some(color_variation) = def.color_variation {
            params = params.color_variation(color_variation);
        }
        if let Some(base_color) = def.base_color()? {
            params = params.base_color(base_color);
        }
        Ok(params)
    }
}
