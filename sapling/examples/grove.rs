// grove example
use anyhow::Result;
use argh::FromArgs;
use sapling::{Color, Tree, TreeParams};
use std::fs::File;

/// Command-line arguments
#[derive(FromArgs, PartialEq, Debug)]
struct Args {
    /// random seed
    #[argh(positional)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    let mut rng = match args.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let params = TreeParams::default()
        .height(12.0)
        .radius_base(0.8)
        .branch_levels(5)
        .points_per_level(1500)
        .color_variation(0.3)
        .base_color(Color::rgb(0.18, 0.55, 0.34));
    let tree = Tree::generate(&params, &mut rng)?;
    let file = File::create("grove.glb")?;
    tree.write_gltf(file)?;
    Ok(())
}
