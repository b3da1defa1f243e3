// main.rs      sap program
//
// Copyright (c) 2024-2025  Douglas Lau
//
mod mesh;
mod model;
mod stage;
mod view;

use crate::model::TreeDef;
use anyhow::{Context, Result};
use argh::FromArgs;
use sapling::{Tree, TreeParams};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Command-line arguments
#[derive(FromArgs, PartialEq, Debug)]
struct Args {
    /// view model
    #[argh(switch, short = 'v')]
    view: bool,

    /// random seed
    #[argh(option, short = 'r')]
    seed: Option<u64>,

    /// tree definition file (.muon)
    #[argh(positional)]
    def_file: Option<String>,
}

/// Main function
fn main() -> Result<()> {
    let args: Args = argh::from_env();
    let params = args.params()?;
    let mut rng = match args.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let tree = Tree::generate(&params, &mut rng).context("Generating tree")?;
    let out = args.out_path();
    let writer = File::create(&out)
        .with_context(|| format!("Cannot create {}", out.display()))?;
    tree.write_gltf(writer).context("Writing glTF")?;
    if args.view {
        view::view_tree(tree);
    }
    Ok(())
}

impl Args {
    /// Get tree parameters
    fn params(&self) -> Result<TreeParams> {
        match &self.def_file {
            Some(def_file) => {
                let path = Path::new(def_file);
                let file = File::open(path)
                    .with_context(|| format!("{} not found", path.display()))?;
                let def: TreeDef = muon_rs::from_reader(file)
                    .context("Invalid tree definition")?;
                TreeParams::try_from(&def)
            }
            None => Ok(TreeParams::default()),
        }
    }

    /// Get output path for the generated model
    fn out_path(&self) -> PathBuf {
        match &self.def_file {
            Some(def_file) => Path::new(def_file).with_extension("glb"),
            None => PathBuf::from("tree.glb"),
        }
    }
}
