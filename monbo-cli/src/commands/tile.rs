//! Tile command - XYZ tile of a loss raster.

use std::path::PathBuf;

use monbo::coord::TileCoord;
use monbo::raster::render_tile;

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the tile command.
pub struct TileArgs {
    pub raster: PathBuf,
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
    pub output: PathBuf,
}

/// Run the tile command.
pub fn run(global: &GlobalOptions, args: TileArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("tile");

    let tile = TileCoord {
        x: args.x,
        y: args.y,
        zoom: args.zoom,
    };
    let png = render_tile(&args.raster, &tile).map_err(CliError::Tile)?;
    runner.write_file(&args.output, &png)?;

    println!(
        "Saved tile {}/{}/{} to {}",
        args.zoom,
        args.x,
        args.y,
        args.output.display()
    );
    Ok(())
}
