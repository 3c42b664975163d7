//! monbo CLI - Command-line interface
//!
//! This binary exposes the monbo farm analysis library: consistency checks,
//! areas, deforestation ratios, farm maps and loss tiles.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::analyze::AnalyzeArgs;
use commands::area::AreaArgs;
use commands::config::ConfigCommands;
use commands::render::RenderArgs;
use commands::tile::TileArgs;
use commands::validate::ValidateArgs;
use error::CliError;
use runner::GlobalOptions;

#[derive(Parser)]
#[command(name = "monbo")]
#[command(version = monbo::VERSION)]
#[command(about = "Farm boundary analysis: overlaps, areas, deforestation and maps", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.monbo/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Print log events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report overlapping, empty and invalid farms
    Validate {
        /// Farm file (JSON array)
        farms: PathBuf,

        /// Overlap threshold percentage (0-100), overrides the config
        #[arg(long)]
        threshold: Option<f64>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute the ground area of each farm in square meters
    Area {
        /// Farm file (JSON array)
        farms: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute the deforestation ratio of every farm on every map layer
    Analyze {
        /// Farm file (JSON array)
        farms: PathBuf,

        /// Map layer file (JSON array of {id, name, path, pixelSizeM})
        #[arg(long)]
        maps: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Draw a farm on satellite imagery with its deforestation layer
    Render {
        /// Farm file (JSON array)
        farms: PathBuf,

        /// Farm id (default: first farm in the file)
        #[arg(long)]
        farm: Option<String>,

        /// Loss raster (single-band GeoTIFF)
        #[arg(long)]
        raster: Option<PathBuf>,

        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render one 256x256 XYZ tile of a loss raster
    Tile {
        /// Loss raster (single-band GeoTIFF)
        raster: PathBuf,

        /// Zoom level
        z: u8,

        /// Tile column
        x: u32,

        /// Tile row
        y: u32,

        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let global = GlobalOptions {
        config: cli.config.clone(),
        debug: cli.debug,
        verbose: cli.verbose,
    };

    let result: Result<(), CliError> = match cli.command {
        Commands::Validate {
            farms,
            threshold,
            output,
        } => commands::validate::run(
            &global,
            ValidateArgs {
                farms,
                threshold,
                output,
            },
        ),
        Commands::Area { farms, output } => {
            commands::area::run(&global, AreaArgs { farms, output })
        }
        Commands::Analyze {
            farms,
            maps,
            output,
        } => commands::analyze::run(
            &global,
            AnalyzeArgs {
                farms,
                maps,
                output,
            },
        ),
        Commands::Render {
            farms,
            farm,
            raster,
            output,
        } => commands::render::run(
            &global,
            RenderArgs {
                farms,
                farm_id: farm,
                raster,
                output,
            },
        ),
        Commands::Tile {
            raster,
            z,
            x,
            y,
            output,
        } => commands::tile::run(
            &global,
            TileArgs {
                raster,
                zoom: z,
                x,
                y,
                output,
            },
        ),
        Commands::Config { command } => commands::config::run(cli.config, command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tile_command() {
        let cli = Cli::parse_from(["monbo", "tile", "loss.tif", "8", "89", "121", "-o", "t.png"]);
        match cli.command {
            Commands::Tile { z, x, y, .. } => assert_eq!((z, x, y), (8, 89, 121)),
            _ => panic!("Expected tile command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["monbo", "validate", "farms.json", "--threshold", "10", "--debug"]);
        assert!(cli.debug);
        match cli.command {
            Commands::Validate { threshold, .. } => assert_eq!(threshold, Some(10.0)),
            _ => panic!("Expected validate command"),
        }
    }
}
