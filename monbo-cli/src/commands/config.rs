//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show` and `config init`.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use monbo::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file plus environment)
    Show,

    /// Write a commented configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
///
/// Config commands do not initialize logging; they only touch the file.
pub fn run(config_path: Option<PathBuf>, command: ConfigCommands) -> Result<(), CliError> {
    let path = config_path.unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Init { force } => run_init(&path, force),
    }
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_effective(path)?;

    println!("Configuration ({})", path.display());
    println!("======================");
    println!();
    println!("[overlap]");
    println!("threshold_percentage = {}", config.overlap.threshold_percentage);
    println!();
    println!("[map]");
    println!("output_width = {}", config.map.output_width);
    println!("output_height = {}", config.map.output_height);
    println!("padding_ratio = {}", config.map.padding_ratio);
    println!("default_point_radius = {}", config.map.default_point_radius);
    println!("min_zoom = {}", config.map.min_zoom);
    println!("max_zoom = {}", config.map.max_zoom);
    println!();
    println!("[area]");
    println!("strict_accuracy = {}", config.area.strict_accuracy);
    println!();
    println!("[provider]");
    println!("api_key = {}", masked(config.provider.api_key.as_deref()));
    println!(
        "signature_secret = {}",
        masked(config.provider.signature_secret.as_deref())
    );
    println!("timeout = {}", config.provider.timeout);
    println!();
    println!("[logging]");
    println!("file = {}", config.logging.file.display());

    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }
    ConfigFile::default().save_to(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Hides a credential, keeping only whether it is set.
fn masked(value: Option<&str>) -> &'static str {
    match value {
        Some(_) => "(set)",
        None => "(not set)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");

        run_init(&path, false).unwrap();
        assert!(path.exists());
        assert!(matches!(run_init(&path, false), Err(CliError::Config(_))));
        run_init(&path, true).unwrap();
    }

    #[test]
    fn test_masked() {
        assert_eq!(masked(Some("secret")), "(set)");
        assert_eq!(masked(None), "(not set)");
    }
}
