//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`validate`] - Overlap and geometry consistency report
//! - [`area`] - Farm areas
//! - [`analyze`] - Deforestation ratios per farm and layer
//! - [`render`] - Farm map image
//! - [`tile`] - XYZ tile of a loss raster
//! - [`config`] - Configuration management (path, show, init)

pub mod analyze;
pub mod area;
pub mod common;
pub mod config;
pub mod render;
pub mod tile;
pub mod validate;
