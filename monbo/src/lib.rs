//! monbo - farm boundary analysis
//!
//! Checks farm boundaries for consistency and measures deforestation inside
//! them:
//!
//! - [`geometry`] builds farm polygons (or point plus radius buffers),
//!   validates them and measures their area
//! - [`overlap`] finds overlapping farms with an R-tree and scores each pair
//! - [`raster`] samples deforestation loss rasters inside a farm and renders
//!   XYZ tiles of the loss layer
//! - [`compositor`] draws a farm map: satellite imagery, deforestation layer
//!   and farm outline
//! - [`analysis`] runs the deforestation sampling over many farms and layers
//!
//! # Example
//!
//! ```
//! use monbo::geometry::{build_geometry, LngLat};
//! use monbo::overlap::{FarmInput, OverlapDetector};
//!
//! let square = |x: f64| {
//!     build_geometry(
//!         &[
//!             LngLat::new(x, 0.0),
//!             LngLat::new(x + 0.01, 0.0),
//!             LngLat::new(x + 0.01, 0.01),
//!             LngLat::new(x, 0.01),
//!         ],
//!         None,
//!     )
//!     .unwrap()
//! };
//! let farms = vec![
//!     FarmInput::new("a", square(0.0)),
//!     FarmInput::new("b", square(0.005)),
//! ];
//! let overlaps = OverlapDetector::new(0.0).detect_overlaps(&farms);
//! assert_eq!(overlaps.len(), 1);
//! ```

pub mod analysis;
pub mod compositor;
pub mod config;
pub mod coord;
pub mod geometry;
pub mod logging;
pub mod overlap;
pub mod provider;
pub mod raster;
pub mod render;

/// Version of the monbo library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
