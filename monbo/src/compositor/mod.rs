//! Map compositor
//!
//! Produces the farm map image: a satellite base centered on the farm, the
//! deforestation layer of a loss raster and the farm outline on top. One
//! request runs through the [`CompositorStage`]s in order; only the raster
//! overlay may be skipped.
//!
//! ```ignore
//! use monbo::compositor::{MapOptions, MapRequest, StaticMapCompositor};
//!
//! let compositor = StaticMapCompositor::new(Some(provider), MapOptions::default());
//! let map = compositor.generate(&MapRequest::new(farm).with_raster(path)).await?;
//! std::fs::write("farm.png", map.to_png()?)?;
//! ```

mod error;
mod generator;
mod stage;

pub use error::MapGenerationError;
pub use generator::{
    Background, MapCompositor, MapImage, MapOptions, MapRequest, StaticMapCompositor,
    DEFAULT_PADDING_RATIO, MAX_PADDING_RATIO,
};
pub use stage::{CompositorStage, StageTrace};
