//! Map image layers.
//!
//! A map image is composed, bottom to top, of the satellite base (or a
//! solid fallback), the deforestation mask and the farm overlay. All layers
//! share one [`MapView`] so that they align pixel for pixel.

mod layers;
mod overlay;
mod view;

use thiserror::Error;

pub use layers::{
    composite, deforestation_layer, encode_png, solid_background, DEFORESTATION, SOLID_BACKGROUND,
};
pub use overlay::{
    point_radius_pixels, render_feature_overlay, FEATURE_FILL, FEATURE_HIGHLIGHT, FEATURE_OUTLINE,
    MIN_POINT_RADIUS_PIXELS, POINT_LINE_WIDTH, POLYGON_LINE_WIDTH, SCALE_FACTOR,
};
pub use view::MapView;

/// Errors raised while drawing or encoding images.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("Layer is {actual:?}, expected {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Failed to encode image: {0}")]
    Encode(String),
}
