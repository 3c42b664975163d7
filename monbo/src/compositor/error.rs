//! Map generation errors

use thiserror::Error;

use super::stage::CompositorStage;
use crate::geometry::GeometryError;
use crate::provider::ProviderError;
use crate::raster::RasterError;
use crate::render::RenderError;

/// Failures that abort a map request.
///
/// A raster that does not cover the image and a satellite response that
/// cannot be used are not errors: the layer is omitted or replaced by the
/// solid background.
#[derive(Debug, Error)]
pub enum MapGenerationError {
    #[error("Invalid map geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Satellite imagery failed: {0}")]
    Imagery(#[from] ProviderError),

    #[error("Error processing deforestation data: {0}")]
    Raster(#[from] RasterError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Stage {stage} cannot run after {after}")]
    StageOrder {
        stage: CompositorStage,
        after: CompositorStage,
    },

    /// A blocking render task panicked or was cancelled
    #[error("Render task failed: {0}")]
    Task(String),
}
