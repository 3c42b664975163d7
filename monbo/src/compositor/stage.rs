//! Compositor pipeline stages.

use std::fmt;

use tracing::debug;

use super::error::MapGenerationError;

/// Stages of one map request, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompositorStage {
    ComputeBounds,
    ComputeZoom,
    FetchSatellite,
    RenderFeatureOverlay,
    /// Skipped when there is no raster or it does not cover the image
    RenderRasterOverlay,
    Composite,
}

impl CompositorStage {
    /// All stages in order.
    pub const ALL: [CompositorStage; 6] = [
        CompositorStage::ComputeBounds,
        CompositorStage::ComputeZoom,
        CompositorStage::FetchSatellite,
        CompositorStage::RenderFeatureOverlay,
        CompositorStage::RenderRasterOverlay,
        CompositorStage::Composite,
    ];

    /// The stage after this one, `None` after [`CompositorStage::Composite`].
    pub fn next(self) -> Option<Self> {
        let index = Self::ALL.iter().position(|&s| s == self)?;
        Self::ALL.get(index + 1).copied()
    }

    /// True for stages whose failure to produce output is not fatal.
    pub fn is_optional(self) -> bool {
        self == CompositorStage::RenderRasterOverlay
    }
}

impl fmt::Display for CompositorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompositorStage::ComputeBounds => "compute_bounds",
            CompositorStage::ComputeZoom => "compute_zoom",
            CompositorStage::FetchSatellite => "fetch_satellite",
            CompositorStage::RenderFeatureOverlay => "render_feature_overlay",
            CompositorStage::RenderRasterOverlay => "render_raster_overlay",
            CompositorStage::Composite => "composite",
        };
        f.write_str(name)
    }
}

/// Forward-only record of the stages a request went through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTrace {
    completed: Vec<CompositorStage>,
}

impl StageTrace {
    /// Records entry into `stage`.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenerationError::StageOrder`] when `stage` does not come
    /// after the last recorded stage; nothing is recorded in that case.
    pub(crate) fn enter(&mut self, stage: CompositorStage) -> Result<(), MapGenerationError> {
        if let Some(&after) = self.completed.last() {
            if stage <= after {
                return Err(MapGenerationError::StageOrder { stage, after });
            }
        }
        debug!(stage = %stage, "Compositor stage");
        self.completed.push(stage);
        Ok(())
    }

    /// Stages entered so far, in order.
    pub fn stages(&self) -> &[CompositorStage] {
        &self.completed
    }

    pub fn contains(&self, stage: CompositorStage) -> bool {
        self.completed.contains(&stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_walks_forward() {
        let mut stage = CompositorStage::ComputeBounds;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen, CompositorStage::ALL.to_vec());
        assert_eq!(CompositorStage::Composite.next(), None);
    }

    #[test]
    fn test_only_raster_overlay_is_optional() {
        let optional: Vec<_> = CompositorStage::ALL
            .iter()
            .filter(|s| s.is_optional())
            .collect();
        assert_eq!(optional, vec![&CompositorStage::RenderRasterOverlay]);
    }

    #[test]
    fn test_trace_records_in_order() {
        let mut trace = StageTrace::default();
        trace.enter(CompositorStage::ComputeBounds).unwrap();
        trace.enter(CompositorStage::ComputeZoom).unwrap();
        trace.enter(CompositorStage::Composite).unwrap();
        assert_eq!(
            trace.stages(),
            &[
                CompositorStage::ComputeBounds,
                CompositorStage::ComputeZoom,
                CompositorStage::Composite
            ]
        );
        assert!(!trace.contains(CompositorStage::RenderRasterOverlay));
    }

    #[test]
    fn test_trace_rejects_backward_transition() {
        let mut trace = StageTrace::default();
        trace.enter(CompositorStage::Composite).unwrap();

        let result = trace.enter(CompositorStage::ComputeZoom);
        assert!(matches!(
            result,
            Err(MapGenerationError::StageOrder {
                stage: CompositorStage::ComputeZoom,
                after: CompositorStage::Composite,
            })
        ));
        assert_eq!(trace.stages(), &[CompositorStage::Composite]);
    }

    #[test]
    fn test_trace_rejects_repeated_stage() {
        let mut trace = StageTrace::default();
        trace.enter(CompositorStage::FetchSatellite).unwrap();
        assert!(trace.enter(CompositorStage::FetchSatellite).is_err());
    }
}
