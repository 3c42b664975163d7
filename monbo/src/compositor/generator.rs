//! Map image generation.

use std::path::PathBuf;

use image::RgbaImage;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use super::error::MapGenerationError;
use super::stage::{CompositorStage, StageTrace};
use crate::coord::{calculate_zoom_from_bounds, BoundingBox, ImageSize, ZoomRange};
use crate::geometry::{calculate_geometry_center, geometry_bounds, FarmGeometry, GeometryError};
use crate::provider::{AsyncReqwestClient, SatelliteProvider, StaticMapProvider};
use crate::raster::warp_to_mercator;
use crate::render::{
    composite, deforestation_layer, encode_png, render_feature_overlay, solid_background, MapView,
};

/// Default context around the farm, relative to its extent.
pub const DEFAULT_PADDING_RATIO: f64 = 0.1;

/// Largest accepted padding ratio.
pub const MAX_PADDING_RATIO: f64 = 0.3;

/// Compositor used by the CLI.
pub type StaticMapCompositor = MapCompositor<StaticMapProvider<AsyncReqwestClient>>;

/// Output settings shared by all requests of a compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub size: ImageSize,
    /// Padding added on each side, clamped to `0.0..=MAX_PADDING_RATIO`
    pub padding_ratio: f64,
    pub zoom_range: ZoomRange,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            size: ImageSize::default(),
            padding_ratio: DEFAULT_PADDING_RATIO,
            zoom_range: ZoomRange::default(),
        }
    }
}

/// One map to render.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    pub geometry: FarmGeometry,
    /// Loss layer drawn between the satellite image and the farm
    pub raster: Option<PathBuf>,
}

impl MapRequest {
    pub fn new(geometry: FarmGeometry) -> Self {
        Self {
            geometry,
            raster: None,
        }
    }

    pub fn with_raster(mut self, path: impl Into<PathBuf>) -> Self {
        self.raster = Some(path.into());
        self
    }
}

/// Where the bottom layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Satellite,
    /// Solid color, no provider or an unusable response
    Fallback,
}

/// A composed map and how it was produced.
#[derive(Debug, Clone)]
pub struct MapImage {
    pub image: RgbaImage,
    pub view: MapView,
    pub background: Background,
    /// True when the deforestation layer was drawn
    pub raster_layer: bool,
    pub trace: StageTrace,
}

impl MapImage {
    pub fn zoom(&self) -> u8 {
        self.view.zoom
    }

    /// PNG bytes of the image.
    pub fn to_png(&self) -> Result<Vec<u8>, MapGenerationError> {
        Ok(encode_png(&self.image)?)
    }
}

/// Renders satellite maps of farms with their deforestation overlay.
pub struct MapCompositor<P: SatelliteProvider> {
    provider: Option<P>,
    options: MapOptions,
}

impl<P: SatelliteProvider> MapCompositor<P> {
    /// Creates a compositor.
    ///
    /// Without a provider every map gets the solid background.
    pub fn new(provider: Option<P>, options: MapOptions) -> Self {
        let padding_ratio = options.padding_ratio.clamp(0.0, MAX_PADDING_RATIO);
        if padding_ratio != options.padding_ratio {
            warn!(
                requested = options.padding_ratio,
                used = padding_ratio,
                "Padding ratio clamped"
            );
        }
        Self {
            provider,
            options: MapOptions {
                padding_ratio,
                ..options
            },
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Runs the pipeline for one request.
    ///
    /// Stages run strictly in order. Raster and overlay work is moved off
    /// the async executor with `spawn_blocking`.
    ///
    /// # Errors
    ///
    /// * [`MapGenerationError::Geometry`] for a farm without extent
    /// * [`MapGenerationError::Imagery`] for transport or credential failures
    ///   of the provider
    /// * [`MapGenerationError::Raster`] for raster failures other than a
    ///   missing overlap
    pub async fn generate(&self, request: &MapRequest) -> Result<MapImage, MapGenerationError> {
        let mut trace = StageTrace::default();
        let size = self.options.size;

        trace.enter(CompositorStage::ComputeBounds)?;
        let bounds = geometry_bounds(&request.geometry)
            .filter(|b| b.min_lat.is_finite() && b.min_lon.is_finite())
            .ok_or_else(|| {
                GeometryError::ParameterValidation("geometry has no extent".to_string())
            })?;
        debug!(
            min_lat = bounds.min_lat,
            max_lat = bounds.max_lat,
            min_lon = bounds.min_lon,
            max_lon = bounds.max_lon,
            padding_ratio = self.options.padding_ratio,
            "Map bounds"
        );

        // Padding is applied in Mercator space by the zoom fit
        trace.enter(CompositorStage::ComputeZoom)?;
        let zoom = calculate_zoom_from_bounds(
            &bounds,
            size,
            self.options.padding_ratio,
            self.options.zoom_range,
        );
        let view = self.view_for(&request.geometry, &bounds, zoom);

        trace.enter(CompositorStage::FetchSatellite)?;
        let (base, background) = self.fetch_background(&view).await?;

        trace.enter(CompositorStage::RenderFeatureOverlay)?;
        let geometry = request.geometry.clone();
        let overlay = spawn_blocking(move || render_feature_overlay(&geometry, &view))
            .await
            .map_err(|e| MapGenerationError::Task(e.to_string()))??;

        let mut layers = Vec::with_capacity(2);
        if let Some(path) = request.raster.clone() {
            trace.enter(CompositorStage::RenderRasterOverlay)?;
            let mercator = view.mercator;
            let warped = spawn_blocking(move || warp_to_mercator(&path, &mercator, size))
                .await
                .map_err(|e| MapGenerationError::Task(e.to_string()))?;
            match warped {
                Ok(mask) => layers.push(deforestation_layer(&mask)),
                Err(e) if e.is_recoverable() => {
                    debug!("Raster does not cover the map, layer omitted");
                }
                Err(e) => return Err(e.into()),
            }
        }
        let raster_layer = !layers.is_empty();
        layers.push(overlay);

        trace.enter(CompositorStage::Composite)?;
        let image = composite(base, &layers)?;

        info!(
            zoom,
            size = %size,
            background = ?background,
            raster_layer,
            "Map generated"
        );
        Ok(MapImage {
            image,
            view,
            background,
            raster_layer,
            trace,
        })
    }

    /// Image frame centered on the farm.
    fn view_for(&self, geometry: &FarmGeometry, bounds: &BoundingBox, zoom: u8) -> MapView {
        let (lat, lon) = match calculate_geometry_center(geometry) {
            Some(center) => (center.y, center.x),
            None => bounds.center(),
        };
        MapView::new(lat, lon, zoom, self.options.size)
    }

    async fn fetch_background(
        &self,
        view: &MapView,
    ) -> Result<(RgbaImage, Background), MapGenerationError> {
        let fallback = || (solid_background(view.size), Background::Fallback);

        let Some(provider) = &self.provider else {
            warn!("No imagery provider configured, using solid background");
            return Ok(fallback());
        };

        match provider
            .fetch_satellite(view.center_lat, view.center_lon, view.zoom, view.size)
            .await
        {
            Ok(image) => Ok((image, Background::Satellite)),
            Err(e) if e.degrades_to_fallback() => {
                warn!(provider = provider.name(), error = %e, "Satellite image unusable, using solid background");
                Ok(fallback())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{build_geometry, LngLat};
    use crate::provider::{MockAsyncHttpClient, ProviderError};
    use crate::raster::test_support::write_geotiff;
    use crate::render::SOLID_BACKGROUND;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;
    use tempfile::TempDir;

    const SECRET: &str = "vNIXE0xscrmjlyV-12Nj_BvUPaw=";

    type MockCompositor = MapCompositor<StaticMapProvider<MockAsyncHttpClient>>;

    fn farm() -> FarmGeometry {
        build_geometry(
            &[
                LngLat::new(-50.46, 10.12),
                LngLat::new(-50.45, 10.12),
                LngLat::new(-50.45, 10.13),
                LngLat::new(-50.46, 10.13),
            ],
            None,
        )
        .unwrap()
    }

    fn options() -> MapOptions {
        MapOptions {
            size: ImageSize::new(120, 100),
            ..Default::default()
        }
    }

    fn blue_png(size: ImageSize) -> Vec<u8> {
        let image = RgbaImage::from_pixel(size.width, size.height, Rgba([0, 0, 200, 255]));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn compositor(response: Result<Vec<u8>, ProviderError>) -> MockCompositor {
        let provider =
            StaticMapProvider::new(MockAsyncHttpClient::new(response), "key", SECRET).unwrap();
        MapCompositor::new(Some(provider), options())
    }

    fn is_background(pixel: &Rgba<u8>) -> bool {
        let [r, g, b] = SOLID_BACKGROUND.0;
        *pixel == Rgba([r, g, b, 255])
    }

    #[tokio::test]
    async fn test_satellite_background_and_stages() {
        let compositor = compositor(Ok(blue_png(options().size)));
        let map = compositor.generate(&MapRequest::new(farm())).await.unwrap();

        assert_eq!(map.background, Background::Satellite);
        assert_eq!(map.image.dimensions(), (120, 100));
        assert_eq!(*map.image.get_pixel(0, 0), Rgba([0, 0, 200, 255]));
        assert!(!map.raster_layer);
        assert_eq!(
            map.trace.stages(),
            &[
                CompositorStage::ComputeBounds,
                CompositorStage::ComputeZoom,
                CompositorStage::FetchSatellite,
                CompositorStage::RenderFeatureOverlay,
                CompositorStage::Composite,
            ]
        );
    }

    #[tokio::test]
    async fn test_status_error_falls_back_to_solid_color() {
        let compositor = compositor(Err(ProviderError::HttpStatus(403)));
        let map = compositor.generate(&MapRequest::new(farm())).await.unwrap();
        assert_eq!(map.background, Background::Fallback);
        assert!(is_background(map.image.get_pixel(0, 0)));
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let compositor = compositor(Err(ProviderError::HttpError("connect".into())));
        let result = compositor.generate(&MapRequest::new(farm())).await;
        assert!(matches!(
            result,
            Err(MapGenerationError::Imagery(ProviderError::HttpError(_)))
        ));
    }

    #[tokio::test]
    async fn test_no_provider_uses_fallback() {
        let compositor: MockCompositor = MapCompositor::new(None, options());
        let map = compositor.generate(&MapRequest::new(farm())).await.unwrap();
        assert_eq!(map.background, Background::Fallback);
    }

    #[tokio::test]
    async fn test_raster_outside_view_is_omitted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loss.tif");
        write_geotiff(&path, 10, 10, &[1; 100], (20.0, 20.0), 0.01, 4326, None);

        let compositor: MockCompositor = MapCompositor::new(None, options());
        let map = compositor
            .generate(&MapRequest::new(farm()).with_raster(&path))
            .await
            .unwrap();
        assert!(!map.raster_layer);
        assert!(map.trace.contains(CompositorStage::RenderRasterOverlay));
        assert!(map.trace.contains(CompositorStage::Composite));
    }

    #[tokio::test]
    async fn test_raster_layer_drawn_under_farm() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loss.tif");
        write_geotiff(&path, 100, 100, &[1; 10_000], (-51.0, 10.6), 0.01, 4326, None);

        let compositor: MockCompositor = MapCompositor::new(None, options());
        let map = compositor
            .generate(&MapRequest::new(farm()).with_raster(&path))
            .await
            .unwrap();
        assert!(map.raster_layer);
        // Corner lies outside the farm but inside the raster
        let corner = map.image.get_pixel(0, 0);
        assert!(corner[0] > 150, "deforestation over background {:?}", corner);
    }

    #[tokio::test]
    async fn test_missing_raster_is_fatal() {
        let compositor: MockCompositor = MapCompositor::new(None, options());
        let result = compositor
            .generate(&MapRequest::new(farm()).with_raster("/nonexistent/loss.tif"))
            .await;
        assert!(matches!(result, Err(MapGenerationError::Raster(_))));
    }

    #[tokio::test]
    async fn test_empty_geometry_is_rejected() {
        let empty = build_geometry(&[], None).unwrap();
        let compositor: MockCompositor = MapCompositor::new(None, options());
        let result = compositor.generate(&MapRequest::new(empty)).await;
        assert!(matches!(result, Err(MapGenerationError::Geometry(_))));
    }

    #[tokio::test]
    async fn test_generation_is_deterministic() {
        let compositor: MockCompositor = MapCompositor::new(None, options());
        let request = MapRequest::new(farm());
        let first = compositor.generate(&request).await.unwrap();
        let second = compositor.generate(&request).await.unwrap();
        assert_eq!(first.image, second.image);
        assert_eq!(first.to_png().unwrap(), second.to_png().unwrap());
    }

    #[tokio::test]
    async fn test_padding_lowers_zoom() {
        let tight: MockCompositor = MapCompositor::new(
            None,
            MapOptions {
                padding_ratio: 0.0,
                ..Default::default()
            },
        );
        let loose: MockCompositor = MapCompositor::new(
            None,
            MapOptions {
                padding_ratio: MAX_PADDING_RATIO,
                ..Default::default()
            },
        );
        let request = MapRequest::new(farm());
        let tight_zoom = tight.generate(&request).await.unwrap().zoom();
        let loose_zoom = loose.generate(&request).await.unwrap().zoom();
        assert!(
            loose_zoom < tight_zoom,
            "padding {} should zoom out from {} to below it, got {}",
            MAX_PADDING_RATIO,
            tight_zoom,
            loose_zoom
        );
    }

    #[test]
    fn test_padding_is_clamped() {
        let compositor: MockCompositor = MapCompositor::new(
            None,
            MapOptions {
                padding_ratio: 0.9,
                ..Default::default()
            },
        );
        assert_eq!(compositor.options().padding_ratio, MAX_PADDING_RATIO);
    }
}
