//! Anti-aliased farm outline overlay.

use geo::{Coord, LineString, Polygon};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, Shader, Stroke, Transform};
use tracing::debug;

use super::view::MapView;
use super::RenderError;
use crate::coord::pixels_per_meter;
use crate::geometry::FarmGeometry;

/// Oversampling factor of the overlay canvas.
pub const SCALE_FACTOR: u32 = 3;

/// Polygon fill.
pub const FEATURE_FILL: Rgba<u8> = Rgba([255, 235, 59, 40]);

/// Polygon and circle outline.
pub const FEATURE_OUTLINE: Rgba<u8> = Rgba([255, 235, 59, 230]);

/// Point circle fill.
pub const FEATURE_HIGHLIGHT: Rgba<u8> = Rgba([255, 235, 59, 120]);

/// Polygon outline width on the oversampled canvas.
pub const POLYGON_LINE_WIDTH: f32 = 6.0;

/// Circle outline width on the oversampled canvas.
pub const POINT_LINE_WIDTH: f32 = 3.0;

/// Smallest drawn point radius in output pixels.
pub const MIN_POINT_RADIUS_PIXELS: f64 = 25.0;

fn paint(color: Rgba<u8>) -> Paint<'static> {
    let [r, g, b, a] = color.0;
    Paint {
        shader: Shader::SolidColor(Color::from_rgba8(r, g, b, a)),
        anti_alias: true,
        ..Default::default()
    }
}

/// Renders a farm on a transparent canvas aligned with `view`.
///
/// Drawing happens on a canvas [`SCALE_FACTOR`] times larger than the
/// output, which is then downsampled with a Lanczos filter. Polygons get a
/// translucent fill and an opaque outline; points are drawn as a circle of
/// their radius, at least [`MIN_POINT_RADIUS_PIXELS`] wide.
///
/// # Errors
///
/// Returns [`RenderError::Canvas`] when the canvas cannot be allocated.
pub fn render_feature_overlay(
    geometry: &FarmGeometry,
    view: &MapView,
) -> Result<RgbaImage, RenderError> {
    let scaled = view.size.scaled(SCALE_FACTOR);
    let mut pixmap = Pixmap::new(scaled.width, scaled.height).ok_or(RenderError::Canvas {
        width: scaled.width,
        height: scaled.height,
    })?;
    let scale = SCALE_FACTOR as f64;

    match geometry {
        FarmGeometry::Polygon(polygon) => {
            if let Some(path) = polygon_path(polygon, view, scale) {
                pixmap.fill_path(
                    &path,
                    &paint(FEATURE_FILL),
                    FillRule::EvenOdd,
                    Transform::identity(),
                    None,
                );
                pixmap.stroke_path(
                    &path,
                    &paint(FEATURE_OUTLINE),
                    &Stroke {
                        width: POLYGON_LINE_WIDTH,
                        ..Default::default()
                    },
                    Transform::identity(),
                    None,
                );
            }
        }
        FarmGeometry::Point {
            center,
            radius_meters,
            ..
        } => {
            let (x, y) = view.to_pixel(center.x, center.y);
            let radius = point_radius_pixels(*radius_meters, center.y, view.zoom);
            debug!(x, y, radius, "Drawing point overlay");
            if let Some(path) = PathBuilder::from_circle(
                (x * scale) as f32,
                (y * scale) as f32,
                (radius * scale) as f32,
            ) {
                pixmap.fill_path(
                    &path,
                    &paint(FEATURE_HIGHLIGHT),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
                pixmap.stroke_path(
                    &path,
                    &paint(FEATURE_OUTLINE),
                    &Stroke {
                        width: POINT_LINE_WIDTH,
                        ..Default::default()
                    },
                    Transform::identity(),
                    None,
                );
            }
        }
    }

    Ok(downsample(&pixmap, view.size.width, view.size.height))
}

/// Circle radius in output pixels for a point of `radius_meters`.
pub fn point_radius_pixels(radius_meters: f64, lat: f64, zoom: u8) -> f64 {
    (radius_meters * pixels_per_meter(lat, zoom))
        .floor()
        .max(MIN_POINT_RADIUS_PIXELS)
}

fn polygon_path(polygon: &Polygon<f64>, view: &MapView, scale: f64) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
        add_ring(&mut builder, ring, view, scale);
    }
    builder.finish()
}

fn add_ring(builder: &mut PathBuilder, ring: &LineString<f64>, view: &MapView, scale: f64) {
    let mut points = ring.0.iter().map(|&Coord { x, y }| {
        let (px, py) = view.to_pixel(x, y);
        ((px * scale) as f32, (py * scale) as f32)
    });
    let Some((x, y)) = points.next() else {
        return;
    };
    builder.move_to(x, y);
    for (x, y) in points {
        builder.line_to(x, y);
    }
    builder.close();
}

/// Lanczos downsampling of premultiplied pixels, demultiplied afterwards so
/// that transparent neighbours do not darken the edges.
fn downsample(pixmap: &Pixmap, width: u32, height: u32) -> RgbaImage {
    let premultiplied = RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixmap.data().to_vec())
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()));
    let mut resized = image::imageops::resize(&premultiplied, width, height, FilterType::Lanczos3);

    for pixel in resized.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        *pixel = if a == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            let demultiply = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
            Rgba([demultiply(r), demultiply(g), demultiply(b), a])
        };
    }
    resized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::ImageSize;
    use crate::geometry::{build_geometry, LngLat};

    fn square_farm() -> FarmGeometry {
        build_geometry(
            &[
                LngLat::new(-50.01, 10.0),
                LngLat::new(-49.99, 10.0),
                LngLat::new(-49.99, 10.02),
                LngLat::new(-50.01, 10.02),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_polygon_overlay_fills_interior() {
        let view = MapView::new(10.01, -50.0, 13, ImageSize::new(200, 200));
        let overlay = render_feature_overlay(&square_farm(), &view).unwrap();
        assert_eq!(overlay.dimensions(), (200, 200));

        let center = overlay.get_pixel(100, 100);
        assert!(center[3] > 20 && center[3] < 80, "fill alpha {}", center[3]);
        assert!(center[0] > 200 && center[1] > 200, "fill color {:?}", center);

        let corner = overlay.get_pixel(0, 0);
        assert_eq!(corner[3], 0);
    }

    #[test]
    fn test_polygon_outline_is_opaque() {
        let view = MapView::new(10.01, -50.0, 13, ImageSize::new(200, 200));
        let overlay = render_feature_overlay(&square_farm(), &view).unwrap();

        let (x, _) = view.to_pixel(-50.01, 10.01);
        let edge = overlay.get_pixel(x.floor() as u32, 100);
        assert!(edge[3] > 120, "outline alpha {}", edge[3]);
    }

    #[test]
    fn test_point_has_minimum_radius() {
        assert_eq!(point_radius_pixels(1.0, 0.0, 10), MIN_POINT_RADIUS_PIXELS);
        assert!(point_radius_pixels(100.0, 0.0, 18) > 100.0);

        let farm = build_geometry(&[LngLat::new(-50.0, 10.0)], Some(1.0)).unwrap();
        let view = MapView::new(10.0, -50.0, 10, ImageSize::new(100, 100));
        let overlay = render_feature_overlay(&farm, &view).unwrap();

        // Inside the 25 px circle but well outside a 1 m one
        assert!(overlay.get_pixel(50 + 15, 50)[3] > 0);
        assert_eq!(overlay.get_pixel(50 + 40, 50)[3], 0);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let view = MapView::new(10.01, -50.0, 13, ImageSize::new(120, 90));
        let first = render_feature_overlay(&square_farm(), &view).unwrap();
        let second = render_feature_overlay(&square_farm(), &view).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_size_canvas_is_an_error() {
        let view = MapView::new(0.0, 0.0, 5, ImageSize::new(0, 10));
        assert!(matches!(
            render_feature_overlay(&square_farm(), &view),
            Err(RenderError::Canvas { .. })
        ));
    }
}
