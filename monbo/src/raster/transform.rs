//! Affine pixel ↔ CRS transform.

use geo::{coord, Rect};

/// Determinants below this make the transform non-invertible.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Affine mapping from pixel `(col, row)` to native CRS `(x, y)`.
///
/// `(col, row) = (0, 0)` is the outer corner of the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X of the top-left corner
    pub origin_x: f64,
    /// Y of the top-left corner
    pub origin_y: f64,
    /// Pixel width in CRS units
    pub pixel_width: f64,
    /// Pixel height in CRS units, negative for north-up rasters
    pub pixel_height: f64,
    /// Row contribution to x, usually 0
    pub rotation_x: f64,
    /// Column contribution to y, usually 0
    pub rotation_y: f64,
}

impl GeoTransform {
    /// North-up transform without rotation.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height: -pixel_height.abs(),
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }

    /// Builds the transform from `ModelTiepointTag` and `ModelPixelScaleTag`.
    ///
    /// Only the first tiepoint is used. Returns `None` when either tag is too
    /// short.
    pub fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);
        Some(Self::north_up(x - i * sx, y + j * sy, sx, sy))
    }

    /// Builds the transform from a row-major 4×4 `ModelTransformationTag`.
    pub fn from_model_transformation(matrix: &[f64]) -> Option<Self> {
        if matrix.len() < 16 {
            return None;
        }
        Some(Self {
            origin_x: matrix[3],
            origin_y: matrix[7],
            pixel_width: matrix[0],
            pixel_height: matrix[5],
            rotation_x: matrix[1],
            rotation_y: matrix[4],
        })
    }

    /// Pixel coordinates to CRS coordinates.
    #[inline]
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.rotation_x;
        let y = self.origin_y + col * self.rotation_y + row * self.pixel_height;
        (x, y)
    }

    /// CRS coordinates to fractional pixel coordinates.
    ///
    /// `None` when the transform is singular.
    #[inline]
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.pixel_width * self.pixel_height - self.rotation_x * self.rotation_y;
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let col = (self.pixel_height * dx - self.rotation_x * dy) / det;
        let row = (self.pixel_width * dy - self.rotation_y * dx) / det;
        Some((col, row))
    }

    /// Footprint of one pixel in CRS coordinates.
    pub fn cell_rect(&self, col: u32, row: u32) -> Rect<f64> {
        let (x1, y1) = self.pixel_to_geo(col as f64, row as f64);
        let (x2, y2) = self.pixel_to_geo(col as f64 + 1.0, row as f64 + 1.0);
        Rect::new(coord! { x: x1, y: y1 }, coord! { x: x2, y: y2 })
    }

    /// Transform of a sub-window starting at `(col_off, row_off)`.
    pub fn offset(&self, col_off: u32, row_off: u32) -> Self {
        let (origin_x, origin_y) = self.pixel_to_geo(col_off as f64, row_off as f64);
        Self {
            origin_x,
            origin_y,
            ..*self
        }
    }

    /// Area of one pixel in squared CRS units.
    pub fn pixel_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height - self.rotation_x * self.rotation_y).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geotransform_round_trip() {
        let transform = GeoTransform::north_up(0.0, 100.0, 1.0, 1.0);

        let (x, y) = transform.pixel_to_geo(10.0, 20.0);
        assert_eq!(x, 10.0);
        assert_eq!(y, 80.0);

        let (col, row) = transform.geo_to_pixel(10.0, 80.0).unwrap();
        assert!((col - 10.0).abs() < 1e-9);
        assert!((row - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_tiepoint() {
        let transform =
            GeoTransform::from_tiepoint(&[0.0, 0.0, 0.0, -50.5, 10.5, 0.0], &[0.001, 0.001, 0.0])
                .unwrap();
        assert_eq!(transform.origin_x, -50.5);
        assert_eq!(transform.origin_y, 10.5);
        assert_eq!(transform.pixel_height, -0.001);
        assert!(GeoTransform::from_tiepoint(&[0.0; 3], &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_from_tiepoint_with_offset_raster_point() {
        // Tiepoint anchored at pixel (10, 5)
        let transform =
            GeoTransform::from_tiepoint(&[10.0, 5.0, 0.0, 110.0, 95.0, 0.0], &[1.0, 1.0, 0.0])
                .unwrap();
        assert_eq!(transform.origin_x, 100.0);
        assert_eq!(transform.origin_y, 100.0);
    }

    #[test]
    fn test_from_model_transformation() {
        let matrix = [
            30.0, 0.0, 0.0, 500_000.0, //
            0.0, -30.0, 0.0, 4_000_000.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let transform = GeoTransform::from_model_transformation(&matrix).unwrap();
        assert_eq!(transform.pixel_to_geo(1.0, 1.0), (500_030.0, 3_999_970.0));
        assert_eq!(transform.pixel_area(), 900.0);
    }

    #[test]
    fn test_singular_transform_has_no_inverse() {
        let transform = GeoTransform::north_up(0.0, 0.0, 0.0, 1.0);
        assert!(transform.geo_to_pixel(1.0, 1.0).is_none());
    }

    #[test]
    fn test_offset_and_cell_rect() {
        let transform = GeoTransform::north_up(0.0, 10.0, 1.0, 1.0).offset(2, 3);
        assert_eq!((transform.origin_x, transform.origin_y), (2.0, 7.0));

        let cell = transform.cell_rect(0, 0);
        assert_eq!(cell.min(), coord! { x: 2.0, y: 6.0 });
        assert_eq!(cell.max(), coord! { x: 3.0, y: 7.0 });
    }
}
