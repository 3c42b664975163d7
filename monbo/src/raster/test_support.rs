//! GeoTIFF fixtures for raster tests.

use std::fs::File;
use std::path::Path;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Writes a north-up single-band `u8` GeoTIFF.
///
/// `origin` is the `(x, y)` of the top-left corner and `pixel_size` the
/// square pixel edge in CRS units.
#[allow(clippy::too_many_arguments)]
pub(crate) fn write_geotiff(
    path: &Path,
    width: u32,
    height: u32,
    data: &[u8],
    origin: (f64, f64),
    pixel_size: f64,
    epsg: u16,
    nodata: Option<&str>,
) {
    write_geotiff_with_strips(path, width, height, data, origin, pixel_size, epsg, nodata, None);
}

/// Same as [`write_geotiff`] with `rows_per_strip` rows in each strip.
pub(crate) fn write_striped_geotiff(
    path: &Path,
    width: u32,
    height: u32,
    data: &[u8],
    origin: (f64, f64),
    rows_per_strip: u32,
) {
    write_geotiff_with_strips(
        path,
        width,
        height,
        data,
        origin,
        1.0,
        4326,
        None,
        Some(rows_per_strip),
    );
}

#[allow(clippy::too_many_arguments)]
fn write_geotiff_with_strips(
    path: &Path,
    width: u32,
    height: u32,
    data: &[u8],
    origin: (f64, f64),
    pixel_size: f64,
    epsg: u16,
    nodata: Option<&str>,
    rows_per_strip: Option<u32>,
) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder.new_image::<colortype::Gray8>(width, height).unwrap();
    if let Some(rows) = rows_per_strip {
        image.rows_per_strip(rows).unwrap();
    }

    let scale = [pixel_size, pixel_size, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, origin.0, origin.1, 0.0];
    let geokeys: [u16; 12] = if epsg == 4326 {
        [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, epsg]
    } else {
        [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, epsg]
    };

    let tags = image.encoder();
    tags.write_tag(Tag::ModelPixelScaleTag, &scale[..]).unwrap();
    tags.write_tag(Tag::ModelTiepointTag, &tiepoint[..]).unwrap();
    tags.write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..]).unwrap();
    if let Some(nodata) = nodata {
        tags.write_tag(Tag::GdalNodata, nodata).unwrap();
    }

    image.write_data(data).unwrap();
}
