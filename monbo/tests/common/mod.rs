//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgba, RgbaImage};
use tiff::encoder::compression::Packbits;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use monbo::geometry::LngLat;
use monbo::overlap::FarmInput;
use monbo::provider::{AsyncHttpClient, ProviderError};

/// Signing secret with a published reference signature.
pub const TEST_SECRET: &str = "vNIXE0xscrmjlyV-12Nj_BvUPaw=";

/// Writes a north-up single-band `u8` GeoTIFF in EPSG:4326.
///
/// `origin` is the `(lon, lat)` of the top-left corner.
pub fn write_wgs84_raster(
    path: &Path,
    width: u32,
    height: u32,
    data: &[u8],
    origin: (f64, f64),
    pixel_size: f64,
) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder.new_image::<colortype::Gray8>(width, height).unwrap();

    let scale = [pixel_size, pixel_size, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, origin.0, origin.1, 0.0];
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];

    let tags = image.encoder();
    tags.write_tag(Tag::ModelPixelScaleTag, &scale[..]).unwrap();
    tags.write_tag(Tag::ModelTiepointTag, &tiepoint[..]).unwrap();
    tags.write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..]).unwrap();

    image.write_data(data).unwrap();
}

/// Writes a PackBits-compressed EPSG:4326 GeoTIFF where every pixel is
/// `value`, strip by strip so the full image never sits in memory.
pub fn write_uniform_raster(
    path: &Path,
    size: u32,
    value: u8,
    origin: (f64, f64),
    pixel_size: f64,
) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder
        .new_image_with_compression::<colortype::Gray8, _>(size, size, Packbits)
        .unwrap();

    let scale = [pixel_size, pixel_size, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, origin.0, origin.1, 0.0];
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];

    let tags = image.encoder();
    tags.write_tag(Tag::ModelPixelScaleTag, &scale[..]).unwrap();
    tags.write_tag(Tag::ModelTiepointTag, &tiepoint[..]).unwrap();
    tags.write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..]).unwrap();

    loop {
        let count = image.next_strip_sample_count();
        if count == 0 {
            break;
        }
        image.write_strip(&vec![value; count as usize]).unwrap();
    }
    image.finish().unwrap();
}

/// Axis-aligned square farm with its south-west corner at `(lng, lat)`.
pub fn square_farm(id: &str, lng: f64, lat: f64, size: f64) -> FarmInput {
    let coords = [
        LngLat::new(lng, lat),
        LngLat::new(lng + size, lat),
        LngLat::new(lng + size, lat + size),
        LngLat::new(lng, lat + size),
    ];
    FarmInput::from_coordinates(id, &coords, None).unwrap()
}

/// PNG of a single color.
pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// HTTP client answering every request with a fixed response.
#[derive(Clone)]
pub struct StubHttpClient {
    response: Result<Vec<u8>, ProviderError>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubHttpClient {
    pub fn new(response: Result<Vec<u8>, ProviderError>) -> Self {
        Self {
            response,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl AsyncHttpClient for StubHttpClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.response.clone()
    }
}
