//! Raster coordinate reference systems.
//!
//! Loss layers come as WGS84 geographic, Web Mercator or WGS84 UTM rasters.
//! The CRS is read from the GeoKey directory and every conversion goes
//! through WGS84 longitude/latitude in degrees.

use std::fmt;

use geo::{coord, Rect};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use super::error::RasterError;
use crate::coord::{lon_lat_to_web_mercator, web_mercator_to_lon_lat, BoundingBox};

/// EPSG code of WGS84 longitude/latitude.
pub const EPSG_WGS84: u32 = 4326;

/// EPSG code of spherical Web Mercator.
pub const EPSG_WEB_MERCATOR: u32 = 3857;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const USER_DEFINED: u16 = 32767;

const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Native CRS of a raster layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterCrs {
    /// EPSG:4326, degrees
    Wgs84,
    /// EPSG:3857, spherical meters
    WebMercator,
    /// EPSG:326xx (north) or EPSG:327xx (south), meters
    Utm { zone: u8, south: bool },
}

impl RasterCrs {
    /// Resolves an EPSG code.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::UnsupportedCrs`] for any other code.
    pub fn from_epsg(code: u32) -> Result<Self, RasterError> {
        match code {
            EPSG_WGS84 => Ok(RasterCrs::Wgs84),
            EPSG_WEB_MERCATOR | 900_913 => Ok(RasterCrs::WebMercator),
            32601..=32660 => Ok(RasterCrs::Utm {
                zone: (code - 32600) as u8,
                south: false,
            }),
            32701..=32760 => Ok(RasterCrs::Utm {
                zone: (code - 32700) as u8,
                south: true,
            }),
            other => Err(RasterError::UnsupportedCrs(format!("EPSG:{}", other))),
        }
    }

    /// Reads the CRS from a `GeoKeyDirectoryTag`.
    ///
    /// The directory is a 4-short header followed by 4-short entries of
    /// `(key, location, count, value)`; only inline values are read. A
    /// projected CS key wins over a geographic one; a geographic model
    /// without an explicit code is taken as WGS84.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::UnsupportedCrs`] when no usable EPSG code is
    /// present.
    pub fn from_geokeys(directory: &[u16]) -> Result<Self, RasterError> {
        let mut model_type = None;
        let mut geographic = None;
        let mut projected = None;

        for entry in directory.get(4..).unwrap_or_default().chunks_exact(4) {
            let (key, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 {
                continue;
            }
            match key {
                GT_MODEL_TYPE_KEY => model_type = Some(value),
                GEOGRAPHIC_TYPE_KEY => geographic = Some(value),
                PROJECTED_CS_TYPE_KEY => projected = Some(value),
                _ => {}
            }
        }

        match (projected, geographic, model_type) {
            (Some(code), _, _) if code != USER_DEFINED => Self::from_epsg(code as u32),
            (_, Some(code), _) if code != USER_DEFINED => Self::from_epsg(code as u32),
            (None, None, Some(MODEL_TYPE_GEOGRAPHIC)) => Ok(RasterCrs::Wgs84),
            _ => Err(RasterError::UnsupportedCrs(
                "no EPSG code in GeoKey directory".to_string(),
            )),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            RasterCrs::Wgs84 => EPSG_WGS84,
            RasterCrs::WebMercator => EPSG_WEB_MERCATOR,
            RasterCrs::Utm { zone, south: false } => 32600 + *zone as u32,
            RasterCrs::Utm { zone, south: true } => 32700 + *zone as u32,
        }
    }

    /// True when native units are degrees.
    pub fn is_geographic(&self) -> bool {
        matches!(self, RasterCrs::Wgs84)
    }

    /// PROJ definition for UTM zones.
    fn proj_string(&self) -> Option<String> {
        match self {
            RasterCrs::Utm { zone, south } => Some(format!(
                "+proj=utm +zone={}{} +datum=WGS84 +units=m +no_defs",
                zone,
                if *south { " +south" } else { "" }
            )),
            _ => None,
        }
    }
}

impl fmt::Display for RasterCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Converts between WGS84 degrees and a raster's native CRS.
pub struct CrsTransformer {
    crs: RasterCrs,
    /// WGS84 and UTM definitions, only for UTM rasters
    utm: Option<(Proj, Proj)>,
}

impl fmt::Debug for CrsTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrsTransformer")
            .field("crs", &self.crs)
            .finish_non_exhaustive()
    }
}

impl CrsTransformer {
    /// Prepares a transformer for `crs`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::UnsupportedCrs`] when the PROJ definition is
    /// rejected.
    pub fn new(crs: RasterCrs) -> Result<Self, RasterError> {
        let utm = match crs.proj_string() {
            Some(definition) => {
                let wgs84 = Proj::from_proj_string(WGS84_PROJ)
                    .map_err(|e| RasterError::UnsupportedCrs(format!("WGS84: {:?}", e)))?;
                let utm = Proj::from_proj_string(&definition)
                    .map_err(|e| RasterError::UnsupportedCrs(format!("{}: {:?}", crs, e)))?;
                Some((wgs84, utm))
            }
            None => None,
        };
        Ok(Self { crs, utm })
    }

    pub fn crs(&self) -> RasterCrs {
        self.crs
    }

    /// WGS84 `(lon, lat)` to native `(x, y)`.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), RasterError> {
        match (&self.crs, &self.utm) {
            (RasterCrs::Wgs84, _) => Ok((lon, lat)),
            (RasterCrs::WebMercator, _) => Ok(lon_lat_to_web_mercator(lon, lat)),
            (RasterCrs::Utm { .. }, Some((wgs84, utm))) => {
                let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
                transform(wgs84, utm, &mut point).map_err(|e| {
                    RasterError::UnsupportedCrs(format!("{} forward transform: {:?}", self.crs, e))
                })?;
                Ok((point.0, point.1))
            }
            (RasterCrs::Utm { .. }, None) => Err(self.uninitialised()),
        }
    }

    /// Native `(x, y)` to WGS84 `(lon, lat)`.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), RasterError> {
        match (&self.crs, &self.utm) {
            (RasterCrs::Wgs84, _) => Ok((x, y)),
            (RasterCrs::WebMercator, _) => Ok(web_mercator_to_lon_lat(x, y)),
            (RasterCrs::Utm { .. }, Some((wgs84, utm))) => {
                let mut point = (x, y, 0.0);
                transform(utm, wgs84, &mut point).map_err(|e| {
                    RasterError::UnsupportedCrs(format!("{} inverse transform: {:?}", self.crs, e))
                })?;
                Ok((point.0.to_degrees(), point.1.to_degrees()))
            }
            (RasterCrs::Utm { .. }, None) => Err(self.uninitialised()),
        }
    }

    /// Geographic bounds of a native rectangle.
    ///
    /// Corners and edge midpoints are transformed so that curved edges of
    /// projected rasters are covered.
    pub fn native_to_geographic_bounds(
        &self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<BoundingBox, RasterError> {
        let mid_x = (min_x + max_x) / 2.0;
        let mid_y = (min_y + max_y) / 2.0;
        let samples = [
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (mid_x, min_y),
            (mid_x, max_y),
            (min_x, mid_y),
            (max_x, mid_y),
        ];

        let mut bounds = BoundingBox::new(f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for (x, y) in samples {
            let (lon, lat) = self.inverse(x, y)?;
            bounds.min_lat = bounds.min_lat.min(lat);
            bounds.max_lat = bounds.max_lat.max(lat);
            bounds.min_lon = bounds.min_lon.min(lon);
            bounds.max_lon = bounds.max_lon.max(lon);
        }
        Ok(bounds)
    }

    /// Native rectangle covering geographic bounds.
    pub fn geographic_to_native_rect(&self, bounds: &BoundingBox) -> Result<Rect<f64>, RasterError> {
        let (mid_lat, mid_lon) = bounds.center();
        let samples = [
            (bounds.min_lon, bounds.min_lat),
            (bounds.max_lon, bounds.min_lat),
            (bounds.max_lon, bounds.max_lat),
            (bounds.min_lon, bounds.max_lat),
            (mid_lon, bounds.min_lat),
            (mid_lon, bounds.max_lat),
            (bounds.min_lon, mid_lat),
            (bounds.max_lon, mid_lat),
        ];

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (lon, lat) in samples {
            let (x, y) = self.forward(lon, lat)?;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Ok(Rect::new(
            coord! { x: min_x, y: min_y },
            coord! { x: max_x, y: max_y },
        ))
    }

    fn uninitialised(&self) -> RasterError {
        RasterError::UnsupportedCrs(format!("{} transformer not initialised", self.crs))
    }
}
