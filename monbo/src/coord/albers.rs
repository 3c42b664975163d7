//! Albers equal-area conic projection on the WGS84 ellipsoid.
//!
//! Areas measured in the projected plane equal areas on the ellipsoid, so
//! polygon areas are computed by projecting the ring and taking the planar
//! area. The forward formulas follow Snyder, "Map Projections: A Working
//! Manual", §14. When the two standard parallels are symmetric about the
//! equator the cone degenerates into a cylinder and the Lambert cylindrical
//! equal-area limit is used instead.

use super::types::{BoundingBox, CoordError, EARTH_RADIUS_METERS};

/// WGS84 first eccentricity squared.
const WGS84_E2: f64 = 0.006_694_379_990_14;

/// Cone constants below this are treated as a cylinder.
const CYLINDRICAL_EPSILON: f64 = 1e-10;

/// Standard parallels below this separation are treated as one parallel.
const PARALLEL_EPSILON: f64 = 1e-10;

/// Parameters of an Albers equal-area projection, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersParams {
    /// First standard parallel
    pub lat_1: f64,
    /// Second standard parallel
    pub lat_2: f64,
    /// Latitude of origin
    pub lat_0: f64,
    /// Central meridian
    pub lon_0: f64,
}

impl AlbersParams {
    /// Continental projection with standard parallels at 30°N and 60°N.
    pub fn global() -> Self {
        Self {
            lat_1: 30.0,
            lat_2: 60.0,
            lat_0: 0.0,
            lon_0: 0.0,
        }
    }

    /// Projection fitted to a bounding box.
    ///
    /// Standard parallels sit on the box's southern and northern edges and
    /// the origin on its midpoint.
    pub fn local(bounds: &BoundingBox) -> Self {
        Self {
            lat_1: bounds.min_lat,
            lat_2: bounds.max_lat,
            lat_0: (bounds.min_lat + bounds.max_lat) / 2.0,
            lon_0: (bounds.min_lon + bounds.max_lon) / 2.0,
        }
    }

    /// PROJ-style definition string, for logging.
    pub fn to_proj_string(&self) -> String {
        format!(
            "+proj=aea +lat_1={} +lat_2={} +lat_0={} +lon_0={} +ellps=WGS84 +units=m",
            self.lat_1, self.lat_2, self.lat_0, self.lon_0
        )
    }
}

/// Prepared Albers projection ready to project many points.
#[derive(Debug, Clone)]
pub struct AlbersProjection {
    params: AlbersParams,
    e: f64,
    /// Cone constant, zero for the cylindrical limit
    n: f64,
    c: f64,
    rho0: f64,
    /// Cylindrical scale factor at the standard parallel
    k0: f64,
}

impl AlbersProjection {
    /// Prepares the projection constants.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::Projection`] when a parameter is not finite or a
    /// standard parallel lies at a pole.
    pub fn new(params: AlbersParams) -> Result<Self, CoordError> {
        let all_finite = [params.lat_1, params.lat_2, params.lat_0, params.lon_0]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(CoordError::Projection(format!(
                "non-finite parameters in {}",
                params.to_proj_string()
            )));
        }
        if params.lat_1.abs() >= 90.0 || params.lat_2.abs() >= 90.0 {
            return Err(CoordError::Projection(format!(
                "standard parallel at a pole in {}",
                params.to_proj_string()
            )));
        }

        let e = WGS84_E2.sqrt();
        let phi1 = params.lat_1.to_radians();
        let phi2 = params.lat_2.to_radians();

        let m1 = m(phi1);
        let q1 = q(phi1, e);

        let n = if (phi1 - phi2).abs() >= PARALLEL_EPSILON {
            let m2 = m(phi2);
            let q2 = q(phi2, e);
            (m1 * m1 - m2 * m2) / (q2 - q1)
        } else {
            phi1.sin()
        };

        if n.abs() < CYLINDRICAL_EPSILON {
            return Ok(Self {
                params,
                e,
                n: 0.0,
                c: 0.0,
                rho0: 0.0,
                k0: m1,
            });
        }

        let c = m1 * m1 + n * q1;
        let q0 = q(params.lat_0.to_radians(), e);
        let rho0 = EARTH_RADIUS_METERS * (c - n * q0).max(0.0).sqrt() / n;

        Ok(Self {
            params,
            e,
            n,
            c,
            rho0,
            k0: m1,
        })
    }

    pub fn params(&self) -> &AlbersParams {
        &self.params
    }

    /// Projects `(lon, lat)` in degrees to planar meters.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lambda = (lon - self.params.lon_0).to_radians();
        let q = q(lat.to_radians(), self.e);

        if self.n == 0.0 {
            let x = EARTH_RADIUS_METERS * self.k0 * lambda;
            let y = EARTH_RADIUS_METERS * q / (2.0 * self.k0);
            return (x, y);
        }

        let rho = EARTH_RADIUS_METERS * (self.c - self.n * q).max(0.0).sqrt() / self.n;
        let theta = self.n * lambda;
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }
}

/// Snyder eq. 14-15.
fn m(phi: f64) -> f64 {
    let sin_phi = phi.sin();
    phi.cos() / (1.0 - WGS84_E2 * sin_phi * sin_phi).sqrt()
}

/// Snyder eq. 3-12.
fn q(phi: f64, e: f64) -> f64 {
    let sin_phi = phi.sin();
    let e_sin = e * sin_phi;
    (1.0 - WGS84_E2)
        * (sin_phi / (1.0 - e_sin * e_sin) - (1.0 / (2.0 * e)) * ((1.0 - e_sin) / (1.0 + e_sin)).ln())
}
