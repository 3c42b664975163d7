//! Provider types and traits

use std::fmt;
use std::future::Future;

use image::RgbaImage;

use crate::coord::ImageSize;

/// Errors that can occur while fetching satellite imagery.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Transport failure: DNS, connect, timeout, broken body
    HttpError(String),
    /// Provider answered with a non-success status
    HttpStatus(u16),
    /// Body could not be decoded as an image
    InvalidResponse(String),
    /// API key or signing secret not configured
    MissingCredentials(String),
    /// Signing secret is not valid base64url
    InvalidSecret(String),
}

impl ProviderError {
    /// True when the background layer should fall back to a solid color
    /// instead of failing the request.
    pub fn degrades_to_fallback(&self) -> bool {
        matches!(
            self,
            ProviderError::HttpStatus(_) | ProviderError::InvalidResponse(_)
        )
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus(status) => {
                write!(f, "Imagery provider returned HTTP {}", status)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::MissingCredentials(what) => {
                write!(f, "Imagery provider credentials missing: {}", what)
            }
            ProviderError::InvalidSecret(msg) => write!(f, "Invalid signing secret: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Source of satellite base images.
///
/// The returned image must cover exactly the area that
/// [`get_image_bounds`](crate::coord::get_image_bounds) computes for the same
/// center, zoom and size, so that overlays line up with it.
pub trait SatelliteProvider: Send + Sync {
    /// Fetches a satellite image of `size` centered on a point.
    ///
    /// # Arguments
    ///
    /// * `center_lat` - Latitude of the image center in degrees
    /// * `center_lon` - Longitude of the image center in degrees
    /// * `zoom` - Web Mercator zoom level
    /// * `size` - Output size in pixels
    fn fetch_satellite(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        size: ImageSize,
    ) -> impl Future<Output = Result<RgbaImage, ProviderError>> + Send;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;
}
