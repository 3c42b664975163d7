//! Google Maps Static API satellite provider.
//!
//! # API Endpoint
//!
//! `https://maps.googleapis.com/maps/api/staticmap?maptype=satellite&size={W}x{H}&center={LAT},{LON}&zoom={Z}&key={API_KEY}&signature={SIG}`
//!
//! # Signing
//!
//! Every request carries a `signature` parameter: the HMAC-SHA1 of the URL's
//! `path?query`, keyed with the base64url-decoded signing secret and encoded
//! as base64url.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use hmac::{Hmac, Mac};
use image::imageops::FilterType;
use image::RgbaImage;
use reqwest::Url;
use sha1::Sha1;
use tracing::debug;

use super::http::AsyncHttpClient;
use super::types::{ProviderError, SatelliteProvider};
use crate::coord::ImageSize;

/// Static Maps endpoint.
pub const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Requested map type.
pub const MAP_TYPE: &str = "satellite";

/// Secrets are issued padded, but unpadded copies are accepted too.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

type HmacSha1 = Hmac<Sha1>;

/// Decodes a base64url signing secret.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidSecret`] when the secret is not base64url.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, ProviderError> {
    SECRET_ENGINE
        .decode(secret.trim())
        .map_err(|e| ProviderError::InvalidSecret(e.to_string()))
}

/// Appends a `signature` parameter to `url`.
///
/// # Arguments
///
/// * `url` - Absolute URL with a query string
/// * `key` - Decoded signing secret
///
/// # Errors
///
/// Returns [`ProviderError::InvalidResponse`] when `url` cannot be parsed.
pub fn sign_url(url: &str, key: &[u8]) -> Result<String, ProviderError> {
    let mut parsed =
        Url::parse(url).map_err(|e| ProviderError::InvalidResponse(format!("Bad URL: {}", e)))?;
    parsed.set_fragment(None);

    let to_sign = format!("{}?{}", parsed.path(), parsed.query().unwrap_or_default());
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| ProviderError::InvalidSecret(e.to_string()))?;
    mac.update(to_sign.as_bytes());
    let signature = URL_SAFE.encode(mac.finalize().into_bytes());

    Ok(format!("{}&signature={}", parsed.as_str(), signature))
}

/// Satellite imagery from the Google Maps Static API.
pub struct StaticMapProvider<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
    signing_key: Vec<u8>,
}

impl<C: AsyncHttpClient> StaticMapProvider<C> {
    /// Creates a provider.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `api_key` - Maps Platform API key
    /// * `signature_secret` - base64url URL signing secret
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingCredentials`] for an empty key or
    /// secret and [`ProviderError::InvalidSecret`] when the secret does not
    /// decode.
    pub fn new(
        http_client: C,
        api_key: impl Into<String>,
        signature_secret: &str,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredentials("API key".to_string()));
        }
        if signature_secret.trim().is_empty() {
            return Err(ProviderError::MissingCredentials(
                "URL signing secret".to_string(),
            ));
        }

        Ok(Self {
            http_client,
            api_key,
            signing_key: decode_secret(signature_secret)?,
        })
    }

    /// Unsigned request URL.
    pub fn build_url(&self, center_lat: f64, center_lon: f64, zoom: u8, size: ImageSize) -> String {
        format!(
            "{}?maptype={}&size={}x{}&center={},{}&zoom={}&key={}",
            STATIC_MAP_URL, MAP_TYPE, size.width, size.height, center_lat, center_lon, zoom,
            self.api_key
        )
    }

    /// Signed request URL.
    pub fn signed_url(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        size: ImageSize,
    ) -> Result<String, ProviderError> {
        sign_url(
            &self.build_url(center_lat, center_lon, zoom, size),
            &self.signing_key,
        )
    }
}

impl<C: AsyncHttpClient> SatelliteProvider for StaticMapProvider<C> {
    async fn fetch_satellite(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        size: ImageSize,
    ) -> Result<RgbaImage, ProviderError> {
        let url = self.signed_url(center_lat, center_lon, zoom, size)?;
        debug!(center_lat, center_lon, zoom, size = %size, "Fetching satellite image");

        let body = self.http_client.get(&url).await?;
        let image = image::load_from_memory(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Undecodable image: {}", e)))?
            .to_rgba8();

        if image.dimensions() != (size.width, size.height) {
            debug!(
                width = image.width(),
                height = image.height(),
                "Resizing satellite image to requested size"
            );
            return Ok(image::imageops::resize(
                &image,
                size.width,
                size.height,
                FilterType::Lanczos3,
            ));
        }
        Ok(image)
    }

    fn name(&self) -> &str {
        "Google Static Maps"
    }
}
