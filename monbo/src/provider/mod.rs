//! Satellite imagery provider abstraction
//!
//! The map compositor fetches its base layer through the
//! [`SatelliteProvider`] trait. [`StaticMapProvider`] implements it against
//! the Google Maps Static API with signed URLs; the HTTP transport sits
//! behind [`AsyncHttpClient`] so that tests can substitute a mock.
//!
//! ```ignore
//! use monbo::provider::{AsyncReqwestClient, StaticMapProvider};
//!
//! let client = AsyncReqwestClient::new()?;
//! let provider = StaticMapProvider::new(client, api_key, &signature_secret)?;
//! ```

mod http;
mod static_map;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use static_map::{decode_secret, sign_url, StaticMapProvider, MAP_TYPE, STATIC_MAP_URL};
pub use types::{ProviderError, SatelliteProvider};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
