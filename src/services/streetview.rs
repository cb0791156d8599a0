//! Street-level imagery lookup.

use url::Url;

use crate::geo::Coordinate;
use crate::services::types::DetectionFailure;

/// Builds static Street View image URLs for a coordinate.
#[derive(Clone)]
pub struct StreetViewImagery {
    base: Url,
    size: String,
    api_key: String,
}

impl StreetViewImagery {
    pub fn new(base_url: &str, size: &str, api_key: String) -> Result<Self, DetectionFailure> {
        let base = Url::parse(base_url)
            .map_err(|e| DetectionFailure::Service(format!("invalid imagery URL '{}': {}", base_url, e)))?;
        Ok(Self {
            base,
            size: size.to_string(),
            api_key,
        })
    }

    /// Keyless locator of the image at `at`, suitable as evidence.
    pub fn evidence_url(&self, at: Coordinate) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("size", &self.size)
            .append_pair("location", &at.to_string())
            .append_pair("heading", "0")
            .append_pair("pitch", "0");
        url
    }

    /// Fetchable image URL, including the API key.
    pub fn image_url(&self, at: Coordinate) -> Url {
        let mut url = self.evidence_url(at);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }
}

impl std::fmt::Debug for StreetViewImagery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreetViewImagery")
            .field("base", &self.base.as_str())
            .field("size", &self.size)
            .finish()
    }
}
