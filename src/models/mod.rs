//! Shared data types

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A rendered favicon: square PNG payload carried as a data URI.
///
/// The data URI string is the external contract; it is what gets
/// installed into icon links and persisted by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconArtifact {
    data_url: String,
    size: u32,
}

impl IconArtifact {
    /// Wrap freshly encoded PNG bytes.
    pub fn from_png_bytes(png: &[u8], size: u32) -> Self {
        Self {
            data_url: format!("{}{}", DATA_URL_PREFIX, BASE64.encode(png)),
            size,
        }
    }

    /// Rehydrate a persisted artifact. Rejects anything that is not a
    /// PNG data URI with decodable base64 payload.
    pub fn from_data_url(data_url: &str, size: u32) -> Option<Self> {
        let payload = data_url.strip_prefix(DATA_URL_PREFIX)?;
        BASE64.decode(payload).ok()?;
        Some(Self {
            data_url: data_url.to_string(),
            size,
        })
    }

    /// The embeddable `data:image/png;base64,...` string.
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    /// Decoded PNG bytes.
    pub fn png_bytes(&self) -> Vec<u8> {
        self.data_url
            .strip_prefix(DATA_URL_PREFIX)
            .and_then(|payload| BASE64.decode(payload).ok())
            .unwrap_or_default()
    }

    /// Icon side length in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }
}
