//! Image decoding collaborator
//!
//! The extractor needs decoded pixels for candidate logo images and a
//! cheap existence probe for the implicit `/favicon.ico`. Both sit behind
//! [`ImageFetcher`] so tests can supply canned bitmaps. The HTTP
//! implementation fetches bytes with `reqwest` and decodes them with the
//! `image` crate; the filesystem implementation backs the CLI.

use std::path::PathBuf;

use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

use crate::errors::ExtractionError;

/// Asynchronous URL → decoded pixel data.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch and decode the image at `url`. The caller bounds this with
    /// its own deadline; implementations only need to fail on transport
    /// or decode errors.
    async fn fetch(&self, url: &str) -> Result<DynamicImage, ExtractionError>;

    /// Whether a resource exists at `url` without downloading it.
    /// Backends without a cheap probe report `false`.
    async fn resource_exists(&self, _url: &str) -> bool {
        false
    }
}

/// [`ImageFetcher`] over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, ExtractionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractionError::decode(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExtractionError::decode(
                url,
                format!("HTTP status {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExtractionError::decode(url, e.to_string()))?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);

        image::load_from_memory(&bytes).map_err(|e| ExtractionError::decode(url, e.to_string()))
    }

    async fn resource_exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// [`ImageFetcher`] over the local filesystem, resolving URLs relative to
/// a base directory. Query strings are ignored.
#[derive(Debug, Clone)]
pub struct FileImageFetcher {
    base_dir: PathBuf,
}

impl FileImageFetcher {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = url.split('?').next().unwrap_or(url);
        self.base_dir.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ImageFetcher for FileImageFetcher {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, ExtractionError> {
        let path = self.resolve(url);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ExtractionError::decode(url, e.to_string()))?;
        image::load_from_memory(&bytes).map_err(|e| ExtractionError::decode(url, e.to_string()))
    }

    async fn resource_exists(&self, url: &str) -> bool {
        tokio::fs::metadata(self.resolve(url)).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_fetcher_missing_file_is_decode_error() {
        let fetcher = FileImageFetcher::new(PathBuf::from("/nonexistent"));
        let err = tokio_test::block_on(fetcher.fetch("/img/logo.png")).unwrap_err();
        assert!(matches!(err, ExtractionError::Decode { .. }));
        assert!(!tokio_test::block_on(
            fetcher.resource_exists("/img/logo.png")
        ));
    }

    #[test]
    fn test_file_fetcher_strips_query_string() {
        let fetcher = FileImageFetcher::new(PathBuf::from("/srv/site"));
        assert_eq!(
            fetcher.resolve("/favicon.ico?1234"),
            PathBuf::from("/srv/site/favicon.ico")
        );
        assert_eq!(
            fetcher.resolve("img/logo.png"),
            PathBuf::from("/srv/site/img/logo.png")
        );
    }
}
