//! Automatic favicon synthesis from page content and styling.
//!
//! When a page has no favicon, this crate derives one at runtime: a
//! representative brand color extracted from logo pixels, computed
//! styles or CSS custom properties, combined with 1–2 initials taken
//! from the page title, rendered into a square PNG and exposed as a
//! data URI. Results are cached against a fingerprint of the page state
//! so an unchanged page never pays for regeneration twice.
//!
//! The host supplies the page through narrow collaborator traits
//! ([`dom::PageDom`], [`fetch::ImageFetcher`], [`store::KeyValueStore`]);
//! everything else lives here.
//!
//! ```no_run
//! use std::sync::Arc;
//! use auto_favicon::{FaviconConfig, FaviconGenerator};
//! use auto_favicon::dom::SnapshotDom;
//! use auto_favicon::fetch::HttpImageFetcher;
//! use auto_favicon::store::MemoryStore;
//!
//! # async fn run(snapshot: auto_favicon::dom::snapshot::PageSnapshot) {
//! let generator = FaviconGenerator::new(
//!     FaviconConfig::default(),
//!     Arc::new(SnapshotDom::new(snapshot)),
//!     Arc::new(HttpImageFetcher::new()),
//!     Some(Arc::new(MemoryStore::new())),
//! );
//! if let Some(icon) = generator.init().await {
//!     println!("{}", icon.as_data_url());
//! }
//! # }
//! ```

pub mod cache;
pub mod color;
pub mod config;
pub mod dom;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod generator;
pub mod models;
pub mod render;
pub mod signature;
pub mod store;
pub mod title;

pub use cache::{CacheInfo, FaviconCache};
pub use config::{ConfigUpdate, FaviconConfig};
pub use errors::FaviconError;
pub use generator::FaviconGenerator;
pub use models::IconArtifact;
