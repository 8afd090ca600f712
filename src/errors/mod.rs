//! Error types for the favicon generator

pub mod types;

pub use types::{CacheError, ExtractionError, FaviconError, RenderError, StoreError};
