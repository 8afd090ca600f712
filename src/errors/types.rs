//! Error type definitions for the favicon generator
//!
//! This module defines all error types used throughout the crate,
//! providing a hierarchical error system. Nothing here is fatal to the
//! host application: the orchestrator maps every error kind to a
//! documented fallback, so the worst outcome is an unchanged page icon
//! or a generic placeholder.

use thiserror::Error;

/// Top-level error type
///
/// Represents all failures the generation pipeline can hit. Uses
/// `thiserror` for automatic trait implementations and error chaining.
#[derive(Error, Debug)]
pub enum FaviconError {
    /// Color extraction failures
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Cache layer failures
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Icon rasterization failures
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// DOM collaborator read/write failures
    #[error("DOM error: {message}")]
    Dom { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Color extraction specific errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Per-image sampling deadline exceeded
    #[error("Sampling timeout: {url}")]
    Timeout { url: String },

    /// Image could not be fetched or decoded
    #[error("Decode failed: {url} - {message}")]
    Decode { url: String, message: String },

    /// Every sampled pixel was transparent, near-white or near-black
    #[error("No usable pixels: {url}")]
    NoUsablePixels { url: String },
}

/// Cache layer specific errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// No key-value backend is attached
    #[error("Storage backend unavailable")]
    Unavailable,

    /// Persisted entry is structurally invalid
    #[error("Corrupt cache entry: {message}")]
    Corrupt { message: String },

    /// Backend write/read failures
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Key-value store collaborator errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend capacity exhausted on write
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    /// Any other backend failure
    #[error("Storage backend error: {message}")]
    Backend { message: String },
}

/// Icon rasterization specific errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Background color string was not a usable hex color
    #[error("Invalid background color: {color}")]
    InvalidColor { color: String },

    /// PNG encoding failure
    #[error("Encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

impl FaviconError {
    /// Create a DOM error with a custom message
    pub fn dom<S: Into<String>>(message: S) -> Self {
        Self::Dom {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl ExtractionError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a decode error
    pub fn decode<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl CacheError {
    /// Create a corrupt-entry error
    pub fn corrupt<S: Into<String>>(message: S) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

impl StoreError {
    /// Create a backend error
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
