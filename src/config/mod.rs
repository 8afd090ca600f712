use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Recognized generator options.
///
/// Created once at construction and treated as immutable: updates replace
/// the whole record via [`FaviconConfig::merged`] rather than mutating
/// fields in place. Out-of-range values are not rejected; that is the
/// caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaviconConfig {
    /// Icon side length in pixels
    pub size: u32,
    /// Background used when no brand color can be extracted
    pub fallback_color: String,
    /// Color of the rendered initials
    pub text_color: String,
    /// Font family descriptor, participates in the cache signature
    pub font_family: String,
    /// Soft shadow beneath the initials
    pub enable_shadow: bool,
    /// Retry attempts for failed generation passes
    pub retry_attempts: u32,
    /// Per-image color extraction deadline in milliseconds
    pub timeout_ms: u64,
    /// Persist generated icons in the key-value store
    pub enable_caching: bool,
    /// Cache expiration in days
    pub cache_expiration_days: i64,
    /// Skip generation when the page already carries a favicon
    pub respect_existing: bool,
    /// Regenerate even when a cached or existing icon is present
    pub force_regenerate: bool,
    /// Probe the implicit root `/favicon.ico` resource
    pub check_implicit_favicon: bool,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            size: 32,
            fallback_color: "#2563eb".to_string(),
            text_color: "#ffffff".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            enable_shadow: true,
            retry_attempts: 3,
            timeout_ms: 2000,
            enable_caching: true,
            cache_expiration_days: 7,
            respect_existing: true,
            force_regenerate: false,
            check_implicit_favicon: false,
        }
    }
}

impl FaviconConfig {
    /// Load configuration from a TOML file, writing defaults when the
    /// file does not exist yet.
    pub fn load(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(path, contents)?;
            Ok(default_config)
        }
    }

    /// Produce a new config with every `Some` field of the update applied
    /// over this one (shallow merge).
    pub fn merged(&self, update: &ConfigUpdate) -> Self {
        let mut next = self.clone();
        if let Some(size) = update.size {
            next.size = size;
        }
        if let Some(ref color) = update.fallback_color {
            next.fallback_color = color.clone();
        }
        if let Some(ref color) = update.text_color {
            next.text_color = color.clone();
        }
        if let Some(ref family) = update.font_family {
            next.font_family = family.clone();
        }
        if let Some(shadow) = update.enable_shadow {
            next.enable_shadow = shadow;
        }
        if let Some(attempts) = update.retry_attempts {
            next.retry_attempts = attempts;
        }
        if let Some(timeout) = update.timeout_ms {
            next.timeout_ms = timeout;
        }
        if let Some(caching) = update.enable_caching {
            next.enable_caching = caching;
        }
        if let Some(days) = update.cache_expiration_days {
            next.cache_expiration_days = days;
        }
        if let Some(respect) = update.respect_existing {
            next.respect_existing = respect;
        }
        if let Some(force) = update.force_regenerate {
            next.force_regenerate = force;
        }
        if let Some(implicit) = update.check_implicit_favicon {
            next.check_implicit_favicon = implicit;
        }
        next
    }
}

/// Partial configuration for shallow merges.
///
/// Mirrors [`FaviconConfig`] with every field optional; `None` fields
/// leave the current value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub size: Option<u32>,
    pub fallback_color: Option<String>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
    pub enable_shadow: Option<bool>,
    pub retry_attempts: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub enable_caching: Option<bool>,
    pub cache_expiration_days: Option<i64>,
    pub respect_existing: Option<bool>,
    pub force_regenerate: Option<bool>,
    pub check_implicit_favicon: Option<bool>,
}
