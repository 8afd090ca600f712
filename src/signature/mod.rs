//! Page state fingerprinting for cache invalidation
//!
//! A signature condenses the visually relevant page state plus the
//! rendering-relevant config subset into a short hex string used as the
//! cache key. The hash is a cheap 32-bit rolling hash: collisions only
//! cost an unnecessary regeneration, never a wrong icon, so nothing
//! stronger is warranted.

use chrono::Utc;
use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::config::FaviconConfig;
use crate::dom::PageDom;

/// Schema version baked into every signature; bump to invalidate all
/// previously cached icons.
const SIGNATURE_VERSION: &str = "1.0.0";

/// Maximum number of title characters that participate in the signature.
const TITLE_PREFIX_LEN: usize = 100;

/// Maximum number of logo sources that participate in the signature.
const LOGO_SRC_LIMIT: usize = 3;

/// Canonical ordered record reduced to the fingerprint.
#[derive(Debug, Serialize)]
struct SignatureData {
    title: String,
    domain: String,
    body_bg_color: String,
    body_text_color: String,
    logo_count: usize,
    logo_srcs: Vec<String>,
    config_hash: String,
    version: &'static str,
}

/// 32-bit rolling multiply-add string hash, rendered as lowercase hex.
pub fn simple_hash(input: &str) -> String {
    let mut hash: i32 = 0;
    for c in input.chars() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(c as i32);
    }
    format!("{:x}", hash.unsigned_abs())
}

/// Hash of the config fields that affect the rendered artifact. Fields
/// like `retry_attempts` stay out: changing them must not invalidate a
/// cached icon.
pub fn hash_config(config: &FaviconConfig) -> String {
    #[derive(Serialize)]
    struct ConfigSubset<'a> {
        size: u32,
        fallback_color: &'a str,
        text_color: &'a str,
        font_family: &'a str,
        enable_shadow: bool,
    }

    let subset = ConfigSubset {
        size: config.size,
        fallback_color: &config.fallback_color,
        text_color: &config.text_color,
        font_family: &config.font_family,
        enable_shadow: config.enable_shadow,
    };

    match serde_json::to_string(&subset) {
        Ok(json) => simple_hash(&json),
        Err(_) => "default".to_string(),
    }
}

/// Extract the host portion of the page URL, empty when unparseable.
fn domain_of(url: Option<String>) -> String {
    url.as_deref()
        .and_then(|u| Url::parse(u).ok())
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Whether an image looks like a logo for signature purposes.
fn is_logo_image(src: &str, class: &str, id: &str) -> bool {
    let needle = "logo";
    src.to_lowercase().contains(needle)
        || class.to_lowercase().contains(needle)
        || id.to_lowercase().contains(needle)
}

/// Compute the signature for the current page state and config.
///
/// Deterministic: unchanged page + unchanged config subset produce the
/// identical signature. Any failure assembling the canonical record falls
/// back to a degraded, deliberately cache-defeating signature.
pub fn compute(dom: &dyn PageDom, config: &FaviconConfig) -> String {
    let title = dom.title().unwrap_or_default();
    let body = dom.element_colors("body").unwrap_or_default();

    let logos: Vec<String> = dom
        .images()
        .iter()
        .filter(|img| is_logo_image(&img.src, &img.class, &img.id))
        .map(|img| img.src.clone())
        .collect();

    let data = SignatureData {
        title: title.chars().take(TITLE_PREFIX_LEN).collect(),
        domain: domain_of(dom.url()),
        body_bg_color: body.background_color.unwrap_or_default(),
        body_text_color: body.color.unwrap_or_default(),
        logo_count: logos.len(),
        logo_srcs: logos.into_iter().take(LOGO_SRC_LIMIT).collect(),
        config_hash: hash_config(config),
        version: SIGNATURE_VERSION,
    };

    match serde_json::to_string(&data) {
        Ok(json) => simple_hash(&json),
        Err(e) => {
            warn!("Signature serialization failed, using degraded signature: {}", e);
            degraded(dom)
        }
    }
}

/// Degraded signature from title + domain + current time. The timestamp
/// makes it unmatchable against any cached entry, forcing regeneration
/// instead of risking a stale icon.
pub fn degraded(dom: &dyn PageDom) -> String {
    let title = dom.title().unwrap_or_default();
    let domain = domain_of(dom.url());
    simple_hash(&format!("{}{}{}", title, domain, Utc::now().timestamp_millis()))
}
