//! Dominant brand color extraction
//!
//! Four-stage pipeline, first validated hit wins:
//! logo pixel sampling → computed-style scoring → CSS custom property
//! probe → configured fallback. Logo pixels are the strongest brand
//! signal when present; structural styling is the next-best proxy;
//! custom properties capture explicit design-system intent; the constant
//! guarantees termination. `analyze` never fails.

use std::collections::HashMap;
use std::time::Duration;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::color;
use crate::config::FaviconConfig;
use crate::dom::{ImageContainer, PageDom, PageImage};
use crate::fetch::ImageFetcher;

/// Side of the downsampled working surface used for pixel tallying.
const SAMPLE_SIZE: u32 = 50;
/// Pixels below this alpha are treated as transparent.
const ALPHA_FLOOR: u8 = 128;
/// Channel quantization step when bucketing similar colors.
const GROUP_THRESHOLD: u8 = 20;
/// Sampling skips pixels with every channel above this.
const SAMPLE_WHITE_FLOOR: u8 = 240;
/// Sampling skips pixels with every channel below this.
const SAMPLE_BLACK_CEILING: u8 = 15;

/// Selectors inspected by style scoring, in priority order.
const STYLE_SELECTORS: &[&str] = &[
    "body", "header", ".header", "nav", ".navbar", ".nav", "main", ".main", ".container",
];

/// Conventional brand-color custom property names, in probe order.
const BRAND_PROPERTIES: &[&str] = &[
    "--primary-color",
    "--brand-color",
    "--accent-color",
    "--theme-color",
    "--main-color",
    "--primary",
    "--brand",
    "--accent",
];

/// Run the full pipeline. Always returns a color; the last resort is
/// `config.fallback_color`.
pub async fn analyze(
    dom: &dyn PageDom,
    fetcher: &dyn ImageFetcher,
    config: &FaviconConfig,
) -> String {
    if let Some(hex) = extract_logo_color(dom, fetcher, config).await {
        info!("Dominant color from logo sampling: {}", hex);
        return hex;
    }

    if let Some(hex) = extract_style_color(dom) {
        info!("Dominant color from style scoring: {}", hex);
        return hex;
    }

    if let Some(hex) = extract_custom_property_color(dom) {
        info!("Dominant color from custom property: {}", hex);
        return hex;
    }

    debug!("No extractable color, using fallback {}", config.fallback_color);
    config.fallback_color.clone()
}

/// Rank candidate logo images: attribute matches on "logo" first
/// (src, alt, class, id), then the first image inside header/nav/brand
/// containers. Discovery order is preserved within each tier and
/// duplicate sources are dropped.
fn rank_logo_candidates(images: &[PageImage]) -> Vec<String> {
    fn mentions_logo(value: &str) -> bool {
        value.to_lowercase().contains("logo")
    }

    let mut seen: Vec<String> = Vec::new();
    let mut add = |src: &str| {
        if !src.is_empty() && !seen.iter().any(|s| s == src) {
            seen.push(src.to_string());
        }
    };

    for img in images.iter().filter(|i| mentions_logo(&i.src)) {
        add(&img.src);
    }
    for img in images.iter().filter(|i| mentions_logo(&i.alt)) {
        add(&img.src);
    }
    for img in images.iter().filter(|i| mentions_logo(&i.class)) {
        add(&img.src);
    }
    for img in images.iter().filter(|i| mentions_logo(&i.id)) {
        add(&img.src);
    }
    for container in [ImageContainer::Header, ImageContainer::Nav, ImageContainer::Brand] {
        if let Some(img) = images.iter().find(|i| i.container == container) {
            add(&img.src);
        }
    }

    seen
}

/// Stage 1: sample pixels from candidate logo images.
async fn extract_logo_color(
    dom: &dyn PageDom,
    fetcher: &dyn ImageFetcher,
    config: &FaviconConfig,
) -> Option<String> {
    let candidates = rank_logo_candidates(&dom.images());
    if candidates.is_empty() {
        debug!("No logo images found");
        return None;
    }
    debug!("Found {} potential logo images", candidates.len());

    let deadline = Duration::from_millis(config.timeout_ms);
    for url in &candidates {
        let decoded = match tokio::time::timeout(deadline, fetcher.fetch(url)).await {
            Ok(Ok(img)) => img,
            Ok(Err(e)) => {
                debug!("Failed to decode candidate {}: {}", url, e);
                continue;
            }
            Err(_) => {
                warn!("Sampling timed out after {:?} for {}", deadline, url);
                continue;
            }
        };

        if let Some((r, g, b)) = dominant_pixel_bucket(&decoded) {
            let hex = color::rgb_to_hex(r, g, b);
            if color::is_valid(&hex) {
                debug!("Color extracted from logo {}: {}", url, hex);
                return Some(hex);
            }
            debug!("Dominant bucket of {} rejected as invalid: {}", url, hex);
        }
    }

    None
}

/// Downsample onto a small working surface and tally quantized opaque
/// pixels; the most frequent bucket wins. Ties break toward the lower
/// bucket so the result is deterministic.
fn dominant_pixel_bucket(img: &DynamicImage) -> Option<(u8, u8, u8)> {
    let surface = img
        .resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, image::imageops::FilterType::Triangle)
        .to_rgba8();

    let mut frequency: HashMap<(u8, u8, u8), u32> = HashMap::new();
    for pixel in surface.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < ALPHA_FLOOR {
            continue;
        }
        if r > SAMPLE_WHITE_FLOOR && g > SAMPLE_WHITE_FLOOR && b > SAMPLE_WHITE_FLOOR {
            continue;
        }
        if r < SAMPLE_BLACK_CEILING && g < SAMPLE_BLACK_CEILING && b < SAMPLE_BLACK_CEILING {
            continue;
        }
        let bucket = (
            r / GROUP_THRESHOLD * GROUP_THRESHOLD,
            g / GROUP_THRESHOLD * GROUP_THRESHOLD,
            b / GROUP_THRESHOLD * GROUP_THRESHOLD,
        );
        *frequency.entry(bucket).or_insert(0) += 1;
    }

    frequency
        .into_iter()
        .max_by_key(|&(bucket, count)| (count, std::cmp::Reverse(bucket)))
        .map(|(bucket, _)| bucket)
}

/// Stage 2: weighted scoring of structural element colors. Background
/// counts double, borders single, text half; near-black text is skipped
/// entirely so body copy never becomes the brand color.
fn extract_style_color(dom: &dyn PageDom) -> Option<String> {
    let mut scores: HashMap<String, f64> = HashMap::new();

    for selector in STYLE_SELECTORS {
        let Some(colors) = dom.element_colors(selector) else {
            continue;
        };

        if let Some(hex) = colors.background_color.as_deref().and_then(color::parse_color_string) {
            if color::is_valid(&hex) {
                *scores.entry(hex).or_insert(0.0) += 2.0;
            }
        }
        if let Some(hex) = colors.border_color.as_deref().and_then(color::parse_color_string) {
            if color::is_valid(&hex) {
                *scores.entry(hex).or_insert(0.0) += 1.0;
            }
        }
        if let Some(hex) = colors.color.as_deref().and_then(color::parse_color_string) {
            if color::is_valid(&hex) && !color::is_near_black(&hex) {
                *scores.entry(hex).or_insert(0.0) += 0.5;
            }
        }
    }

    scores
        .into_iter()
        .max_by(|(hex_a, score_a), (hex_b, score_b)| {
            score_a
                .partial_cmp(score_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| hex_b.cmp(hex_a))
        })
        .map(|(hex, _)| hex)
}

/// Stage 3: probe conventional design-system custom properties on the
/// root element.
fn extract_custom_property_color(dom: &dyn PageDom) -> Option<String> {
    for name in BRAND_PROPERTIES {
        let Some(value) = dom.custom_property(name) else {
            continue;
        };
        if let Some(hex) = color::parse_color_string(&value) {
            if color::is_valid(&hex) {
                debug!("Found custom property {}: {}", name, hex);
                return Some(hex);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::snapshot::{PageSnapshot, SnapshotDom};
    use crate::dom::ElementColors;
    use crate::errors::ExtractionError;
    use async_trait::async_trait;
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap as StdHashMap;

    struct CannedFetcher {
        images: StdHashMap<String, DynamicImage>,
    }

    #[async_trait]
    impl ImageFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<DynamicImage, ExtractionError> {
            self.images
                .get(url)
                .cloned()
                .ok_or_else(|| ExtractionError::decode(url, "not found"))
        }
    }

    struct NeverResolves;

    #[async_trait]
    impl ImageFetcher for NeverResolves {
        async fn fetch(&self, _url: &str) -> Result<DynamicImage, ExtractionError> {
            std::future::pending().await
        }
    }

    fn solid_image(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([r, g, b, 255])))
    }

    fn dom_with(
        elements: Vec<(&str, ElementColors)>,
        custom: Vec<(&str, &str)>,
        images: Vec<PageImage>,
    ) -> SnapshotDom {
        SnapshotDom::new(PageSnapshot {
            title: Some("Test".to_string()),
            elements: elements
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            custom_properties: custom
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            images,
            ..Default::default()
        })
    }

    fn bg(color: &str) -> ElementColors {
        ElementColors {
            background_color: Some(color.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_logo_candidates_priorities() {
        let images = vec![
            PageImage {
                src: "/hero.jpg".to_string(),
                container: ImageContainer::Header,
                ..Default::default()
            },
            PageImage {
                src: "/brand.png".to_string(),
                alt: "Company Logo".to_string(),
                ..Default::default()
            },
            PageImage {
                src: "/img/logo.svg".to_string(),
                ..Default::default()
            },
        ];

        let ranked = rank_logo_candidates(&images);
        // src match first, then alt match, then header container image.
        assert_eq!(ranked, vec!["/img/logo.svg", "/brand.png", "/hero.jpg"]);
    }

    #[test]
    fn test_rank_logo_candidates_dedups() {
        let images = vec![PageImage {
            src: "/logo.png".to_string(),
            alt: "logo".to_string(),
            class: "logo".to_string(),
            container: ImageContainer::Header,
            ..Default::default()
        }];
        assert_eq!(rank_logo_candidates(&images), vec!["/logo.png"]);
    }

    #[test]
    fn test_dominant_bucket_skips_white_black_transparent() {
        let mut img = RgbaImage::from_pixel(50, 50, Rgba([250, 250, 250, 255]));
        // A band of brand blue among the white.
        for x in 0..50 {
            for y in 0..10 {
                img.put_pixel(x, y, Rgba([37, 99, 235, 255]));
            }
        }
        // Transparent red must not win either.
        for x in 0..50 {
            for y in 10..20 {
                img.put_pixel(x, y, Rgba([255, 0, 0, 10]));
            }
        }
        let bucket = dominant_pixel_bucket(&DynamicImage::ImageRgba8(img)).unwrap();
        assert_eq!(bucket, (20, 80, 220));
    }

    #[tokio::test]
    async fn test_logo_color_wins_over_styles() {
        let dom = dom_with(
            vec![("body", bg("rgb(200, 16, 46)"))],
            vec![],
            vec![PageImage {
                src: "/logo.png".to_string(),
                ..Default::default()
            }],
        );
        let mut images = StdHashMap::new();
        images.insert("/logo.png".to_string(), solid_image(37, 99, 235));
        let fetcher = CannedFetcher { images };

        let hex = analyze(&dom, &fetcher, &FaviconConfig::default()).await;
        // Quantized bucket of solid rgb(37, 99, 235).
        assert_eq!(hex, "#1450dc");
    }

    #[tokio::test]
    async fn test_style_scoring_when_no_logo() {
        let dom = dom_with(
            vec![
                ("body", bg("rgb(37, 99, 235)")),
                ("header", bg("rgb(37, 99, 235)")),
                (
                    "nav",
                    ElementColors {
                        background_color: Some("#c8102e".to_string()),
                        ..Default::default()
                    },
                ),
            ],
            vec![],
            vec![],
        );
        let fetcher = CannedFetcher {
            images: StdHashMap::new(),
        };

        // Blue scores 4.0 across two elements, red only 2.0.
        let hex = analyze(&dom, &fetcher, &FaviconConfig::default()).await;
        assert_eq!(hex, "#2563eb");
    }

    #[tokio::test]
    async fn test_near_black_text_excluded_from_scoring() {
        let dom = dom_with(
            vec![(
                "body",
                ElementColors {
                    color: Some("#111111".to_string()),
                    ..Default::default()
                },
            )],
            vec![("--primary-color", "#2563eb")],
            vec![],
        );
        let fetcher = CannedFetcher {
            images: StdHashMap::new(),
        };

        // Body text is near-black, so the custom property wins.
        let hex = analyze(&dom, &fetcher, &FaviconConfig::default()).await;
        assert_eq!(hex, "#2563eb");
    }

    #[tokio::test]
    async fn test_fallback_when_nothing_extractable() {
        let dom = dom_with(vec![("body", bg("#ffffff"))], vec![], vec![]);
        let fetcher = CannedFetcher {
            images: StdHashMap::new(),
        };

        let hex = analyze(&dom, &fetcher, &FaviconConfig::default()).await;
        assert_eq!(hex, "#2563eb");
    }

    #[tokio::test]
    async fn test_timeout_falls_through_to_styles() {
        let dom = dom_with(
            vec![("body", bg("rgb(200, 16, 46)"))],
            vec![],
            vec![PageImage {
                src: "/logo.png".to_string(),
                ..Default::default()
            }],
        );
        let mut config = FaviconConfig::default();
        config.timeout_ms = 20;

        let hex = analyze(&dom, &NeverResolves, &config).await;
        assert_eq!(hex, "#c8102e");
    }
}
