//! Color space conversions and validity heuristics
//!
//! Everything here is a pure function over textual or numeric color
//! representations. Parse failures yield `None`, never an error: an
//! unreadable color simply drops out of the extraction pipeline.

use regex::Regex;
use std::sync::OnceLock;

/// Channels above this on all three axes count as near-white.
const NEAR_WHITE_FLOOR: u8 = 240;
/// Channels below this on all three axes count as near-black.
const NEAR_BLACK_CEILING: u8 = 30;

fn rgb_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"rgba?\((\d+),\s*(\d+),\s*(\d+)").unwrap())
}

fn hsl_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"hsla?\((\d+),\s*(\d+)%,\s*(\d+)%").unwrap())
}

/// Format an RGB triple as a lowercase `#rrggbb` string.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Parse a `#rrggbb` string back into its channels.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let rest = hex.strip_prefix('#')?;
    if rest.len() != 6 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&rest[0..2], 16).ok()?;
    let g = u8::from_str_radix(&rest[2..4], 16).ok()?;
    let b = u8::from_str_radix(&rest[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Convert HSL to hex. `h` in degrees, `s` and `l` in `[0, 1]`.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let r = (hue_to_rgb(p, q, h / 360.0 + 1.0 / 3.0) * 255.0).round() as u8;
    let g = (hue_to_rgb(p, q, h / 360.0) * 255.0).round() as u8;
    let b = (hue_to_rgb(p, q, h / 360.0 - 1.0 / 3.0) * 255.0).round() as u8;

    rgb_to_hex(r, g, b)
}

/// Normalize a textual color into `#rrggbb`.
///
/// Accepts hex, `rgb()`/`rgba()` and `hsl()`/`hsla()` forms. Any other
/// form (keywords, `transparent`, malformed input) yields `None`.
pub fn parse_color_string(color: &str) -> Option<String> {
    let color = color.trim();
    if color.is_empty() {
        return None;
    }

    if let Some(rest) = color.strip_prefix('#') {
        if rest.len() == 6 && rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(color.to_ascii_lowercase());
        }
        return None;
    }

    if let Some(caps) = rgb_pattern().captures(color) {
        let r: u16 = caps[1].parse().ok()?;
        let g: u16 = caps[2].parse().ok()?;
        let b: u16 = caps[3].parse().ok()?;
        if r > 255 || g > 255 || b > 255 {
            return None;
        }
        return Some(rgb_to_hex(r as u8, g as u8, b as u8));
    }

    if let Some(caps) = hsl_pattern().captures(color) {
        let h: f64 = caps[1].parse().ok()?;
        let s: f64 = caps[2].parse::<f64>().ok()? / 100.0;
        let l: f64 = caps[3].parse::<f64>().ok()? / 100.0;
        return Some(hsl_to_hex(h, s, l));
    }

    None
}

/// Whether all three channels sit above the near-white floor.
pub fn is_near_white(hex: &str) -> bool {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => r > NEAR_WHITE_FLOOR && g > NEAR_WHITE_FLOOR && b > NEAR_WHITE_FLOOR,
        None => false,
    }
}

/// Whether all three channels sit below the near-black ceiling.
pub fn is_near_black(hex: &str) -> bool {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => r < NEAR_BLACK_CEILING && g < NEAR_BLACK_CEILING && b < NEAR_BLACK_CEILING,
        None => false,
    }
}

/// A color is usable as an icon background when it is well-formed and
/// neither washes out to white nor disappears into black.
pub fn is_valid(hex: &str) -> bool {
    hex.len() == 7 && hex_to_rgb(hex).is_some() && !is_near_white(hex) && !is_near_black(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_round_trip() {
        for hex in ["#2563eb", "#000000", "#ffffff", "#a1b2c3"] {
            let (r, g, b) = hex_to_rgb(hex).unwrap();
            assert_eq!(rgb_to_hex(r, g, b), hex);
        }
    }

    #[test]
    fn test_hex_to_rgb_rejects_malformed() {
        assert_eq!(hex_to_rgb("2563eb"), None);
        assert_eq!(hex_to_rgb("#25g3eb"), None);
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb(""), None);
    }

    #[test]
    fn test_parse_color_string_forms() {
        assert_eq!(parse_color_string("#2563EB"), Some("#2563eb".to_string()));
        assert_eq!(
            parse_color_string("rgb(37, 99, 235)"),
            Some("#2563eb".to_string())
        );
        assert_eq!(
            parse_color_string("rgba(37, 99, 235, 0.5)"),
            Some("#2563eb".to_string())
        );
        assert_eq!(
            parse_color_string("hsl(0, 100%, 50%)"),
            Some("#ff0000".to_string())
        );
        assert_eq!(parse_color_string("transparent"), None);
        assert_eq!(parse_color_string("currentColor"), None);
        assert_eq!(parse_color_string(""), None);
        assert_eq!(parse_color_string("#ffff"), None);
    }

    #[test]
    fn test_hsl_to_hex_known_values() {
        assert_eq!(hsl_to_hex(0.0, 0.0, 0.0), "#000000");
        assert_eq!(hsl_to_hex(0.0, 0.0, 1.0), "#ffffff");
        assert_eq!(hsl_to_hex(120.0, 1.0, 0.5), "#00ff00");
        assert_eq!(hsl_to_hex(240.0, 1.0, 0.5), "#0000ff");
    }

    #[test]
    fn test_validity_heuristics() {
        assert!(!is_valid("#ffffff"));
        assert!(!is_valid("#fafafa"));
        assert!(!is_valid("#050505"));
        assert!(!is_valid("#1d1d1d"));
        assert!(is_valid("#2563eb"));
        assert!(is_valid("#f0f0f0"));
        assert!(is_valid("#1e1e1e"));
        assert!(!is_valid("not-a-color"));
        assert!(!is_valid("#fff"));
    }

    #[test]
    fn test_near_white_requires_all_channels() {
        assert!(is_near_white("#fdfdfd"));
        assert!(!is_near_white("#fdfd00"));
        assert!(is_near_black("#101010"));
        assert!(!is_near_black("#101080"));
    }
}
