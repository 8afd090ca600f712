//! Icon rasterization
//!
//! Fills a square surface with the extracted background color, draws the
//! initials centered from the embedded glyph face, optionally lays a
//! soft shadow beneath them, and encodes the result as a PNG data URI.
//! Deterministic: identical inputs produce byte-identical artifacts.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::color;
use crate::config::FaviconConfig;
use crate::errors::RenderError;
use crate::models::IconArtifact;

mod glyphs;

use glyphs::{glyph, row_bit, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Shadow opacity, matching a 30% black canvas shadow.
const SHADOW_ALPHA: f32 = 0.3;
/// Shadow offset in pixels.
const SHADOW_OFFSET: u32 = 1;

/// Rasterize `initials` over `background_hex` into a PNG artifact of
/// side `config.size`.
pub fn render(
    initials: &str,
    background_hex: &str,
    config: &FaviconConfig,
) -> Result<IconArtifact, RenderError> {
    let (br, bg, bb) = color::hex_to_rgb(background_hex).ok_or_else(|| {
        RenderError::InvalidColor {
            color: background_hex.to_string(),
        }
    })?;
    let (tr, tg, tb) = color::hex_to_rgb(&config.text_color).unwrap_or((255, 255, 255));

    let size = config.size.max(1);
    let mut surface = RgbaImage::from_pixel(size, size, Rgba([br, bg, bb, 255]));

    let mask = text_mask(initials, size);

    if config.enable_shadow {
        let shadow = blur_mask(&mask, size);
        for (x, y, coverage) in shadow {
            let sx = x + SHADOW_OFFSET;
            let sy = y + SHADOW_OFFSET;
            if sx < size && sy < size {
                blend(&mut surface, sx, sy, (0, 0, 0), coverage * SHADOW_ALPHA);
            }
        }
    }

    for &(x, y) in &mask {
        blend(&mut surface, x, y, (tr, tg, tb), 1.0);
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(surface)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    debug!(
        "Rendered {}x{} icon for {:?} on {}",
        size, size, initials, background_hex
    );
    Ok(IconArtifact::from_png_bytes(&png, size))
}

/// Pixel positions covered by the centered initials.
///
/// The glyph face scales in whole-pixel steps: font size follows the
/// 0.65/0.5 sizing rule, then rounds down to a multiple of the 7-row
/// glyph height so strokes stay crisp at icon scale.
fn text_mask(initials: &str, size: u32) -> Vec<(u32, u32)> {
    let chars: Vec<char> = initials.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let ratio = if chars.len() == 1 { 0.65 } else { 0.5 };
    let font_size = (size as f64 * ratio).floor() as u32;
    let scale = (font_size / GLYPH_HEIGHT).max(1);

    let glyph_w = GLYPH_WIDTH * scale;
    let glyph_h = GLYPH_HEIGHT * scale;
    let spacing = scale;
    let total_w = glyph_w * chars.len() as u32 + spacing * (chars.len() as u32 - 1);

    let x0 = size.saturating_sub(total_w) / 2;
    let y0 = size.saturating_sub(glyph_h) / 2;

    let mut mask = Vec::new();
    for (index, c) in chars.iter().enumerate() {
        let bitmap = glyph(*c);
        let origin_x = x0 + index as u32 * (glyph_w + spacing);
        for (row_index, row) in bitmap.iter().enumerate() {
            for column in 0..GLYPH_WIDTH {
                if !row_bit(*row, column) {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = origin_x + column * scale + dx;
                        let y = y0 + row_index as u32 * scale + dy;
                        if x < size && y < size {
                            mask.push((x, y));
                        }
                    }
                }
            }
        }
    }
    mask
}

/// 3x3 box blur of a coverage mask, returning per-pixel coverage in
/// `[0, 1]`. Gives the shadow its soft edge.
fn blur_mask(mask: &[(u32, u32)], size: u32) -> Vec<(u32, u32, f32)> {
    let mut coverage = vec![0.0f32; (size * size) as usize];
    for &(x, y) in mask {
        coverage[(y * size + x) as usize] = 1.0;
    }

    let mut blurred = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let mut sum = 0.0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx >= 0 && ny >= 0 && (nx as u32) < size && (ny as u32) < size {
                        sum += coverage[(ny as u32 * size + nx as u32) as usize];
                    }
                }
            }
            let value = sum / 9.0;
            if value > 0.0 {
                blurred.push((x, y, value.min(1.0)));
            }
        }
    }
    blurred
}

/// Source-over blend of a solid color at `alpha` onto one pixel.
fn blend(surface: &mut RgbaImage, x: u32, y: u32, rgb: (u8, u8, u8), alpha: f32) {
    let pixel = surface.get_pixel_mut(x, y);
    let [dr, dg, db, da] = pixel.0;
    let mix = |src: u8, dst: u8| -> u8 {
        (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round() as u8
    };
    pixel.0 = [mix(rgb.0, dr), mix(rgb.1, dg), mix(rgb.2, db), da];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(artifact: &IconArtifact) -> RgbaImage {
        image::load_from_memory(&artifact.png_bytes())
            .expect("artifact is decodable PNG")
            .to_rgba8()
    }

    #[test]
    fn test_renders_configured_size() {
        let config = FaviconConfig::default();
        let artifact = render("AC", "#2563eb", &config).unwrap();
        let img = decode(&artifact);
        assert_eq!(img.dimensions(), (32, 32));
        assert_eq!(artifact.size(), 32);
        assert!(artifact.as_data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_background_fills_corners() {
        let mut config = FaviconConfig::default();
        config.enable_shadow = false;
        let artifact = render("A", "#2563eb", &config).unwrap();
        let img = decode(&artifact);
        assert_eq!(img.get_pixel(0, 0).0, [0x25, 0x63, 0xeb, 255]);
        assert_eq!(img.get_pixel(31, 31).0, [0x25, 0x63, 0xeb, 255]);
    }

    #[test]
    fn test_initials_leave_text_colored_pixels() {
        let mut config = FaviconConfig::default();
        config.enable_shadow = false;
        let artifact = render("W", "#2563eb", &config).unwrap();
        let img = decode(&artifact);
        let text_pixels = img
            .pixels()
            .filter(|p| p.0 == [255, 255, 255, 255])
            .count();
        assert!(text_pixels > 0, "no text pixels rendered");
    }

    #[test]
    fn test_deterministic_output() {
        let config = FaviconConfig::default();
        let a = render("AC", "#2563eb", &config).unwrap();
        let b = render("AC", "#2563eb", &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shadow_changes_output() {
        let mut with_shadow = FaviconConfig::default();
        with_shadow.enable_shadow = true;
        let mut without = FaviconConfig::default();
        without.enable_shadow = false;
        assert_ne!(
            render("A", "#2563eb", &with_shadow).unwrap(),
            render("A", "#2563eb", &without).unwrap()
        );
    }

    #[test]
    fn test_invalid_background_rejected() {
        let config = FaviconConfig::default();
        let err = render("A", "bogus", &config).unwrap_err();
        assert!(matches!(err, RenderError::InvalidColor { .. }));
    }

    #[test]
    fn test_single_glyph_larger_than_pair() {
        let single = text_mask("I", 64);
        let pair = text_mask("II", 64);
        let height = |mask: &[(u32, u32)]| {
            let ys: Vec<u32> = mask.iter().map(|&(_, y)| y).collect();
            ys.iter().max().unwrap() - ys.iter().min().unwrap()
        };
        assert!(height(&single) > height(&pair));
    }
}
