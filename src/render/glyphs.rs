//! Embedded 5x7 pixel glyph face
//!
//! Initials are always uppercase alphanumeric, so the face only carries
//! `A`-`Z` and `0`-`9`. Each glyph is seven rows of five bits, bit 4
//! being the leftmost column.

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;

type Glyph = [u8; GLYPH_HEIGHT as usize];

const LETTERS: [Glyph; 26] = [
    // A
    [0x0e, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11],
    // B
    [0x1e, 0x11, 0x11, 0x1e, 0x11, 0x11, 0x1e],
    // C
    [0x0e, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0e],
    // D
    [0x1e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1e],
    // E
    [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x1f],
    // F
    [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x10],
    // G
    [0x0e, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0f],
    // H
    [0x11, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11],
    // I
    [0x0e, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0e],
    // J
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0c],
    // K
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
    // L
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1f],
    // M
    [0x11, 0x1b, 0x15, 0x15, 0x11, 0x11, 0x11],
    // N
    [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
    // O
    [0x0e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e],
    // P
    [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10],
    // Q
    [0x0e, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0d],
    // R
    [0x1e, 0x11, 0x11, 0x1e, 0x14, 0x12, 0x11],
    // S
    [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e],
    // T
    [0x1f, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
    // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e],
    // V
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0a, 0x04],
    // W
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0a],
    // X
    [0x11, 0x11, 0x0a, 0x04, 0x0a, 0x11, 0x11],
    // Y
    [0x11, 0x11, 0x0a, 0x04, 0x04, 0x04, 0x04],
    // Z
    [0x1f, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1f],
];

const DIGITS: [Glyph; 10] = [
    // 0
    [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e],
    // 1
    [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e],
    // 2
    [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f],
    // 3
    [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e],
    // 4
    [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02],
    // 5
    [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e],
    // 6
    [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e],
    // 7
    [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
    // 8
    [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e],
    // 9
    [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c],
];

/// Bitmap for a single character. Anything outside the face maps to the
/// placeholder `W`.
pub fn glyph(c: char) -> &'static Glyph {
    match c {
        'A'..='Z' => &LETTERS[(c as usize) - ('A' as usize)],
        '0'..='9' => &DIGITS[(c as usize) - ('0' as usize)],
        _ => &LETTERS[('W' as usize) - ('A' as usize)],
    }
}

/// Whether a glyph row has the pixel at `column` set.
pub fn row_bit(row: u8, column: u32) -> bool {
    debug_assert!(column < GLYPH_WIDTH);
    row >> (GLYPH_WIDTH - 1 - column) & 1 == 1
}
