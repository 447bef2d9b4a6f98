//! Three-row "big text" built from a handful of block tiles.
//!
//! Five of the tiles live in the controller's custom character slots 0-4 and
//! must be programmed before use; the solid block (0xFF) and the space are
//! native to the controller.

use thiserror::Error;

/// Lower rounded corner opening to the right (slot 0).
pub const HALF_BOTTOM_RIGHT: char = '\u{00}';
/// Lower rounded corner opening to the left (slot 1).
pub const HALF_BOTTOM_LEFT: char = '\u{01}';
/// Lower half filled across the full width (slot 2).
pub const HALF_BOTTOM: char = '\u{02}';
/// Full block with the lower right corner rounded off (slot 3).
pub const FULL_BOTTOM_RIGHT: char = '\u{03}';
/// Full block with the lower left corner rounded off (slot 4).
pub const FULL_BOTTOM_LEFT: char = '\u{04}';
/// Solid block, native to the controller.
pub const FULL: char = '\u{ff}';
pub const EMPTY: char = ' ';

/// Bitmaps of the custom tiles, indexed by slot. Each row uses the low 5
/// bits, bit 4 being the leftmost pixel.
pub static CUSTOM_TILES: [[u8; 8]; 5] = [
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00011, 0b01111, 0b01111, 0b11111],
    [0b00000, 0b00000, 0b00000, 0b00000, 0b11000, 0b11110, 0b11110, 0b11111],
    [0b00000, 0b00000, 0b00000, 0b00000, 0b11111, 0b11111, 0b11111, 0b11111],
    [0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b01111, 0b01111, 0b00011],
    [0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11110, 0b11110, 0b11000],
];

/// One input line rendered as three display rows.
pub type BigLine = [String; 3];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlyphError {
    #[error("no big glyph for {0:?}")]
    Unsupported(char),
}

/// Rows of the big glyph for `c`, or `None` if there isn't one.
pub fn glyph(c: char) -> Option<[&'static [char]; 3]> {
    const HBR: char = HALF_BOTTOM_RIGHT;
    const HBL: char = HALF_BOTTOM_LEFT;
    const BOT: char = HALF_BOTTOM;
    const FBR: char = FULL_BOTTOM_RIGHT;
    const FBL: char = FULL_BOTTOM_LEFT;
    const FUL: char = FULL;
    const EMT: char = EMPTY;

    let rows: [&'static [char]; 3] = match c {
        '0' => [&[HBR, BOT, HBL], &[FUL, EMT, FUL], &[FBR, BOT, FBL]],
        '1' => [&[BOT, HBL, EMT], &[EMT, FUL, EMT], &[BOT, FUL, BOT]],
        '2' => [&[HBR, BOT, HBL], &[HBR, BOT, FBL], &[FBR, BOT, BOT]],
        '3' => [&[HBR, BOT, HBL], &[EMT, BOT, FUL], &[BOT, BOT, FBL]],
        '4' => [&[BOT, EMT, BOT], &[FBR, BOT, FUL], &[EMT, EMT, FUL]],
        '5' => [&[BOT, BOT, BOT], &[FUL, BOT, HBL], &[BOT, BOT, FBL]],
        '6' => [&[HBR, BOT, HBL], &[FUL, BOT, HBL], &[FBR, BOT, FBL]],
        '7' => [&[BOT, BOT, BOT], &[EMT, HBR, FBL], &[EMT, FUL, EMT]],
        '8' => [&[HBR, BOT, HBL], &[FUL, BOT, FUL], &[FBR, BOT, FBL]],
        '9' => [&[HBR, BOT, HBL], &[FBR, BOT, FUL], &[EMT, EMT, FUL]],
        ':' => [&[FUL], &[EMT], &[FUL]],
        ' ' => [&[EMT], &[EMT], &[EMT]],
        _ => return None,
    };
    Some(rows)
}

pub fn is_supported(text: &str) -> bool {
    text.lines().flat_map(str::chars).all(|c| glyph(c).is_some())
}

/// Render each line of `text` as big text.
///
/// A blank column separates every non-space character from whatever follows
/// it on the same line; spaces are not doubled and nothing trails the last
/// character.
pub fn render_big_text(text: &str) -> Result<Vec<BigLine>, GlyphError> {
    text.lines().map(render_big_line).collect()
}

fn render_big_line(line: &str) -> Result<BigLine, GlyphError> {
    let mut rows: BigLine = Default::default();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        let glyph = glyph(c).ok_or(GlyphError::Unsupported(c))?;
        for (row, tiles) in rows.iter_mut().zip(glyph) {
            row.extend(tiles);
        }
        if c != EMPTY && chars.peek().is_some() {
            for row in rows.iter_mut() {
                row.push(EMPTY);
            }
        }
    }

    Ok(rows)
}
