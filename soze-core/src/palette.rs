//! The xterm 256-colour palette, used to pick the closest terminal colour for
//! an RGB value.

/// The 16 system colours, in index order.
const SYSTEM: [u32; 16] = [
    0x000000, 0x800000, 0x008000, 0x808000, 0x000080, 0x800080, 0x008080, 0xc0c0c0, // normal
    0x808080, 0xff0000, 0x00ff00, 0xffff00, 0x0000ff, 0xff00ff, 0x00ffff, 0xffffff, // bright
];

/// Channel levels of the 6x6x6 colour cube (indices 16..=231).
const CUBE_LEVELS: [u32; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

/// Packed `0xRRGGBB` value of every palette index.
///
/// Some values appear twice (black at 0 and 16, white at 15 and 231, and a few
/// others). Lookups resolve a duplicated value to its later index.
pub static PALETTE: [u32; 256] = build();

const fn build() -> [u32; 256] {
    let mut table = [0u32; 256];

    let mut i = 0;
    while i < 16 {
        table[i] = SYSTEM[i];
        i += 1;
    }

    let mut i = 0;
    while i < 216 {
        let r = CUBE_LEVELS[i / 36];
        let g = CUBE_LEVELS[(i / 6) % 6];
        let b = CUBE_LEVELS[i % 6];
        table[16 + i] = (r << 16) | (g << 8) | b;
        i += 1;
    }

    // Grayscale ramp: 0x08, 0x12, ... 0xee
    let mut i = 0;
    while i < 24 {
        let v = 8 + 10 * i as u32;
        table[232 + i] = (v << 16) | (v << 8) | v;
        i += 1;
    }

    table
}

/// Find the palette index whose packed value is numerically closest to
/// `packed`.
///
/// This compares the packed integers directly, so it is not a perceptual
/// distance. Ties go to the entry scanned first.
pub fn nearest_index(packed: u32) -> u8 {
    let mut best = 0usize;
    let mut best_dist = u32::MAX;
    for (i, &entry) in PALETTE.iter().enumerate() {
        let dist = entry.abs_diff(packed);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }

    let value = PALETTE[best];
    PALETTE.iter().rposition(|&e| e == value).unwrap_or(best) as u8
}
