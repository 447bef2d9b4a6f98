use soze_core::protocol::CUSTOM_CHAR_SLOTS;

use crate::screen::Screen;

const FULL_BLOCK: char = '█';
const UNKNOWN: char = '?';

// Indexed by lit quadrants: top-left, top-right, bottom-left, bottom-right
// as bits 3..0.
const QUADRANTS: [char; 16] = [
    ' ', '▗', '▖', '▄', '▝', '▐', '▞', '▟', '▘', '▚', '▌', '▙', '▀', '▜', '▛', '█',
];

const LEFT_COLUMNS: u8 = 0b11100;
const RIGHT_COLUMNS: u8 = 0b00111;

// Dark text on the backlight; a dark backlight gets light text.
const INK_DARK: u8 = 16;
const INK_LIGHT: u8 = 250;
const PANEL_OFF: u8 = 234;

/// Approximate a 5x8 custom character with a quadrant block. A quadrant
/// counts as lit when at least half of its pixels are.
pub fn tile_glyph(rows: &[u8; 8]) -> char {
    let lit = |rows: &[u8], mask: u8| {
        let on: u32 = rows.iter().map(|r| (r & mask).count_ones()).sum();
        let total = rows.len() as u32 * mask.count_ones();
        on * 2 >= total
    };
    let (top, bottom) = rows.split_at(4);
    let index = (lit(top, LEFT_COLUMNS) as usize) << 3
        | (lit(top, RIGHT_COLUMNS) as usize) << 2
        | (lit(bottom, LEFT_COLUMNS) as usize) << 1
        | lit(bottom, RIGHT_COLUMNS) as usize;
    QUADRANTS[index]
}

/// Terminal character for one byte of display memory.
pub fn cell_glyph(screen: &Screen, b: u8) -> char {
    match b {
        b if b < CUSTOM_CHAR_SLOTS => screen.custom_char(b).map_or(UNKNOWN, tile_glyph),
        0xff => FULL_BLOCK,
        0x20..=0x7e => b as char,
        _ => UNKNOWN,
    }
}

/// Render the whole display with its top-left corner at `row`, `col`
/// (1-indexed), followed by a status line.
pub fn render_screen(screen: &Screen, row: u16, col: u16, status: &str, buf: &mut Vec<u8>) {
    buf.clear();

    let (panel, ink) = if screen.backlight {
        let panel = screen.color.to_terminal_index();
        let luma = 299 * screen.color.red() as u32
            + 587 * screen.color.green() as u32
            + 114 * screen.color.blue() as u32;
        (panel, if luma < 64_000 { INK_LIGHT } else { INK_DARK })
    } else {
        (PANEL_OFF, INK_LIGHT)
    };
    let show_cursor = screen.underline_cursor || screen.block_cursor;

    for y in 0..screen.height() {
        write_cursor_pos(buf, row + y as u16, col);
        write_bg(buf, panel);
        write_fg(buf, ink);
        for (x, &b) in screen.row(y).iter().enumerate() {
            let at_cursor = show_cursor && screen.cursor() == (x as u8, y);
            if at_cursor {
                buf.extend_from_slice(b"\x1b[7m");
            }
            let mut utf8 = [0u8; 4];
            buf.extend_from_slice(cell_glyph(screen, b).encode_utf8(&mut utf8).as_bytes());
            if at_cursor {
                buf.extend_from_slice(b"\x1b[27m");
            }
        }
        buf.extend_from_slice(b"\x1b[0m");
    }

    write_cursor_pos(buf, row + screen.height() as u16 + 1, col);
    buf.extend_from_slice(b"\x1b[2K");
    buf.extend_from_slice(status.as_bytes());
}

/// One-line summary of the settings that have no visible effect, plus the
/// connection state and the last decode error, if any.
pub fn status_line(screen: &Screen, connected: bool, error: Option<&str>) -> String {
    let mut status = format!(
        "{}x{}  color {}  backlight {}",
        screen.width(),
        screen.height(),
        screen.color.to_hex_string(),
        if screen.backlight { "on" } else { "off" }
    );
    if let Some(v) = screen.brightness {
        status.push_str(&format!("  brightness {v}"));
    }
    if let Some(v) = screen.contrast {
        status.push_str(&format!("  contrast {v}"));
    }
    if screen.autoscroll {
        status.push_str("  autoscroll");
    }
    if !screen.splash().is_empty() {
        status.push_str("  splash set");
    }
    if !connected {
        status.push_str("  [disconnected]");
    }
    if let Some(e) = error {
        status.push_str(&format!("  error: {e}"));
    }
    status
}

fn write_bg(buf: &mut Vec<u8>, index: u8) {
    buf.extend_from_slice(b"\x1b[48;5;");
    write_u8(buf, index);
    buf.push(b'm');
}

fn write_fg(buf: &mut Vec<u8>, index: u8) {
    buf.extend_from_slice(b"\x1b[38;5;");
    write_u8(buf, index);
    buf.push(b'm');
}

fn write_cursor_pos(buf: &mut Vec<u8>, row: u16, col: u16) {
    buf.extend_from_slice(b"\x1b[");
    write_u16(buf, row);
    buf.push(b';');
    write_u16(buf, col);
    buf.push(b'H');
}

fn write_u8(buf: &mut Vec<u8>, v: u8) {
    write_u16(buf, v as u16);
}

/// Integer to ASCII digits without allocating.
fn write_u16(buf: &mut Vec<u8>, v: u16) {
    let mut digits = [0u8; 5];
    let mut n = v;
    let mut i = digits.len();
    loop {
        i -= 1;
        digits[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[i..]);
}
