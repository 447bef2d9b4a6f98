//! Virtual character LCD controller.
//!
//! Holds the state a real controller would after executing the decoded byte
//! stream: display memory, cursor, custom character RAM and the settings
//! that only affect presentation.

use std::collections::BTreeMap;

use soze_core::color::WHITE;
use soze_core::protocol::{Command, CUSTOM_CHAR_SLOTS};
use soze_core::{Color, Event};

pub type CharRam = [Option<[u8; 8]>; CUSTOM_CHAR_SLOTS as usize];

pub struct Screen {
    width: u8,
    height: u8,
    cells: Vec<u8>,
    cursor: (u8, u8),
    chars: CharRam,
    banks: BTreeMap<u8, CharRam>,
    splash: Vec<u8>,
    pub color: Color,
    pub backlight: bool,
    pub brightness: Option<u8>,
    pub contrast: Option<u8>,
    pub autoscroll: bool,
    pub underline_cursor: bool,
    pub block_cursor: bool,
}

impl Screen {
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![b' '; width as usize * height as usize],
            cursor: (0, 0),
            chars: [None; CUSTOM_CHAR_SLOTS as usize],
            banks: BTreeMap::new(),
            splash: Vec::new(),
            color: WHITE,
            backlight: true,
            brightness: None,
            contrast: None,
            autoscroll: false,
            underline_cursor: false,
            block_cursor: false,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn cursor(&self) -> (u8, u8) {
        self.cursor
    }

    pub fn custom_char(&self, slot: u8) -> Option<&[u8; 8]> {
        self.chars.get(slot as usize)?.as_ref()
    }

    pub fn splash(&self) -> &[u8] {
        &self.splash
    }

    /// Display memory of row `y`.
    pub fn row(&self, y: u8) -> &[u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.cells[start..start + w]
    }

    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Text(bytes) => {
                for &b in bytes {
                    self.put(b);
                }
            }
            Event::Command(cmd) => self.execute(cmd),
        }
    }

    fn execute(&mut self, cmd: &Command) {
        match cmd {
            Command::Clear => {
                self.cells.fill(b' ');
                self.cursor = (0, 0);
            }
            Command::BacklightOn => self.backlight = true,
            Command::BacklightOff => self.backlight = false,
            Command::Size { width, height } => self.resize(*width, *height),
            Command::SplashText(text) => self.splash = text.clone(),
            Command::Brightness(v) => self.brightness = Some(*v),
            Command::Contrast(v) => self.contrast = Some(*v),
            Command::Color(color) => self.color = *color,
            Command::AutoscrollOn => self.autoscroll = true,
            Command::AutoscrollOff => self.autoscroll = false,
            Command::UnderlineCursorOn => self.underline_cursor = true,
            Command::UnderlineCursorOff => self.underline_cursor = false,
            Command::BlockCursorOn => self.block_cursor = true,
            Command::BlockCursorOff => self.block_cursor = false,
            Command::CursorHome => self.cursor = (0, 0),
            Command::CursorPos { x, y } => {
                self.cursor = (
                    (*x).min(self.width.saturating_sub(1)),
                    (*y).min(self.height.saturating_sub(1)),
                );
            }
            Command::CursorForward => self.advance(),
            Command::CursorBack => self.retreat(),
            Command::CreateChar(c) => self.chars[c.slot() as usize] = Some(*c.rows()),
            Command::SaveCustomChar { bank, character } => {
                let bank = self
                    .banks
                    .entry(*bank)
                    .or_insert([None; CUSTOM_CHAR_SLOTS as usize]);
                bank[character.slot() as usize] = Some(*character.rows());
            }
            Command::LoadCharBank(bank) => {
                // An empty bank leaves the RAM as it is
                if let Some(chars) = self.banks.get(bank) {
                    self.chars = *chars;
                }
            }
        }
    }

    fn resize(&mut self, width: u8, height: u8) {
        self.width = width;
        self.height = height;
        self.cells = vec![b' '; width as usize * height as usize];
        self.cursor = (0, 0);
    }

    fn put(&mut self, b: u8) {
        if self.cells.is_empty() {
            return;
        }
        let (x, y) = self.cursor;
        self.cells[y as usize * self.width as usize + x as usize] = b;
        self.advance();
    }

    // Past the last column the cursor moves to the next row. Past the last
    // row it either scrolls the display or wraps to the top.
    fn advance(&mut self) {
        if self.cells.is_empty() {
            return;
        }
        let (mut x, mut y) = self.cursor;
        x += 1;
        if x >= self.width {
            x = 0;
            y += 1;
            if y >= self.height {
                if self.autoscroll {
                    self.scroll();
                    y = self.height - 1;
                } else {
                    y = 0;
                }
            }
        }
        self.cursor = (x, y);
    }

    fn retreat(&mut self) {
        if self.cells.is_empty() {
            return;
        }
        let (x, y) = self.cursor;
        self.cursor = match (x, y) {
            (0, 0) => (self.width - 1, self.height - 1),
            (0, y) => (self.width - 1, y - 1),
            (x, y) => (x - 1, y),
        };
    }

    fn scroll(&mut self) {
        let w = self.width as usize;
        self.cells.copy_within(w.., 0);
        let len = self.cells.len();
        self.cells[len - w..].fill(b' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soze_core::glyph::CUSTOM_TILES;
    use soze_core::protocol::CustomChar;
    use soze_core::Decoder;

    fn text(screen: &Screen) -> Vec<String> {
        (0..screen.height())
            .map(|y| String::from_utf8_lossy(screen.row(y)).into_owned())
            .collect()
    }

    fn feed(screen: &mut Screen, bytes: &[u8]) {
        let mut decoder = Decoder::new(screen.width(), screen.height());
        decoder.push(bytes);
        while let Some(event) = decoder.next_event() {
            screen.apply(&event.unwrap());
        }
    }

    fn bytes(commands: &[Command]) -> Vec<u8> {
        let mut buf = Vec::new();
        for cmd in commands {
            cmd.encode(&mut buf);
        }
        buf
    }

    #[test]
    fn text_at_cursor() {
        let mut screen = Screen::new(6, 2);
        let mut wire = bytes(&[Command::CursorPos { x: 2, y: 1 }]);
        wire.extend_from_slice(b"ab");
        feed(&mut screen, &wire);
        assert_eq!(text(&screen), ["      ", "  ab  "]);
        assert_eq!(screen.cursor(), (4, 1));
    }

    #[test]
    fn text_wraps_to_next_row_then_top() {
        let mut screen = Screen::new(3, 2);
        feed(&mut screen, b"abcdefg");
        assert_eq!(text(&screen), ["gbc", "def"]);
        assert_eq!(screen.cursor(), (1, 0));
    }

    #[test]
    fn autoscroll_shifts_rows_up() {
        let mut screen = Screen::new(3, 2);
        let mut wire = bytes(&[Command::AutoscrollOn]);
        wire.extend_from_slice(b"abcdefg");
        feed(&mut screen, &wire);
        assert_eq!(text(&screen), ["def", "g  "]);
        assert_eq!(screen.cursor(), (1, 1));
    }

    #[test]
    fn clear_and_home() {
        let mut screen = Screen::new(4, 1);
        feed(&mut screen, b"abcd");
        feed(&mut screen, &bytes(&[Command::CursorHome]));
        feed(&mut screen, b"x");
        assert_eq!(text(&screen), ["xbcd"]);
        feed(&mut screen, &bytes(&[Command::Clear]));
        assert_eq!(text(&screen), ["    "]);
        assert_eq!(screen.cursor(), (0, 0));
    }

    #[test]
    fn cursor_moves_wrap() {
        let mut screen = Screen::new(2, 2);
        feed(&mut screen, &bytes(&[Command::CursorBack]));
        assert_eq!(screen.cursor(), (1, 1));
        feed(&mut screen, &bytes(&[Command::CursorForward]));
        assert_eq!(screen.cursor(), (0, 0));
        feed(&mut screen, &bytes(&[Command::CursorPos { x: 9, y: 9 }]));
        assert_eq!(screen.cursor(), (1, 1));
    }

    #[test]
    fn size_resets_memory() {
        let mut screen = Screen::new(2, 1);
        feed(&mut screen, b"ab");
        feed(&mut screen, &bytes(&[Command::Size { width: 3, height: 2 }]));
        assert_eq!(text(&screen), ["   ", "   "]);
    }

    #[test]
    fn custom_chars_and_banks() {
        let mut screen = Screen::new(20, 4);
        let tile = CustomChar::new(2, CUSTOM_TILES[2]).unwrap();
        let other = CustomChar::new(2, [0x1f; 8]).unwrap();
        feed(
            &mut screen,
            &bytes(&[
                Command::CreateChar(tile),
                Command::SaveCustomChar {
                    bank: 1,
                    character: other,
                },
            ]),
        );
        assert_eq!(screen.custom_char(2), Some(&CUSTOM_TILES[2]));
        assert_eq!(screen.custom_char(3), None);

        feed(&mut screen, &bytes(&[Command::LoadCharBank(1)]));
        assert_eq!(screen.custom_char(2), Some(&[0x1f; 8]));

        // Unknown bank leaves the RAM alone
        feed(&mut screen, &bytes(&[Command::LoadCharBank(7)]));
        assert_eq!(screen.custom_char(2), Some(&[0x1f; 8]));
    }

    #[test]
    fn presentation_settings() {
        let mut screen = Screen::new(20, 4);
        feed(
            &mut screen,
            &bytes(&[
                Command::Color(Color::new(1, 2, 3)),
                Command::BacklightOff,
                Command::Brightness(200),
                Command::Contrast(180),
                Command::BlockCursorOn,
                Command::splash("hello", 20, 4),
            ]),
        );
        assert_eq!(screen.color, Color::new(1, 2, 3));
        assert!(!screen.backlight);
        assert_eq!(screen.brightness, Some(200));
        assert_eq!(screen.contrast, Some(180));
        assert!(screen.block_cursor);
        assert!(!screen.underline_cursor);
        assert_eq!(screen.splash().len(), 80);
        assert!(screen.splash().starts_with(b"hello"));
    }
}
