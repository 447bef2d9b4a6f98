use thiserror::Error;

use crate::color::Color;

/// Every command starts with this byte.
pub const SIG_COMMAND: u8 = 0xfe;

pub const CMD_CLEAR: u8 = 0x58;
pub const CMD_BACKLIGHT_ON: u8 = 0x42;
pub const CMD_BACKLIGHT_OFF: u8 = 0x46;
pub const CMD_SIZE: u8 = 0xd1;
pub const CMD_SPLASH_TEXT: u8 = 0x40;
pub const CMD_BRIGHTNESS: u8 = 0x98;
pub const CMD_CONTRAST: u8 = 0x91;
pub const CMD_COLOR: u8 = 0xd0;
pub const CMD_AUTOSCROLL_ON: u8 = 0x51;
pub const CMD_AUTOSCROLL_OFF: u8 = 0x52;
pub const CMD_UNDERLINE_CURSOR_ON: u8 = 0x4a;
pub const CMD_UNDERLINE_CURSOR_OFF: u8 = 0x4b;
pub const CMD_BLOCK_CURSOR_ON: u8 = 0x53;
pub const CMD_BLOCK_CURSOR_OFF: u8 = 0x54;
pub const CMD_CURSOR_HOME: u8 = 0x48;
pub const CMD_CURSOR_POS: u8 = 0x47;
pub const CMD_CURSOR_FWD: u8 = 0x4d;
pub const CMD_CURSOR_BACK: u8 = 0x4c;
pub const CMD_CREATE_CHAR: u8 = 0x4e;
pub const CMD_SAVE_CUSTOM_CHAR: u8 = 0xc1;
pub const CMD_LOAD_CHAR_BANK: u8 = 0xc0;

/// Number of programmable character slots on the controller.
pub const CUSTOM_CHAR_SLOTS: u8 = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("custom character slot must be in [0, 7], but was {0}")]
    SlotOutOfRange(u8),
    #[error("unknown command code {0:#04x}")]
    UnknownCommand(u8),
}

/// A 5x8 bitmap bound to one of the custom character slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomChar {
    slot: u8,
    rows: [u8; 8],
}

impl CustomChar {
    pub const SIZE: usize = 9; // slot + 8 rows

    /// Rows keep only their low 5 bits; bit 4 is the leftmost pixel.
    pub fn new(slot: u8, rows: [u8; 8]) -> Result<Self, ProtocolError> {
        if slot >= CUSTOM_CHAR_SLOTS {
            return Err(ProtocolError::SlotOutOfRange(slot));
        }
        Ok(Self {
            slot,
            rows: rows.map(|r| r & 0x1f),
        })
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn rows(&self) -> &[u8; 8] {
        &self.rows
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.slot;
        buf[1..].copy_from_slice(&self.rows);
        buf
    }

    pub fn from_bytes(b: &[u8; Self::SIZE]) -> Result<Self, ProtocolError> {
        let mut rows = [0u8; 8];
        rows.copy_from_slice(&b[1..]);
        Self::new(b[0], rows)
    }
}

/// One controller command. Variants map one-to-one onto command codes.
///
/// Cursor positions are zero-based here; the wire format is one-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Clear,
    BacklightOn,
    BacklightOff,
    Size { width: u8, height: u8 },
    /// Raw splash bytes; the controller expects exactly width * height of them.
    SplashText(Vec<u8>),
    Brightness(u8),
    Contrast(u8),
    Color(Color),
    AutoscrollOn,
    AutoscrollOff,
    UnderlineCursorOn,
    UnderlineCursorOff,
    BlockCursorOn,
    BlockCursorOff,
    CursorHome,
    CursorPos { x: u8, y: u8 },
    CursorForward,
    CursorBack,
    CreateChar(CustomChar),
    SaveCustomChar { bank: u8, character: CustomChar },
    LoadCharBank(u8),
}

impl Command {
    /// Splash screen text padded with spaces (or truncated) to fill the display.
    pub fn splash(text: &str, width: u8, height: u8) -> Self {
        let len = width as usize * height as usize;
        let mut bytes = Vec::with_capacity(len);
        encode_text(text, &mut bytes);
        bytes.resize(len, b' ');
        Command::SplashText(bytes)
    }

    pub fn code(&self) -> u8 {
        match self {
            Command::Clear => CMD_CLEAR,
            Command::BacklightOn => CMD_BACKLIGHT_ON,
            Command::BacklightOff => CMD_BACKLIGHT_OFF,
            Command::Size { .. } => CMD_SIZE,
            Command::SplashText(_) => CMD_SPLASH_TEXT,
            Command::Brightness(_) => CMD_BRIGHTNESS,
            Command::Contrast(_) => CMD_CONTRAST,
            Command::Color(_) => CMD_COLOR,
            Command::AutoscrollOn => CMD_AUTOSCROLL_ON,
            Command::AutoscrollOff => CMD_AUTOSCROLL_OFF,
            Command::UnderlineCursorOn => CMD_UNDERLINE_CURSOR_ON,
            Command::UnderlineCursorOff => CMD_UNDERLINE_CURSOR_OFF,
            Command::BlockCursorOn => CMD_BLOCK_CURSOR_ON,
            Command::BlockCursorOff => CMD_BLOCK_CURSOR_OFF,
            Command::CursorHome => CMD_CURSOR_HOME,
            Command::CursorPos { .. } => CMD_CURSOR_POS,
            Command::CursorForward => CMD_CURSOR_FWD,
            Command::CursorBack => CMD_CURSOR_BACK,
            Command::CreateChar(_) => CMD_CREATE_CHAR,
            Command::SaveCustomChar { .. } => CMD_SAVE_CUSTOM_CHAR,
            Command::LoadCharBank(_) => CMD_LOAD_CHAR_BANK,
        }
    }

    /// Append the wire bytes of this command to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(SIG_COMMAND);
        buf.push(self.code());
        match self {
            Command::Size { width, height } => buf.extend_from_slice(&[*width, *height]),
            Command::SplashText(text) => buf.extend_from_slice(text),
            Command::Brightness(v) | Command::Contrast(v) | Command::LoadCharBank(v) => {
                buf.push(*v)
            }
            Command::Color(c) => buf.extend_from_slice(&c.to_bytes()),
            Command::CursorPos { x, y } => {
                buf.push(x.saturating_add(1));
                buf.push(y.saturating_add(1));
            }
            Command::CreateChar(c) => buf.extend_from_slice(&c.to_bytes()),
            Command::SaveCustomChar { bank, character } => {
                buf.push(*bank);
                buf.extend_from_slice(&character.to_bytes());
            }
            _ => {}
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2);
        self.encode(&mut buf);
        buf
    }
}

/// Cursor display mode. Setting one mode switches the others off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorMode {
    #[default]
    Off,
    Underline,
    Block,
}

impl CursorMode {
    pub fn commands(self) -> [Command; 2] {
        match self {
            CursorMode::Off => [Command::UnderlineCursorOff, Command::BlockCursorOff],
            CursorMode::Underline => [Command::BlockCursorOff, Command::UnderlineCursorOn],
            CursorMode::Block => [Command::UnderlineCursorOff, Command::BlockCursorOn],
        }
    }
}

/// Append display text to `buf`, one byte per character.
///
/// Characters outside 0x00-0xFF, and the command signal byte itself, become
/// `?` so text can never be mistaken for a command.
pub fn encode_text(text: &str, buf: &mut Vec<u8>) {
    buf.extend(text.chars().map(|c| match u8::try_from(c) {
        Ok(SIG_COMMAND) | Err(_) => b'?',
        Ok(b) => b,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_commands() {
        assert_eq!(Command::Clear.to_bytes(), [0xfe, 0x58]);
        assert_eq!(Command::BacklightOff.to_bytes(), [0xfe, 0x46]);
        assert_eq!(Command::CursorHome.to_bytes(), [0xfe, 0x48]);
        assert_eq!(Command::Brightness(200).to_bytes(), [0xfe, 0x98, 200]);
        assert_eq!(Command::Contrast(0).to_bytes(), [0xfe, 0x91, 0]);
        assert_eq!(Command::LoadCharBank(1).to_bytes(), [0xfe, 0xc0, 1]);
    }

    #[test]
    fn parameterised_commands() {
        assert_eq!(
            Command::Size { width: 20, height: 4 }.to_bytes(),
            [0xfe, 0xd1, 20, 4]
        );
        assert_eq!(
            Command::Color(Color::new(1, 2, 3)).to_bytes(),
            [0xfe, 0xd0, 1, 2, 3]
        );
        assert_eq!(
            Command::CursorPos { x: 0, y: 3 }.to_bytes(),
            [0xfe, 0x47, 1, 4]
        );
    }

    #[test]
    fn custom_characters() {
        let c = CustomChar::new(7, [0xff, 0x1f, 0, 0, 0, 0, 0, 0x10]).unwrap();
        assert_eq!(c.rows(), &[0x1f, 0x1f, 0, 0, 0, 0, 0, 0x10]);
        assert_eq!(
            Command::CreateChar(c).to_bytes(),
            [0xfe, 0x4e, 7, 0x1f, 0x1f, 0, 0, 0, 0, 0, 0x10]
        );
        assert_eq!(
            Command::SaveCustomChar { bank: 2, character: c }.to_bytes(),
            [0xfe, 0xc1, 2, 7, 0x1f, 0x1f, 0, 0, 0, 0, 0, 0x10]
        );
        assert_eq!(
            CustomChar::new(8, [0; 8]),
            Err(ProtocolError::SlotOutOfRange(8))
        );
    }

    #[test]
    fn cursor_modes_are_exclusive() {
        let bytes: Vec<u8> = CursorMode::Block
            .commands()
            .iter()
            .flat_map(Command::to_bytes)
            .collect();
        assert_eq!(bytes, [0xfe, 0x4b, 0xfe, 0x53]);
        assert_eq!(
            CursorMode::Off.commands(),
            [Command::UnderlineCursorOff, Command::BlockCursorOff]
        );
    }

    #[test]
    fn splash_fills_display() {
        let Command::SplashText(bytes) = Command::splash("hi", 4, 2) else {
            panic!("expected splash text");
        };
        assert_eq!(bytes, b"hi      ");
        let Command::SplashText(bytes) = Command::splash("too long", 2, 2) else {
            panic!("expected splash text");
        };
        assert_eq!(bytes, b"too ");
    }

    #[test]
    fn text_bytes() {
        let mut buf = Vec::new();
        encode_text("a\u{ff}\u{2}\u{fe}\u{263a}", &mut buf);
        assert_eq!(buf, [b'a', 0xff, 0x02, b'?', b'?']);
    }
}
