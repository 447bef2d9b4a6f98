use crate::color::Color;
use crate::protocol::*;

/// One item read back from a controller byte stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Command(Command),
    /// Characters to print at the cursor. Never contains the signal byte.
    Text(Vec<u8>),
}

/// Incremental parser for the controller protocol.
///
/// Bytes are fed in with [`Decoder::push`] as they arrive; commands split
/// across pushes are held back until complete.
pub struct Decoder {
    buf: Vec<u8>,
    width: u8,
    height: u8,
}

impl Decoder {
    /// The display size determines how many bytes a splash text command
    /// carries. It tracks later size commands.
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            buf: Vec::new(),
            width,
            height,
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes received but not yet decoded.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Decode the next complete event, if there is one.
    ///
    /// An unknown command code is reported once and both its bytes are
    /// dropped, so decoding picks up again at the following byte.
    pub fn next_event(&mut self) -> Option<Result<Event, ProtocolError>> {
        let first = *self.buf.first()?;
        if first != SIG_COMMAND {
            let end = self
                .buf
                .iter()
                .position(|&b| b == SIG_COMMAND)
                .unwrap_or(self.buf.len());
            let text: Vec<u8> = self.buf.drain(..end).collect();
            return Some(Ok(Event::Text(text)));
        }

        let code = *self.buf.get(1)?;
        let Some(param_len) = self.param_len(code) else {
            self.buf.drain(..2);
            return Some(Err(ProtocolError::UnknownCommand(code)));
        };
        if self.buf.len() < 2 + param_len {
            return None;
        }

        let frame: Vec<u8> = self.buf.drain(..2 + param_len).collect();
        let result = parse(code, &frame[2..]);
        if let Ok(Command::Size { width, height }) = result {
            self.width = width;
            self.height = height;
        }
        Some(result.map(Event::Command))
    }

    fn param_len(&self, code: u8) -> Option<usize> {
        let len = match code {
            CMD_CLEAR | CMD_BACKLIGHT_ON | CMD_BACKLIGHT_OFF | CMD_AUTOSCROLL_ON
            | CMD_AUTOSCROLL_OFF | CMD_UNDERLINE_CURSOR_ON | CMD_UNDERLINE_CURSOR_OFF
            | CMD_BLOCK_CURSOR_ON | CMD_BLOCK_CURSOR_OFF | CMD_CURSOR_HOME | CMD_CURSOR_FWD
            | CMD_CURSOR_BACK => 0,
            CMD_BRIGHTNESS | CMD_CONTRAST | CMD_LOAD_CHAR_BANK => 1,
            CMD_SIZE | CMD_CURSOR_POS => 2,
            CMD_COLOR => 3,
            CMD_CREATE_CHAR => CustomChar::SIZE,
            CMD_SAVE_CUSTOM_CHAR => 1 + CustomChar::SIZE,
            CMD_SPLASH_TEXT => self.width as usize * self.height as usize,
            _ => return None,
        };
        Some(len)
    }
}

fn parse(code: u8, p: &[u8]) -> Result<Command, ProtocolError> {
    let command = match code {
        CMD_CLEAR => Command::Clear,
        CMD_BACKLIGHT_ON => Command::BacklightOn,
        CMD_BACKLIGHT_OFF => Command::BacklightOff,
        CMD_AUTOSCROLL_ON => Command::AutoscrollOn,
        CMD_AUTOSCROLL_OFF => Command::AutoscrollOff,
        CMD_UNDERLINE_CURSOR_ON => Command::UnderlineCursorOn,
        CMD_UNDERLINE_CURSOR_OFF => Command::UnderlineCursorOff,
        CMD_BLOCK_CURSOR_ON => Command::BlockCursorOn,
        CMD_BLOCK_CURSOR_OFF => Command::BlockCursorOff,
        CMD_CURSOR_HOME => Command::CursorHome,
        CMD_CURSOR_FWD => Command::CursorForward,
        CMD_CURSOR_BACK => Command::CursorBack,
        CMD_BRIGHTNESS => Command::Brightness(p[0]),
        CMD_CONTRAST => Command::Contrast(p[0]),
        CMD_LOAD_CHAR_BANK => Command::LoadCharBank(p[0]),
        CMD_SIZE => Command::Size {
            width: p[0],
            height: p[1],
        },
        CMD_CURSOR_POS => Command::CursorPos {
            x: p[0].saturating_sub(1),
            y: p[1].saturating_sub(1),
        },
        CMD_COLOR => Command::Color(Color::new(p[0], p[1], p[2])),
        CMD_SPLASH_TEXT => Command::SplashText(p.to_vec()),
        CMD_CREATE_CHAR => Command::CreateChar(custom_char(p)?),
        CMD_SAVE_CUSTOM_CHAR => Command::SaveCustomChar {
            bank: p[0],
            character: custom_char(&p[1..])?,
        },
        other => return Err(ProtocolError::UnknownCommand(other)),
    };
    Ok(command)
}

fn custom_char(p: &[u8]) -> Result<CustomChar, ProtocolError> {
    let mut raw = [0u8; CustomChar::SIZE];
    raw.copy_from_slice(&p[..CustomChar::SIZE]);
    CustomChar::from_bytes(&raw)
}
