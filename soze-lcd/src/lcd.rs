use log::{debug, info, warn};

use soze_core::diff::diff_frames;
use soze_core::glyph::CUSTOM_TILES;
use soze_core::protocol::{encode_text, Command, CursorMode, CustomChar, CUSTOM_CHAR_SLOTS};
use soze_core::Color;

use crate::transport::{SerialTransport, WriteOutcome};

pub const DEFAULT_WIDTH: u8 = 20;
pub const DEFAULT_HEIGHT: u8 = 4;

/// Character LCD behind a serial transport.
///
/// Remembers what it last sent (text, color, custom characters) so each
/// update only transmits what changed.
pub struct Lcd {
    transport: SerialTransport,
    width: u8,
    height: u8,
    sent: Vec<String>,
    needs_clear: bool,
    color: Option<Color>,
    slots: [Option<[u8; 8]>; CUSTOM_CHAR_SLOTS as usize],
    buf: Vec<u8>,
}

impl Lcd {
    pub fn new(transport: SerialTransport, width: u8, height: u8) -> Self {
        Self {
            transport,
            width,
            height,
            sent: Vec::new(),
            needs_clear: true,
            color: None,
            slots: [None; CUSTOM_CHAR_SLOTS as usize],
            buf: Vec::with_capacity(width as usize * height as usize * 2),
        }
    }

    /// Open the device and bring the controller to a known state: size set,
    /// screen cleared, autoscroll and cursor off, big-text tiles loaded.
    pub fn open(&mut self) -> anyhow::Result<()> {
        self.transport.open()?;
        self.start()
    }

    /// Like [`open`](Lcd::open), for a transport that is already connected.
    pub fn start(&mut self) -> anyhow::Result<()> {
        // Controller state is unknown after (re)connecting
        self.sent.clear();
        self.needs_clear = true;
        self.color = None;
        self.slots = [None; CUSTOM_CHAR_SLOTS as usize];

        self.buf.clear();
        Command::Size {
            width: self.width,
            height: self.height,
        }
        .encode(&mut self.buf);
        Command::AutoscrollOff.encode(&mut self.buf);
        for cmd in CursorMode::Off.commands() {
            cmd.encode(&mut self.buf);
        }
        for (slot, rows) in CUSTOM_TILES.iter().enumerate() {
            self.queue_custom_char(CustomChar::new(slot as u8, *rows)?);
        }

        info!(
            "lcd: initialising {}x{} display ({} bytes)",
            self.width,
            self.height,
            self.buf.len()
        );
        self.flush();
        Ok(())
    }

    pub fn close(&mut self) {
        self.transport.close();
    }

    /// Send `commands` as-is.
    pub fn send(&mut self, commands: &[Command]) -> WriteOutcome {
        self.buf.clear();
        for cmd in commands {
            cmd.encode(&mut self.buf);
        }
        self.flush()
    }

    /// Bring the display to `color` and `lines`, sending only the difference
    /// from the previous update.
    ///
    /// The baseline moves to `lines` whatever the outcome, so a short write
    /// is not retransmitted on the next call. After a failed write the
    /// controller state is unknown and the next call clears and redraws.
    pub fn update(&mut self, color: Color, lines: &[String]) -> WriteOutcome {
        self.buf.clear();

        if self.color != Some(color) {
            Command::Color(color).encode(&mut self.buf);
            self.color = Some(color);
        }

        if self.needs_clear {
            Command::Clear.encode(&mut self.buf);
            self.sent.clear();
            self.needs_clear = false;
        }

        let frame = self.clip(lines);
        let diff = diff_frames(&self.sent[..], &frame[..]);
        for (&(x, y), text) in &diff {
            Command::CursorPos {
                x: x as u8,
                y: y as u8,
            }
            .encode(&mut self.buf);
            encode_text(text, &mut self.buf);
        }
        if !diff.is_empty() {
            debug!("lcd: {} changed runs", diff.len());
        }

        let outcome = self.flush();
        self.sent = frame;
        if matches!(outcome, WriteOutcome::Failed(_) | WriteOutcome::NotOpen) {
            self.invalidate();
        }
        outcome
    }

    /// Forget what is on screen; the next update resends the color, clears
    /// and redraws.
    fn invalidate(&mut self) {
        self.needs_clear = true;
        self.color = None;
    }

    fn queue_custom_char(&mut self, character: CustomChar) -> bool {
        let slot = &mut self.slots[character.slot() as usize];
        if *slot == Some(*character.rows()) {
            return false;
        }
        *slot = Some(*character.rows());
        Command::CreateChar(character).encode(&mut self.buf);
        true
    }

    fn clip(&self, lines: &[String]) -> Vec<String> {
        if lines.len() > self.height as usize {
            warn!("lcd: dropping {} lines past the bottom", lines.len() - self.height as usize);
        }
        lines
            .iter()
            .take(self.height as usize)
            .map(|line| line.chars().take(self.width as usize).collect())
            .collect()
    }

    fn flush(&mut self) -> WriteOutcome {
        if self.buf.is_empty() {
            return WriteOutcome::Complete;
        }
        self.transport.write(&self.buf)
    }
}
