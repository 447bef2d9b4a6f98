use log::debug;

use soze_core::Color;

use crate::transport::{SerialTransport, WriteOutcome};

/// RGB LED strip fed with raw `[r, g, b]` triples.
pub struct Led {
    transport: SerialTransport,
    last: Option<Color>,
}

impl Led {
    pub fn new(transport: SerialTransport) -> Self {
        Self {
            transport,
            last: None,
        }
    }

    pub fn open(&mut self) -> anyhow::Result<()> {
        self.transport.open()?;
        self.last = None;
        Ok(())
    }

    pub fn close(&mut self) {
        self.transport.close();
    }

    /// Send `color` if it differs from the last color sent.
    pub fn set_color(&mut self, color: Color) -> Option<WriteOutcome> {
        if self.last == Some(color) {
            return None;
        }
        debug!("{}: color {}", self.transport.name(), color.to_hex_string());
        self.last = Some(color);
        Some(self.transport.write(&color.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SharedBuf;
    use crate::transport::SerialConfig;

    #[test]
    fn writes_only_on_change() {
        let buf = SharedBuf::default();
        let mut transport = SerialTransport::new("led", SerialConfig::default());
        transport.attach(buf.clone());
        let mut led = Led::new(transport);

        assert_eq!(led.set_color(Color::new(1, 2, 3)), Some(WriteOutcome::Complete));
        assert_eq!(led.set_color(Color::new(1, 2, 3)), None);
        assert_eq!(led.set_color(Color::new(4, 5, 6)), Some(WriteOutcome::Complete));
        assert_eq!(buf.contents(), [1, 2, 3, 4, 5, 6]);
    }
}
