use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use log::{debug, error, info};
use serialport::{DataBits, Parity, StopBits};

/// Line settings for a serial link. Fixed once the transport is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            timeout: Duration::from_millis(500),
        }
    }
}

/// What became of a write. Writes are never retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Complete,
    Short { expected: usize, written: usize },
    Failed(io::ErrorKind),
    NotOpen,
}

/// Owns one serial device.
///
/// Nothing is opened at construction; assign a path and call [`open`], or
/// hand over an already connected writer with [`attach`].
///
/// [`open`]: SerialTransport::open
/// [`attach`]: SerialTransport::attach
pub struct SerialTransport {
    name: &'static str,
    config: SerialConfig,
    path: Option<String>,
    port: Option<Box<dyn Write + Send>>,
}

impl SerialTransport {
    pub fn new(name: &'static str, config: SerialConfig) -> Self {
        Self {
            name,
            config,
            path: None,
            port: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Takes effect on the next [`open`](SerialTransport::open).
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    pub fn open(&mut self) -> anyhow::Result<()> {
        if self.is_open() {
            return Ok(());
        }
        let path = self
            .path
            .as_deref()
            .with_context(|| format!("no serial device assigned to {}", self.name))?;

        let port = serialport::new(path, self.config.baud_rate)
            .data_bits(self.config.data_bits)
            .parity(self.config.parity)
            .stop_bits(self.config.stop_bits)
            .timeout(self.config.timeout)
            .open()
            .with_context(|| format!("failed to open {} on {path}", self.name))?;

        info!("{}: opened {path} at {} baud", self.name, self.config.baud_rate);
        self.port = Some(Box::new(port));
        Ok(())
    }

    /// Use an already connected writer in place of a serial device.
    pub fn attach(&mut self, port: impl Write + Send + 'static) {
        self.close();
        info!("{}: attached", self.name);
        self.port = Some(Box::new(port));
    }

    /// Release the device. Does nothing if it is not open.
    pub fn close(&mut self) {
        if let Some(mut port) = self.port.take() {
            let _ = port.flush();
            info!("{}: closed", self.name);
        }
    }

    /// Flush anything pending, then write `data` in one call.
    ///
    /// Failures are logged and reported in the outcome, never raised.
    pub fn write(&mut self, data: &[u8]) -> WriteOutcome {
        let Some(port) = self.port.as_mut() else {
            error!("{}: dropped {} bytes, device not open", self.name, data.len());
            return WriteOutcome::NotOpen;
        };
        if data.is_empty() {
            return WriteOutcome::Complete;
        }

        if let Err(e) = port.flush() {
            error!("{}: flush failed: {e}", self.name);
            return WriteOutcome::Failed(e.kind());
        }

        match port.write(data) {
            Ok(n) if n == data.len() => {
                debug!("{}: sent {}", self.name, format_bytes(data));
                WriteOutcome::Complete
            }
            Ok(n) => {
                error!(
                    "{}: expected to send {} bytes ({}), but only sent {n} bytes",
                    self.name,
                    data.len(),
                    format_bytes(data)
                );
                WriteOutcome::Short {
                    expected: data.len(),
                    written: n,
                }
            }
            Err(e) => {
                error!("{}: write of {} bytes failed: {e}", self.name, data.len());
                WriteOutcome::Failed(e.kind())
            }
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Space-separated lowercase hex, e.g. `fe 58`.
pub fn format_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
