use std::io::Read;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;

use anyhow::{Context, Result};

const CHUNK_SIZE: usize = 4096;

/// Binds a Unix domain socket, removing any stale socket file first.
pub fn bind_listener(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path).context("removing stale socket")?;
    }
    UnixListener::bind(path).with_context(|| format!("binding {}", path.display()))
}

/// Reads raw controller bytes from a connected driver.
///
/// The byte stream has no framing of its own; chunks are handed over as
/// they arrive and a command may straddle two of them.
pub struct SocketReceiver {
    stream: UnixStream,
    buf: Box<[u8]>,
}

impl SocketReceiver {
    pub fn new(stream: UnixStream) -> Self {
        Self {
            stream,
            buf: vec![0u8; CHUNK_SIZE].into_boxed_slice(),
        }
    }

    /// Next chunk of bytes. Returns None once the driver hangs up.
    pub fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            match self.stream.read(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(n) => return Ok(Some(self.buf[..n].to_vec())),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("reading from driver"),
            }
        }
    }
}
