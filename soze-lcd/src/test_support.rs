use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory device that keeps everything written to it.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Accepts at most `limit` bytes per write call.
#[derive(Clone)]
pub struct ShortWriter {
    limit: usize,
    calls: Arc<AtomicUsize>,
}

impl ShortWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(buf.len().min(self.limit))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Flush,
    Write(usize),
}

/// Logs every flush and write in call order.
#[derive(Clone, Default)]
pub struct RecordingWriter {
    ops: Arc<Mutex<Vec<Op>>>,
    fail_flush: bool,
}

impl RecordingWriter {
    pub fn failing_flush() -> Self {
        Self {
            fail_flush: true,
            ..Self::default()
        }
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }
}

impl Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ops.lock().unwrap().push(Op::Write(buf.len()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ops.lock().unwrap().push(Op::Flush);
        if self.fail_flush {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "stalled"));
        }
        Ok(())
    }
}
