/// Line-oriented transport over the sensor serial link.
///
/// The physical layer is an external collaborator: the concentrator's
/// device node is configured out-of-band and presents as a byte stream of
/// newline-terminated frames. This module only turns that stream into
/// complete decoded lines. Bytes that are not valid UTF-8 are dropped
/// rather than failing the frame, since line noise on the serial link is
/// routine.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Fatal transport failures. Per-frame problems are NOT transport errors;
/// anything surfaced here ends the ingest loop.
#[derive(Debug)]
pub enum TransportError {
    /// The device reached end-of-stream (port closed or unplugged).
    Closed,
    /// An I/O error on the device.
    Io(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Closed => write!(f, "transport closed"),
            TransportError::Io(msg) => write!(f, "transport I/O error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Source of complete decoded frames.
///
/// `Ok(None)` means an empty read (a bare newline or a read timeout at the
/// device layer); the caller simply retries. Only `Err` is fatal.
pub trait LineTransport {
    fn next_line(&mut self) -> Result<Option<String>, TransportError>;
}

// ---------------------------------------------------------------------------
// Buffered reader implementation
// ---------------------------------------------------------------------------

/// `LineTransport` over any buffered reader: the serial device node in
/// production, an in-memory cursor in tests.
pub struct LineReader<R> {
    inner: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl LineReader<BufReader<File>> {
    /// Opens the configured serial device node for reading.
    pub fn open_device(path: &Path) -> Result<Self, TransportError> {
        let file = File::open(path)
            .map_err(|e| TransportError::Io(format!("cannot open {}: {}", path.display(), e)))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineTransport for LineReader<R> {
    fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        let mut raw = Vec::new();
        let n = self
            .inner
            .read_until(b'\n', &mut raw)
            .map_err(|e| TransportError::Io(e.to_string()))?;

        if n == 0 {
            return Err(TransportError::Closed);
        }

        // Lossy decode, then drop replacement characters entirely: serial
        // line noise must not kill a frame boundary or poison a token.
        let decoded: String = String::from_utf8_lossy(&raw)
            .chars()
            .filter(|&c| c != '\u{FFFD}')
            .collect();
        let line = decoded.trim().to_string();

        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
