//! Line-oriented output channel.
//!
//! The rig reports everything on a single text stream (historically a serial
//! port captured with `cat /dev/ttyACM0 > logfile.txt`). Two record kinds
//! share the stream, distinguished by a leading marker:
//!
//! - comment/diagnostic lines: `# <label>: <value>` or `# <text>`;
//! - data lines: one unsigned integer per trial, the latency in
//!   microseconds, no prefix.
//!
//! Downstream tooling filters on the `#` prefix, so calibration values and
//! failure notices travel inside the log file without corrupting the data.
//! Every line is flushed as it is written so an external capture sees
//! records promptly.

use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

/// Writer for the measurement transcript.
#[derive(Debug)]
pub struct Transcript<W: Write> {
    out: W,
}

impl<W: Write> Transcript<W> {
    /// Wraps a sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Emits a labeled diagnostic comment: `# <label>: <value>`.
    pub fn comment(&mut self, label: &str, value: impl Display) -> io::Result<()> {
        writeln!(self.out, "# {}: {}", label, value)?;
        self.out.flush()
    }

    /// Emits a bare diagnostic comment: `# <text>`.
    pub fn note(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "# {}", text)?;
        self.out.flush()
    }

    /// Emits one latency sample as a bare microsecond integer.
    pub fn sample(&mut self, latency: Duration) -> io::Result<()> {
        writeln!(self.out, "{}", latency.as_micros())?;
        self.out.flush()
    }

    /// Consumes the transcript, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
