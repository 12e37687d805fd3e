//! Line-oriented URL sink.

use std::io::{self, BufWriter, Write};

use super::json::UrlOutput;
use super::text::TextFormatter;
use crate::OutputFormat;

/// Writes one URL per line, as plain text or as a JSON object.
pub struct UrlWriter<W: Write> {
    out: BufWriter<W>,
    format: OutputFormat,
}

impl<W: Write> UrlWriter<W> {
    /// Wraps `out` in a buffered writer.
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out: BufWriter::new(out),
            format,
        }
    }

    /// Writes one URL.
    pub fn write_url(&mut self, url: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", TextFormatter::format_url(url)),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &UrlOutput { url })?;
                self.out.write_all(b"\n")
            }
        }
    }

    /// Flushes buffered lines to the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Hands back the underlying writer, dropping anything not yet flushed.
    pub fn into_inner(self) -> W {
        self.out.into_parts().0
    }
}
