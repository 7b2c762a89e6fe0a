// Copyright (C) 2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of tracing-mozlog.
//
// tracing-mozlog is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// tracing-mozlog is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with tracing-mozlog.  If
// not, see <http://www.gnu.org/licenses/>.

//! Mozlog for plain-text emitters.
//!
//! [`MozLogWriter`] is a [`Write`] implementation that treats each write as one raw log line:
//! the bytes are whitespace-trimmed, wrapped in an [`Envelope`] as `fields.msg` & the JSON
//! encoding of that envelope is written, newline-terminated, to the inner writer. There is no
//! level to speak of, so these records carry no `severity`.
//!
//! Since `write!()` & friends may well split one line across several writes, wrap the writer in
//! a [`std::io::LineWriter`] when feeding it formatted text:
//!
//! ```
//! use std::io::Write;
//! use tracing_mozlog::{envelope::EnvelopeBuilder, process::ProcessIdentity, writer::MozLogWriter};
//!
//! let envelopes = EnvelopeBuilder::new("legacy", "", ProcessIdentity::new("bree.local", 123));
//! let mut out = std::io::LineWriter::new(MozLogWriter::new(envelopes, Vec::new()));
//! writeln!(out, "{} widgets processed", 11).unwrap();
//! let buf = out.into_inner().unwrap().into_inner();
//! assert!(std::str::from_utf8(&buf).unwrap().contains("\"msg\":\"11 widgets processed\""));
//! ```

use crate::{
    envelope::{Envelope, EnvelopeBuilder},
    event::{merge_fields, Fields},
};

use bytes::BufMut;
use chrono::prelude::*;

use std::io::Write;

/// A [`Write`] implementation producing one mozlog record per write.
#[derive(Debug)]
pub struct MozLogWriter<W: Write> {
    envelopes: EnvelopeBuilder,
    inner: W,
}

impl<W: Write> MozLogWriter<W> {
    pub fn new(envelopes: EnvelopeBuilder, inner: W) -> MozLogWriter<W> {
        MozLogWriter { envelopes, inner }
    }
    pub fn into_inner(self) -> W {
        self.inner
    }
    /// Wrap `line`, stamped `now`, in an [`Envelope`]
    pub fn envelope(&self, line: &[u8], now: DateTime<Utc>) -> Envelope {
        let text = String::from_utf8_lossy(line);
        self.envelopes
            .build(now, 0, merge_fields(&Fields::new(), text.trim()))
    }
}

impl<W: Write> Write for MozLogWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut json = self
            .envelope(buf, Utc::now())
            .to_json()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        json.put_u8(b'\n');
        self.inner.write_all(&json)?;
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
