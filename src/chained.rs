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

//! Chaining formatters.
//!
//! Some ingestion pipelines insist on their own envelope. [`ChainedFormatter`] lets the mozlog
//! record ride along inside it: the event is encoded as mozlog, the encoding becomes the message
//! of the event, and that event is handed to a second, independently configured [`Formatter`]
//! whose output is returned untouched.

use crate::{
    error::{Error, Result},
    event::RawEvent,
    formatter::{Formatter, MozLog},
};

use backtrace::Backtrace;

/// A [`Formatter`] that wraps a mozlog record in the envelope produced by `F`.
pub struct ChainedFormatter<F: Formatter> {
    mozlog: MozLog,
    secondary: F,
}

impl<F: Formatter> ChainedFormatter<F> {
    pub fn new(mozlog: MozLog, secondary: F) -> ChainedFormatter<F> {
        ChainedFormatter { mozlog, secondary }
    }
    pub fn secondary(&self) -> &F {
        &self.secondary
    }
}

impl<F> Formatter for ChainedFormatter<F>
where
    F: Formatter,
    F::Error: Send + Sync,
{
    type Error = Error;
    type Output = F::Output;
    /// The caller's event is never modified; the secondary formatter sees a copy whose message
    /// has been replaced by the mozlog encoding (sans newline).
    ///
    /// A successful secondary result is returned as-is. A failure is not: it is boxed into
    /// [`Error::Chained`] so that callers can tell it apart from a failure to encode the mozlog
    /// record itself, which surfaces as [`Error::Serialization`].
    fn format(&self, event: &RawEvent) -> Result<F::Output> {
        let encoded = serde_json::to_string(&self.mozlog.envelope(event))?;
        let mut wrapped = event.clone();
        wrapped.message = encoded;
        self.secondary
            .format(&wrapped)
            .map_err(|err| Error::Chained {
                source: Box::new(err),
                back: Backtrace::new(),
            })
    }
}
