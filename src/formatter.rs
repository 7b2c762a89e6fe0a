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

//! Formatting primitives.
//!
//! This module defines the [`Formatter`] trait & its mozlog implementation, [`MozLog`].

use crate::{
    envelope::{Envelope, EnvelopeBuilder},
    error::Result,
    event::{merge_fields, RawEvent},
    process::{default_logger_name, ProcessIdentity},
};

use std::ops::Deref;

/// Operations all formatters must support
/// ======================================
///
/// # Introduction
///
/// The journey from an event to a log ingestion system occurs in three parts:
///
/// 1. capturing the event as a [`RawEvent`] (see [`crate::tracing`])
///
/// 2. formatting that event into a record compliant with the ingestion system
///
/// 3. delivering the record, either to a writer or to a stream (see [`crate::hook`])
///
/// [`Formatter`] implements step 2.
///
/// # Design
///
/// The associated type `Output` only promises that the result can be viewed as bytes; that
/// leaves implementations free to hand back whatever buffer they built without an extra copy, and
/// lets decorators like [`ChainedFormatter`](crate::chained::ChainedFormatter) pass their inner
/// formatter's output through untouched.
pub trait Formatter {
    type Error: std::error::Error + 'static;
    type Output: Deref<Target = [u8]>;
    fn format(&self, event: &RawEvent) -> std::result::Result<Self::Output, Self::Error>;
}

/// A [`Formatter`] that produces mozlog records: one line of compact JSON per event.
#[derive(Clone, Debug, Default)]
pub struct MozLog {
    envelopes: EnvelopeBuilder,
}

pub struct MozLogBuilder {
    logger: Option<String>,
    kind: String,
    identity: Option<ProcessIdentity>,
}

impl MozLogBuilder {
    /// Name of the emitting component; defaults to the executable's name
    pub fn logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }
    /// Record type; an empty string (the default) means "app.log"
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
    /// Override the process identity (mostly useful in tests)
    pub fn identity(mut self, identity: ProcessIdentity) -> Self {
        self.identity = Some(identity);
        self
    }
    pub fn build(self) -> MozLog {
        MozLog {
            envelopes: EnvelopeBuilder::new(
                self.logger.unwrap_or_else(default_logger_name),
                self.kind,
                self.identity.unwrap_or_else(|| ProcessIdentity::global().clone()),
            ),
        }
    }
}

impl MozLog {
    pub fn builder() -> MozLogBuilder {
        MozLogBuilder {
            logger: None,
            kind: String::new(),
            identity: None,
        }
    }
    pub fn envelope_builder(&self) -> &EnvelopeBuilder {
        &self.envelopes
    }
    /// Build the [`Envelope`] for `event`, without serializing it.
    pub fn envelope(&self, event: &RawEvent) -> Envelope {
        self.envelopes.build(
            event.timestamp,
            event.level.to_syslog_severity(),
            merge_fields(&event.fields, &event.message),
        )
    }
    /// Encode `event` as compact JSON, with no trailing newline.
    pub fn encode(&self, event: &RawEvent) -> Result<Vec<u8>> {
        self.envelope(event).to_json()
    }
}

impl Formatter for MozLog {
    type Error = crate::error::Error;
    type Output = Vec<u8>;
    fn format(&self, event: &RawEvent) -> Result<Self::Output> {
        let mut buf = self.encode(event)?;
        use bytes::BufMut;
        buf.put_u8(b'\n');
        Ok(buf)
    }
}
