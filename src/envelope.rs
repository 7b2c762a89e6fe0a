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
//! The mozlog envelope.
//!
//! An [`Envelope`] is the fixed-schema record written for every event:
//!
//! ```text
//! {"timestamp":0,"time":"1970-01-01T00:00:00Z","type":"app.log","logger":"prototyping",
//!  "hostname":"bree.local","envVersion":"2.0","pid":123,"severity":6,"fields":{"msg":"Hello"}}
//! ```
//!
//! (wrapped here for legibility; the real thing is a single line). [`EnvelopeBuilder`] carries the
//! per-logger parts (logger name, record type & process identity) so that only the per-event
//! parts need supplying for each record.

use crate::{
    error::Result,
    event::Fields,
    process::{default_logger_name, ProcessIdentity},
};

use chrono::prelude::*;

/// Record type used when none is configured
pub const DEFAULT_TYPE: &str = "app.log";
/// The version of the mozlog envelope we produce
pub const ENV_VERSION: &str = "2.0";

fn is_zero<T: Default + PartialEq>(x: &T) -> bool {
    *x == T::default()
}

/// A single mozlog record.
///
/// Fields serialize in declaration order. `hostname`, `pid` & `severity` are left out when they
/// hold their zero value; everything else is always present.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Envelope {
    /// Nanoseconds since the Unix epoch
    pub timestamp: i64,
    /// [`timestamp`](Envelope::timestamp), as RFC 3339
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub logger: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(rename = "envVersion")]
    pub env_version: &'static str,
    #[serde(skip_serializing_if = "is_zero")]
    pub pid: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub severity: u8,
    pub fields: Fields,
}

impl Envelope {
    /// Serialize to compact JSON, sans trailing newline
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Builds [`Envelope`]s for one logger.
#[derive(Clone, Debug)]
pub struct EnvelopeBuilder {
    logger: String,
    kind: String,
    identity: ProcessIdentity,
}

impl std::default::Default for EnvelopeBuilder {
    fn default() -> Self {
        EnvelopeBuilder {
            logger: default_logger_name(),
            kind: DEFAULT_TYPE.to_owned(),
            identity: ProcessIdentity::global().clone(),
        }
    }
}

impl EnvelopeBuilder {
    /// An empty `kind` selects [`DEFAULT_TYPE`].
    pub fn new(
        logger: impl Into<String>,
        kind: impl Into<String>,
        identity: ProcessIdentity,
    ) -> EnvelopeBuilder {
        let mut kind = kind.into();
        if kind.is_empty() {
            kind = DEFAULT_TYPE.to_owned();
        }
        EnvelopeBuilder {
            logger: logger.into(),
            kind,
            identity,
        }
    }
    pub fn logger(&self) -> &str {
        &self.logger
    }
    pub fn kind(&self) -> &str {
        &self.kind
    }
    pub fn identity(&self) -> &ProcessIdentity {
        &self.identity
    }
    /// Assemble an envelope. Both time fields are derived from `time`, so they always agree.
    pub fn build(&self, time: DateTime<Utc>, severity: u8, fields: Fields) -> Envelope {
        Envelope {
            // Only representable between 1677 & 2262; outside that window we record zero rather
            // than fail.
            timestamp: time.timestamp_nanos_opt().unwrap_or_default(),
            time: time.to_rfc3339_opts(SecondsFormat::Secs, true),
            kind: self.kind.clone(),
            logger: self.logger.clone(),
            hostname: self.identity.hostname().to_owned(),
            env_version: ENV_VERSION,
            pid: self.identity.pid(),
            severity,
            fields,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::event::{merge_fields, FieldValue};

    fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::new("prototyping", "", ProcessIdentity::new("bree.local", 123))
    }

    #[test]
    fn test_golden() {
        let env = builder().build(
            std::time::UNIX_EPOCH.into(),
            6,
            merge_fields(&Fields::new(), "Hello, world!"),
        );
        assert_eq!(env.kind, DEFAULT_TYPE);
        assert_eq!(
            std::str::from_utf8(&env.to_json().unwrap()).unwrap(),
            "{\"timestamp\":0,\"time\":\"1970-01-01T00:00:00Z\",\"type\":\"app.log\",\
             \"logger\":\"prototyping\",\"hostname\":\"bree.local\",\"envVersion\":\"2.0\",\
             \"pid\":123,\"severity\":6,\"fields\":{\"msg\":\"Hello, world!\"}}"
        );
    }

    #[test]
    fn test_zero_values_omitted() {
        let b = EnvelopeBuilder::new("p", "request.summary", ProcessIdentity::new("", 0));
        let env = b.build(std::time::UNIX_EPOCH.into(), 0, Fields::new());
        assert_eq!(
            std::str::from_utf8(&env.to_json().unwrap()).unwrap(),
            "{\"timestamp\":0,\"time\":\"1970-01-01T00:00:00Z\",\"type\":\"request.summary\",\
             \"logger\":\"p\",\"envVersion\":\"2.0\",\"fields\":{}}"
        );
    }

    #[test]
    fn test_times_agree() {
        let t = Utc.with_ymd_and_hms(2024, 2, 29, 12, 34, 56).unwrap()
            + chrono::Duration::nanoseconds(789);
        let env = builder().build(t, 3, Fields::new());
        assert_eq!(env.timestamp, t.timestamp_nanos_opt().unwrap());
        let parsed = DateTime::parse_from_rfc3339(&env.time).unwrap();
        assert_eq!(parsed.timestamp(), env.timestamp / 1_000_000_000);
        assert_eq!(env.time, "2024-02-29T12:34:56Z");
    }

    #[test]
    fn test_identity_shared() {
        let a = EnvelopeBuilder::default().build(Utc::now(), 6, Fields::new());
        let b = EnvelopeBuilder::new("other", "x", ProcessIdentity::global().clone()).build(
            Utc::now(),
            7,
            Fields::new(),
        );
        assert_eq!(a.hostname, b.hostname);
        assert_eq!(a.pid, b.pid);
    }

    #[test]
    fn test_bad_value() {
        let mut fields = Fields::new();
        fields.insert("ratio".to_owned(), FieldValue::Float(f64::NAN));
        let env = builder().build(Utc::now(), 6, fields);
        assert!(matches!(
            env.to_json(),
            Err(crate::error::Error::Serialization { .. })
        ));
    }
}
