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
//! The generic structured event that gets turned into a mozlog envelope.
//!
//! A [`RawEvent`] is what the host logging subsystem hands us: a timestamp, a level, a message and
//! a bag of free-form fields. [`merge_fields`] reconciles that bag with the envelope's reserved
//! `msg` field.

use crate::severity::EventLevel;

use chrono::prelude::*;

use std::{collections::BTreeMap, sync::Arc};

/// Key under which the event's message is recorded in the envelope's `fields`
pub const MSG_KEY: &str = "msg";
/// Key under which a caller-supplied `msg` field is preserved
pub const SHADOWED_MSG_KEY: &str = "fields.msg";

/// A single field value.
///
/// Most values are plain JSON. Floats are kept apart because only the finite ones can be written
/// as JSON, and errors are kept apart so that they can be rendered via [`Display`] rather than
/// whatever structure they happen to have.
///
/// [`Display`]: std::fmt::Display
#[derive(Clone, Debug)]
pub enum FieldValue {
    Value(serde_json::Value),
    Float(f64),
    Error(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl FieldValue {
    pub fn error<E>(err: E) -> FieldValue
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FieldValue::Error(Arc::new(err))
    }
    /// The string held by this value, if it is a JSON string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Value(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl std::cmp::PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Value(a), FieldValue::Value(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::Error(a), FieldValue::Error(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl serde::Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            FieldValue::Value(v) => v.serialize(serializer),
            FieldValue::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            FieldValue::Float(x) => Err(serde::ser::Error::custom(format!(
                "{} cannot be represented in JSON",
                x
            ))),
            FieldValue::Error(err) => serializer.collect_str(err),
        }
    }
}

impl std::convert::From<serde_json::Value> for FieldValue {
    fn from(x: serde_json::Value) -> Self {
        FieldValue::Value(x)
    }
}

impl std::convert::From<&str> for FieldValue {
    fn from(x: &str) -> Self {
        FieldValue::Value(x.into())
    }
}

impl std::convert::From<String> for FieldValue {
    fn from(x: String) -> Self {
        FieldValue::Value(x.into())
    }
}

impl std::convert::From<bool> for FieldValue {
    fn from(x: bool) -> Self {
        FieldValue::Value(x.into())
    }
}

impl std::convert::From<i32> for FieldValue {
    fn from(x: i32) -> Self {
        FieldValue::Value(x.into())
    }
}

impl std::convert::From<i64> for FieldValue {
    fn from(x: i64) -> Self {
        FieldValue::Value(x.into())
    }
}

impl std::convert::From<u32> for FieldValue {
    fn from(x: u32) -> Self {
        FieldValue::Value(x.into())
    }
}

impl std::convert::From<u64> for FieldValue {
    fn from(x: u64) -> Self {
        FieldValue::Value(x.into())
    }
}

impl std::convert::From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

/// Field name → value; ordered, so that formatting is deterministic
pub type Fields = BTreeMap<String, FieldValue>;

/// A structured log event, prior to formatting.
#[derive(Clone, Debug)]
pub struct RawEvent {
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    pub message: String,
    pub fields: Fields,
}

impl RawEvent {
    /// A new event, stamped with the current time & carrying no fields
    pub fn new(level: EventLevel, message: impl Into<String>) -> RawEvent {
        RawEvent {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields: Fields::new(),
        }
    }
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
    pub fn with_error<E>(mut self, name: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.fields.insert(name.into(), FieldValue::error(err));
        self
    }
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Produce the `fields` member of an envelope from an event's fields & message.
///
/// `fields` is copied, never modified. In the copy, errors are replaced by their string form, any
/// existing `msg` is moved to `fields.msg`, and `msg` is set to `message`.
pub fn merge_fields(fields: &Fields, message: &str) -> Fields {
    let mut merged: Fields = fields
        .iter()
        .map(|(k, v)| {
            let v = match v {
                FieldValue::Error(err) => FieldValue::Value(err.to_string().into()),
                v => v.clone(),
            };
            (k.clone(), v)
        })
        .collect();

    if let Some(prior) = merged.remove(MSG_KEY) {
        merged.insert(SHADOWED_MSG_KEY.to_owned(), prior);
    }
    merged.insert(MSG_KEY.to_owned(), FieldValue::from(message));
    merged
}
