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

//! Primitives for mapping [`tracing`] entities to [`RawEvent`]s.
//!
//! [`EventConverter`] implementations turn a [`tracing`] [`Event`] into the generic event that the
//! rest of this crate formats. [`FieldConverter`], the only implementation provided, takes the
//! `message` field as the message & every other field as a free-form field.
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html

use crate::{
    error::{Error, Result},
    event::{FieldValue, Fields, RawEvent},
    severity::EventLevel,
};

use backtrace::Backtrace;
use chrono::prelude::*;

/// Convert [`tracing`] [`Event`]s to [`RawEvent`]s.
///
/// [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
///
/// Implementations indicate, firstly, whether this event shall produce a log record at all
/// (`Ok(None)` means "no") and if so, what that record's level, message & fields shall be.
pub trait EventConverter<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(
        &self,
        event: &tracing::Event,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> Result<Option<RawEvent>>;
}

/// An [`EventConverter`] that records every field of an [`Event`].
///
/// The `message` field (the format string & arguments of `info!()` & friends) becomes the
/// message; all other fields are recorded under their own names. By default, an event without a
/// message gets an empty one; [`FieldConverter::require_message`] turns that into an error instead.
///
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
#[derive(Clone, Debug, Default)]
pub struct FieldConverter {
    require_message: bool,
}

impl FieldConverter {
    pub fn require_message(mut self, require_message: bool) -> Self {
        self.require_message = require_message;
        self
    }
    /// Convert `event` to a [`RawEvent`] stamped `timestamp`.
    pub fn convert(&self, event: &tracing::Event, timestamp: DateTime<Utc>) -> Result<RawEvent> {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let message = match visitor.message {
            Some(message) => message,
            None if self.require_message => {
                return Err(Error::NoMessageField {
                    name: event.metadata().name(),
                    back: Backtrace::new(),
                })
            }
            None => String::new(),
        };
        Ok(RawEvent {
            timestamp,
            level: EventLevel::from(event.metadata().level()),
            message,
            fields: visitor.fields,
        })
    }
}

impl<S> EventConverter<S> for FieldConverter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(
        &self,
        event: &tracing::Event,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> Result<Option<RawEvent>> {
        self.convert(event, Utc::now()).map(Some)
    }
}

/// An error recorded on an [`Event`], detached from the original (which we only borrow).
///
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
#[derive(Debug)]
struct RecordedError(String);

impl std::fmt::Display for RecordedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RecordedError {}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Fields,
}

impl FieldVisitor {
    fn insert(&mut self, field: &tracing::field::Field, value: FieldValue) {
        self.fields.insert(field.name().to_owned(), value);
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // The tracing macros "pre-format" the `message` field so that `value` is actually a
        // `std::fmt::Arguments`, which prints to a debug format without enclosing double-quotes.
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.insert(field, FieldValue::from(text));
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.insert(field, FieldValue::from(value));
        }
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, FieldValue::from(value));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, FieldValue::from(value));
    }
    fn record_i128(&mut self, field: &tracing::field::Field, value: i128) {
        // JSON numbers this wide won't survive most parsers; fall back to text
        let value = match i64::try_from(value) {
            Ok(x) => FieldValue::from(x),
            Err(_) => FieldValue::from(value.to_string()),
        };
        self.insert(field, value);
    }
    fn record_u128(&mut self, field: &tracing::field::Field, value: u128) {
        let value = match u64::try_from(value) {
            Ok(x) => FieldValue::from(x),
            Err(_) => FieldValue::from(value.to_string()),
        };
        self.insert(field, value);
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, FieldValue::from(value));
    }
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.insert(field, FieldValue::from(value));
    }
    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        self.insert(field, FieldValue::error(RecordedError(value.to_string())));
    }
}
