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
//! A [`tracing-subscriber`] [`Layer`] implementation for turning [`tracing`] [`Event`]s into
//! [mozlog] records, written to stdout or shipped to a stream.
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//! [`tracing`]: https://docs.rs/tracing/0.1.35/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
//! [mozlog]: https://wiki.mozilla.org/Firefox/Services/Logging
//!
//! # Introduction
//!
//! Centralized log ingestion wants every record in one fixed envelope, no matter which program
//! wrote it. The mozlog envelope looks like this (one line per record in practice):
//!
//! ```text
//! {"timestamp":1719158455000000000,"time":"2024-06-23T16:00:55Z","type":"app.log",
//!  "logger":"myapp","hostname":"bree.local","envVersion":"2.0","pid":4242,"severity":6,
//!  "fields":{"msg":"Hello, world!","user":"sp1ff"}}
//! ```
//!
//! The translation from a [`tracing`] event to such a record happens in three steps:
//!
//! 1. capturing the event as a [`RawEvent`]: level, message & free-form fields
//!    ([`tracing::EventConverter`](crate::tracing::EventConverter))
//!
//! 2. formatting that event ([`Formatter`](crate::formatter::Formatter)); the mozlog formatter
//!    maps the level onto the syslog severity scale, moves the message into `fields.msg` (a
//!    caller's own `msg` field survives as `fields."fields.msg"`) & serializes to JSON
//!
//! 3. delivering the result ([`Hook`](crate::hook::Hook)): to stdout, or to a named stream via a
//!    [`StreamTransport`](crate::transport::StreamTransport)
//!
//! [`RawEvent`]: crate::event::RawEvent
//!
//! # Usage
//!
//! [`tracing-mozlog`](crate)'s [`Layer`] comes with sane defaults:
//!
//! ```rust
//! use tracing::info;
//! use tracing_mozlog::layer::Layer;
//! use tracing_subscriber::registry::Registry;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! // The default configuration writes mozlog records to stdout, with the logger name taken from
//! // the executable & the type "app.log".
//! let subscriber = Registry::default().with(Layer::default());
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! info!(user = "sp1ff", "Hello, world!");
//! ```
//!
//! The logger name & record type are configurable, as is the destination:
//!
//! ```no_run
//! # #[cfg(feature = "kinesis")]
//! # fn main() {
//! use tracing::info;
//! use tracing_mozlog::{
//!     formatter::MozLog,
//!     hook::StreamHook,
//!     layer::Layer,
//!     transport::{KinesisConfig, KinesisTransport},
//! };
//! use tracing_subscriber::{layer::SubscriberExt, registry::Registry};
//!
//! let hook = StreamHook::builder(KinesisTransport::new(KinesisConfig::new("us-west-2")).unwrap())
//!     .default_stream("app-logs")
//!     .formatter(MozLog::builder().logger("myapp").kind("request.summary").build())
//!     .build();
//! let subscriber = Registry::default().with(Layer::with_hook(hook));
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! // Sent to "app-logs"...
//! info!("Hello, world!");
//! // while this goes to "audit"
//! info!(stream_name = "audit", "Hello, auditors!");
//! # }
//! # #[cfg(not(feature = "kinesis"))]
//! # fn main() {}
//! ```

pub mod chained;
pub mod envelope;
pub mod error;
pub mod event;
pub mod formatter;
pub mod hook;
pub mod layer;
pub mod process;
pub mod severity;
pub mod tracing;
pub mod transport;
pub mod writer;
