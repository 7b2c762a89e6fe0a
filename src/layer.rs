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

//! [tracing-mozlog](crate) [`Layer`] implementations.
//!
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! A basic struct [`Layer`] is defined, with constructors for a few sensible combinations of type
//! parameters. Consumers of this crate are of course free to implement the [`EventConverter`] &
//! [`Hook`] traits for themselves & provide their own implementations.
//!
//! Writing to stdout & to a stream at the same time is just a matter of stacking two layers:
//!
//! ```no_run
//! use tracing_mozlog::{hook::StreamHook, layer::Layer, transport::StreamTransport};
//! use tracing_subscriber::{layer::SubscriberExt, registry::Registry};
//!
//! struct Nowhere;
//! impl StreamTransport for Nowhere {
//!     fn put_record(&self, _: &str, _: &str, _: &[u8]) -> tracing_mozlog::error::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let subscriber = Registry::default()
//!     .with(Layer::default())
//!     .with(Layer::with_hook(StreamHook::new("logs", Nowhere)));
//! let _guard = tracing::subscriber::set_default(subscriber);
//! tracing::info!(code = 5, "disk full");
//! ```

use crate::{
    error::{Error, Result},
    formatter::MozLog,
    hook::{Hook, WriterHook},
    severity::EventLevel,
    tracing::{EventConverter, FieldConverter},
};

use backtrace::Backtrace;
use tracing::Event;
use tracing_subscriber::{layer::Context, layer::SubscriberExt};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          struct Layer                                          //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A [`tracing-subscriber`]-compliant [`Layer`] implementation that hands each [`Event`] to a
/// [`Hook`].
///
/// [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
pub struct Layer<S, H: Hook, C: EventConverter<S> = FieldConverter>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    hook: H,
    converter: C,
    // The Subscriber implementation type has to be a type parameter to transmit it to the
    // EventConverter trait; this keeps the compiler quiet about it.
    subscriber_type: std::marker::PhantomData<S>,
}

/// A [`Layer`] that writes mozlog records to stdout, using the default [`MozLog`] formatter.
impl<S> std::default::Default for Layer<S, WriterHook<MozLog, std::io::Stdout>, FieldConverter>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn default() -> Self {
        Layer::stdout(MozLog::default())
    }
}

impl<S> Layer<S, WriterHook<MozLog, std::io::Stdout>, FieldConverter>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    /// Construct a [`Layer`] writing records produced by `formatter` to stdout
    pub fn stdout(formatter: MozLog) -> Self {
        Layer::with_hook(WriterHook::stdout(formatter))
    }
}

impl<S, H: Hook> Layer<S, H, FieldConverter>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    /// Construct a [`Layer`] firing `hook` for every event
    pub fn with_hook(hook: H) -> Self {
        Layer::new(hook, FieldConverter::default())
    }
}

impl<S, H: Hook, C: EventConverter<S>> Layer<S, H, C>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    /// construct Layer with custom inners
    pub fn new(hook: H, converter: C) -> Self {
        Layer {
            hook,
            converter,
            subscriber_type: std::marker::PhantomData,
        }
    }
    pub fn hook(&self) -> &H {
        &self.hook
    }
}

impl<S, H, C> tracing_subscriber::layer::Layer<S> for Layer<S, H, C>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    H: Hook + 'static,
    C: EventConverter<S> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        if !self
            .hook
            .levels()
            .contains(&EventLevel::from(event.metadata().level()))
        {
            return;
        }

        self.converter
            .on_event(event, ctx) // :=> Result<Option<RawEvent>>
            .and_then(|x| match x {
                Some(raw) => self.hook.fire(&raw),
                None => Ok(()),
            })
            .unwrap_or_else(|err| {
                // Reporting this via `tracing` would bring us right back here.
                eprintln!("tracing-mozlog: dropped an event: {}", err);
            })
    }
}

/// Make mozlog-on-stdout the global default: install a [`Registry`] with a single [`Layer`]
/// writing records produced by `formatter` to stdout.
///
/// [`Registry`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/registry/struct.Registry.html
pub fn enable(formatter: MozLog) -> Result<()> {
    let subscriber =
        tracing_subscriber::registry::Registry::default().with(Layer::stdout(formatter));
    tracing::subscriber::set_global_default(subscriber).map_err(|err| Error::Install {
        source: Box::new(err),
        back: Backtrace::new(),
    })
}

#[cfg(test)]
mod smoke {

    use super::*;

    use crate::{
        event::{FieldValue, RawEvent},
        hook::StreamHook,
        process::ProcessIdentity,
        transport::StreamTransport,
    };

    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use tracing::{debug, error, info, trace, warn};
    use tracing_subscriber::{
        layer::SubscriberExt, // Needed to get `with()`
        registry::Registry,
    };

    /// Remembers every event it's handed
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<RawEvent>>>);

    impl Hook for Captured {
        fn fire(&self, event: &RawEvent) -> Result<()> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    /// Only interested in errors
    #[derive(Clone, Default)]
    struct ErrorsOnly(Captured);

    impl Hook for ErrorsOnly {
        fn levels(&self) -> &'static [EventLevel] {
            &[EventLevel::Error]
        }
        fn fire(&self, event: &RawEvent) -> Result<()> {
            self.0.fire(event)
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct Puts(Arc<Mutex<Vec<(String, String)>>>);

    impl StreamTransport for Puts {
        fn put_record(&self, stream_name: &str, partition_key: &str, _: &[u8]) -> Result<()> {
            self.0
                .lock()
                .unwrap()
                .push((stream_name.to_owned(), partition_key.to_owned()));
            Ok(())
        }
    }

    #[test]
    fn test_fields_captured() {
        let captured = Captured::default();
        let subscriber = Registry::default().with(Layer::with_hook(captured.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let err = std::io::Error::new(std::io::ErrorKind::Other, "no space left on device");
            error!(code = 5, "disk full");
            warn!(
                ratio = 0.5,
                mount = "/var",
                healthy = false,
                cause = &err as &(dyn std::error::Error + 'static),
                "low disk"
            );
            info!(user = ?vec![1, 2], "Hello, 世界!");
            debug!(big = u128::MAX);
            trace!("way down");
        });

        let events = captured.0.lock().unwrap();
        assert_eq!(events.len(), 5);

        assert_eq!(events[0].level, EventLevel::Error);
        assert_eq!(events[0].message, "disk full");
        assert_eq!(events[0].field("code"), Some(&FieldValue::from(5i64)));

        assert_eq!(events[1].level, EventLevel::Warn);
        assert_eq!(events[1].field("ratio"), Some(&FieldValue::Float(0.5)));
        assert_eq!(events[1].field("mount"), Some(&FieldValue::from("/var")));
        assert_eq!(events[1].field("healthy"), Some(&FieldValue::from(false)));
        match events[1].field("cause") {
            Some(FieldValue::Error(err)) => assert_eq!(err.to_string(), "no space left on device"),
            other => panic!("expected an error, got {:?}", other),
        }

        assert_eq!(events[2].message, "Hello, 世界!");
        assert_eq!(events[2].field("user"), Some(&FieldValue::from("[1, 2]")));

        // No message field: the message is empty
        assert_eq!(events[3].message, "");
        assert_eq!(
            events[3].field("big"),
            Some(&FieldValue::from(u128::MAX.to_string()))
        );

        assert_eq!(events[4].level, EventLevel::Trace);
    }

    #[test]
    fn test_levels_honored() {
        let hook = ErrorsOnly::default();
        let subscriber = Registry::default().with(Layer::with_hook(hook.clone()));
        tracing::subscriber::with_default(subscriber, || {
            info!("ignored");
            error!("kept");
        });
        let events = (hook.0).0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "kept");
    }

    #[test]
    fn test_require_message() {
        let captured = Captured::default();
        let subscriber = Registry::default().with(Layer::new(
            captured.clone(),
            FieldConverter::default().require_message(true),
        ));
        tracing::subscriber::with_default(subscriber, || {
            info!(code = 5);
            info!(code = 6, "has one");
        });
        let events = captured.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "has one");
    }

    #[test]
    fn test_mozlog_lines() {
        let buf = SharedBuf::default();
        let formatter = MozLog::builder()
            .logger("smoke")
            .identity(ProcessIdentity::new("bree.local", 123))
            .build();
        let subscriber =
            Registry::default().with(Layer::with_hook(WriterHook::new(formatter, buf.clone())));
        tracing::subscriber::with_default(subscriber, || {
            error!(code = 5, "disk full");
            info!(msg = "ignored-previous", "started");
        });

        let bytes = buf.0.lock().unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["severity"], serde_json::json!(3));
        assert_eq!(
            lines[0]["fields"],
            serde_json::json!({"msg": "disk full", "code": 5})
        );
        assert_eq!(lines[0]["logger"], serde_json::json!("smoke"));
        assert_eq!(
            lines[1]["fields"],
            serde_json::json!({"msg": "started", "fields.msg": "ignored-previous"})
        );
    }

    #[test]
    fn test_stacked_layers() {
        let buf = SharedBuf::default();
        let puts = Puts::default();
        let subscriber = Registry::default()
            .with(Layer::with_hook(WriterHook::new(
                MozLog::default(),
                buf.clone(),
            )))
            .with(Layer::with_hook(StreamHook::new("default", puts.clone())));
        tracing::subscriber::with_default(subscriber, || {
            info!(stream_name = "custom", "routed");
            info!("not routed");
        });

        let puts = puts.0.lock().unwrap();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].0, "custom");
        assert_eq!(puts[1].0, "default");
        assert_eq!(buf.0.lock().unwrap().iter().filter(|&&b| b == b'\n').count(), 2);
    }

    #[test]
    fn test_defaults() {
        // Just exercise `default()`; be sure it compiles & returns something sane.
        let layer: Layer<Registry, _> = Layer::default();
        assert_eq!(layer.hook().levels().len(), 7);
    }
}
