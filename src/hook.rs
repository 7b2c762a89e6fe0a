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

//! Delivery hooks.
//!
//! A [`Hook`] is handed every event the host logging subsystem emits & is responsible for getting
//! it somewhere. Two implementations are provided:
//!
//! - [`WriterHook`] formats the event & writes the bytes to a [`Write`] implementation (stdout, by
//!   default)
//!
//! - [`StreamHook`] formats the event & puts it on a named stream via a [`StreamTransport`]; the
//!   stream is chosen per-event when the event carries a `stream_name` field
//!
//! Neither buffers, batches nor retries: one event, one write (or put).

use crate::{
    error::{Error, Result},
    event::RawEvent,
    formatter::{Formatter, MozLog},
    severity::{EventLevel, ALL_LEVELS},
    transport::StreamTransport,
};

use sha1::{Digest, Sha1};

use std::{io::Write, sync::Mutex};

/// Field naming the stream to which an event should be sent, overriding the hook's default
pub const STREAM_NAME_FIELD: &str = "stream_name";

/// Operations all hooks must support.
pub trait Hook {
    /// The levels this hook wants to see. Filtering, if any, is up to the caller; the hooks in this
    /// crate accept everything.
    fn levels(&self) -> &'static [EventLevel] {
        ALL_LEVELS
    }
    /// Deliver `event`
    fn fire(&self, event: &RawEvent) -> Result<()>;
}

/// Compute the partition key for a record: the SHA-1 digest of its bytes, as forty uppercase hex
/// digits.
pub fn partition_key(data: &[u8]) -> String {
    hex::encode_upper(Sha1::digest(data))
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        struct WriterHook                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A [`Hook`] that writes formatted records to `W`.
///
/// Writes are serialized through a mutex, so records from concurrent threads are never
/// interleaved.
pub struct WriterHook<F: Formatter, W: Write> {
    formatter: F,
    writer: Mutex<W>,
}

impl<F: Formatter> WriterHook<F, std::io::Stdout> {
    pub fn stdout(formatter: F) -> Self {
        WriterHook::new(formatter, std::io::stdout())
    }
}

impl std::default::Default for WriterHook<MozLog, std::io::Stdout> {
    fn default() -> Self {
        WriterHook::stdout(MozLog::default())
    }
}

impl<F: Formatter, W: Write> WriterHook<F, W> {
    pub fn new(formatter: F, writer: W) -> Self {
        WriterHook {
            formatter,
            writer: Mutex::new(writer),
        }
    }
    /// Tear this hook down, handing back the writer
    pub fn into_writer(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<F, W> Hook for WriterHook<F, W>
where
    F: Formatter,
    F::Error: Into<Error>,
    W: Write,
{
    fn fire(&self, event: &RawEvent) -> Result<()> {
        let buf = self.formatter.format(event).map_err(Into::<Error>::into)?;
        // A panic mid-write at worst leaves a partial line behind; carry on.
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(&*buf)?;
        writer.flush()?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        struct StreamHook                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A [`Hook`] that puts each formatted record on a stream.
pub struct StreamHook<F: Formatter, T: StreamTransport> {
    formatter: F,
    transport: T,
    default_stream: String,
}

pub struct StreamHookBuilder<F: Formatter, T: StreamTransport> {
    imp: StreamHook<F, T>,
}

impl<F: Formatter, T: StreamTransport> StreamHookBuilder<F, T> {
    pub fn default_stream(mut self, name: impl Into<String>) -> Self {
        self.imp.default_stream = name.into();
        self
    }
    /// Replace the formatter (mozlog, by default)
    pub fn formatter<G: Formatter>(self, formatter: G) -> StreamHookBuilder<G, T> {
        StreamHookBuilder {
            imp: StreamHook {
                formatter,
                transport: self.imp.transport,
                default_stream: self.imp.default_stream,
            },
        }
    }
    pub fn build(self) -> StreamHook<F, T> {
        self.imp
    }
}

impl<T: StreamTransport> StreamHook<MozLog, T> {
    /// Construct a hook sending mozlog records to `default_stream` (unless overridden per-event)
    pub fn new(default_stream: impl Into<String>, transport: T) -> Self {
        StreamHook {
            formatter: MozLog::default(),
            transport,
            default_stream: default_stream.into(),
        }
    }
    pub fn builder(transport: T) -> StreamHookBuilder<MozLog, T> {
        StreamHookBuilder {
            imp: StreamHook::new(String::new(), transport),
        }
    }
}

impl<F: Formatter, T: StreamTransport> StreamHook<F, T> {
    pub fn default_stream(&self) -> &str {
        &self.default_stream
    }
    pub fn transport(&self) -> &T {
        &self.transport
    }
    /// The stream to which `event` will be sent: its `stream_name` field, if that's a string, else
    /// our default.
    pub fn stream_name<'a>(&'a self, event: &'a RawEvent) -> &'a str {
        event
            .field(STREAM_NAME_FIELD)
            .and_then(|v| v.as_str())
            .unwrap_or(&self.default_stream)
    }
}

impl<F, T> Hook for StreamHook<F, T>
where
    F: Formatter,
    F::Error: Into<Error>,
    T: StreamTransport,
{
    fn fire(&self, event: &RawEvent) -> Result<()> {
        let data = self.formatter.format(event).map_err(Into::<Error>::into)?;
        let key = partition_key(&*data);
        self.transport
            .put_record(self.stream_name(event), &key, &*data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::process::ProcessIdentity;

    #[derive(Default)]
    struct Recorder {
        puts: Mutex<Vec<(String, String, Vec<u8>)>>,
    }

    impl StreamTransport for Recorder {
        fn put_record(&self, stream_name: &str, partition_key: &str, data: &[u8]) -> Result<()> {
            self.puts.lock().unwrap().push((
                stream_name.to_owned(),
                partition_key.to_owned(),
                data.to_vec(),
            ));
            Ok(())
        }
    }

    struct Throttled;

    impl StreamTransport for Throttled {
        fn put_record(&self, _: &str, _: &str, _: &[u8]) -> Result<()> {
            Err(Error::transport("ProvisionedThroughputExceededException"))
        }
    }

    fn mozlog() -> MozLog {
        MozLog::builder()
            .logger("prototyping")
            .identity(ProcessIdentity::new("bree.local", 123))
            .build()
    }

    fn recording_hook() -> StreamHook<MozLog, Recorder> {
        StreamHook::builder(Recorder::default())
            .default_stream("default-stream")
            .formatter(mozlog())
            .build()
    }

    #[test]
    fn test_partition_key() {
        assert_eq!(
            partition_key(b"abc"),
            "A9993E364706816ABA3E25717850C26C9CD0D89D"
        );
        let key = partition_key(b"{\"msg\":\"hi\"}\n");
        assert_eq!(key.len(), 40);
        assert!(key
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_eq!(key, partition_key(b"{\"msg\":\"hi\"}\n"));
    }

    #[test]
    fn test_default_stream() {
        let hook = recording_hook();
        let event = RawEvent::new(EventLevel::Info, "started");
        hook.fire(&event).unwrap();

        let puts = hook.transport().puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        let (stream, key, data) = &puts[0];
        assert_eq!(stream, "default-stream");
        // The payload is exactly what the formatter produces, & the key is derived from it
        assert_eq!(data, &mozlog().format(&event).unwrap());
        assert_eq!(key, &partition_key(data));
    }

    #[test]
    fn test_stream_override() {
        let hook = recording_hook();
        let event = RawEvent::new(EventLevel::Warn, "routed").with_field("stream_name", "custom");
        assert_eq!(hook.stream_name(&event), "custom");
        hook.fire(&event).unwrap();

        // A non-string stream_name is ignored
        let event = RawEvent::new(EventLevel::Warn, "routed").with_field("stream_name", 7);
        assert_eq!(hook.stream_name(&event), "default-stream");
        hook.fire(&event).unwrap();

        let puts = hook.transport().puts.lock().unwrap();
        assert_eq!(puts[0].0, "custom");
        assert_eq!(puts[1].0, "default-stream");
        // The field rides along in the record itself
        let rec: serde_json::Value = serde_json::from_slice(&puts[0].2).unwrap();
        assert_eq!(rec["fields"]["stream_name"], serde_json::json!("custom"));
    }

    #[test]
    fn test_errors_propagate() {
        let hook = StreamHook::builder(Throttled)
            .default_stream("s")
            .formatter(mozlog())
            .build();
        let err = hook
            .fire(&RawEvent::new(EventLevel::Error, "boom"))
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));

        let hook = recording_hook();
        let err = hook
            .fire(&RawEvent::new(EventLevel::Error, "nan").with_field("x", f64::NAN))
            .unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(hook.transport().puts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_levels() {
        assert_eq!(recording_hook().levels(), ALL_LEVELS);
        assert_eq!(WriterHook::new(mozlog(), Vec::<u8>::new()).levels(), ALL_LEVELS);
    }

    #[test]
    fn test_writer_hook() {
        let hook = WriterHook::new(mozlog(), Vec::<u8>::new());
        let a = RawEvent::new(EventLevel::Info, "one");
        let b = RawEvent::new(EventLevel::Debug, "two");
        hook.fire(&a).unwrap();
        hook.fire(&b).unwrap();

        let buf = hook.into_writer();
        let mut expected = mozlog().format(&a).unwrap();
        expected.extend_from_slice(&mozlog().format(&b).unwrap());
        assert_eq!(buf, expected);
    }

    /// Accepts one byte per `write()`, giving other threads every chance to cut in
    #[derive(Default)]
    struct Trickle(Vec<u8>);

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            match buf.first() {
                Some(b) => {
                    self.0.push(*b);
                    std::thread::yield_now();
                    Ok(1)
                }
                None => Ok(0),
            }
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_hook_threads() {
        let hook = WriterHook::new(mozlog(), Trickle::default());
        std::thread::scope(|scope| {
            for t in 0..4 {
                let hook = &hook;
                scope.spawn(move || {
                    for i in 0..25 {
                        let message = format!("thread {}, record {}", t, i);
                        let event =
                            RawEvent::new(EventLevel::Info, message).with_field("thread", t);
                        hook.fire(&event).unwrap();
                    }
                });
            }
        });

        let bytes = hook.into_writer().0;
        let text = std::str::from_utf8(&bytes).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 100);
        for t in 0..4 {
            assert_eq!(lines.iter().filter(|rec| rec["fields"]["thread"] == t).count(), 25);
        }
    }
}
