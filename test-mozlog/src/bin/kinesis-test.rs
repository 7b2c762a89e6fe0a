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

//! Put a few records on a Kinesis stream.
//!
//! Usage: `kinesis-test STREAM [ENDPOINT]`; region & credentials come from the environment. Point
//! ENDPOINT at localstack (http://localhost:4566, say) to try this out without an AWS account.

use tracing::{error, info, warn};
use tracing_mozlog::{
    event::RawEvent,
    formatter::MozLog,
    hook::{Hook, StreamHook},
    layer::Layer,
    severity::EventLevel,
    transport::{KinesisConfig, KinesisTransport},
};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    let mut args = std::env::args().skip(1);
    let stream = args.next().expect("usage: kinesis-test STREAM [ENDPOINT]");
    let mut config = KinesisConfig::from_env();
    if let Some(endpoint) = args.next() {
        config = config.with_endpoint_url(endpoint);
    }

    let hook = StreamHook::builder(KinesisTransport::new(config).unwrap())
        .default_stream(stream.clone())
        .formatter(MozLog::builder().logger("kinesis-test").build())
        .build();

    // Fire once by hand, so that a failure is reported rather than swallowed...
    hook.fire(&RawEvent::new(EventLevel::Info, "kinesis-test starting"))
        .unwrap();

    // then go through `tracing`.
    let subscriber = Registry::default().with(Layer::with_hook(hook));
    let _guard = tracing::subscriber::set_default(subscriber);

    info!("Hello, 世界!");
    warn!(code = 5, "Hello, 世界!");
    error!(stream_name = stream.as_str(), "Hello, 世界!");
}
