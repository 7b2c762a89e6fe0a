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

//! The streaming transport layer.
//!
//! This module defines the [`StreamTransport`] trait that every destination for formatted records
//! must support. With the `kinesis` feature enabled, it also provides [`KinesisTransport`], which
//! puts records on an AWS Kinesis data stream.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(feature = "kinesis")]
//! # fn main() {
//! use tracing_mozlog::transport::{KinesisConfig, KinesisTransport};
//! let transpo = KinesisTransport::new(KinesisConfig::new("us-west-2")).unwrap();
//! # }
//! # #[cfg(not(feature = "kinesis"))]
//! # fn main() {}
//! ```

use crate::error::Result;

#[cfg(feature = "kinesis")]
use crate::error::Error;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations all stream transports must support.
pub trait StreamTransport {
    /// Put one record, `data`, on the stream named `stream_name`.
    ///
    /// This is a single, synchronous put: implementations block until the remote end answers &
    /// report its failure, if any, as [`Error::Transport`](crate::error::Error::Transport).
    /// Retrying is the business of the underlying client, not of this call.
    fn put_record(&self, stream_name: &str, partition_key: &str, data: &[u8]) -> Result<()>;
}

impl<T: StreamTransport + ?Sized> StreamTransport for std::sync::Arc<T> {
    fn put_record(&self, stream_name: &str, partition_key: &str, data: &[u8]) -> Result<()> {
        (**self).put_record(stream_name, partition_key, data)
    }
}

/// Where to find Kinesis.
///
/// Credentials are taken from the standard AWS provider chain (environment, profile, instance
/// metadata & so forth).
#[cfg(feature = "kinesis")]
#[derive(Clone, Debug, Default)]
pub struct KinesisConfig {
    /// AWS region (e.g., "us-east-1"); `None` means "whatever the environment says"
    pub region: Option<String>,
    /// Custom endpoint, for localstack & the like
    pub endpoint_url: Option<String>,
}

#[cfg(feature = "kinesis")]
impl KinesisConfig {
    pub fn new(region: impl Into<String>) -> Self {
        KinesisConfig {
            region: Some(region.into()),
            endpoint_url: None,
        }
    }
    pub fn from_env() -> Self {
        KinesisConfig::default()
    }
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }
}

/// Putting records on an AWS Kinesis data stream.
///
/// The SDK is asynchronous while [`StreamTransport`] is not, so each instance owns a small
/// current-thread runtime on which puts are driven to completion. A thread that is already
/// running a tokio runtime may not block on another one; puts made from such a thread (an event
/// emitted inside an async task, say) are driven from a short-lived helper thread instead.
#[cfg(feature = "kinesis")]
pub struct KinesisTransport {
    client: aws_sdk_kinesis::Client,
    // Only ever `None` while being dropped
    runtime: Option<tokio::runtime::Runtime>,
}

/// Run `fut` to completion on `runtime`, stepping off the current thread if it is itself inside a
/// tokio runtime.
#[cfg(feature = "kinesis")]
fn drive<F>(runtime: &tokio::runtime::Runtime, fut: F) -> Result<F::Output>
where
    F: std::future::Future + Send,
    F::Output: Send,
{
    if tokio::runtime::Handle::try_current().is_err() {
        return Ok(runtime.block_on(fut));
    }
    std::thread::scope(|scope| scope.spawn(|| runtime.block_on(fut)).join())
        .map_err(|_| Error::transport("Kinesis request panicked on its helper thread"))
}

#[cfg(feature = "kinesis")]
impl KinesisTransport {
    /// Construct a [`StreamTransport`] implementation talking to Kinesis as configured by `config`
    pub fn new(config: KinesisConfig) -> Result<KinesisTransport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::transport)?;

        let loaded = drive(&runtime, async {
            let mut loader = aws_config::from_env();
            if let Some(region) = &config.region {
                loader = loader.region(aws_config::Region::new(region.clone()));
            }
            let sdk_config = loader.load().await;

            let mut kinesis_config = aws_sdk_kinesis::config::Builder::from(&sdk_config);
            if let Some(endpoint_url) = &config.endpoint_url {
                kinesis_config = kinesis_config.endpoint_url(endpoint_url);
            }
            aws_sdk_kinesis::Client::from_conf(kinesis_config.build())
        });
        let client = match loaded {
            Ok(client) => client,
            Err(err) => {
                runtime.shutdown_background();
                return Err(err);
            }
        };

        tracing::debug!(
            region = config.region.as_deref().unwrap_or("<from environment>"),
            endpoint = config.endpoint_url.as_deref().unwrap_or("<default>"),
            "Kinesis client configured"
        );

        Ok(KinesisTransport {
            client,
            runtime: Some(runtime),
        })
    }
}

#[cfg(feature = "kinesis")]
impl std::ops::Drop for KinesisTransport {
    fn drop(&mut self) {
        // Dropping a runtime blocks, which tokio forbids from within another runtime
        if let Some(runtime) = self.runtime.take() {
            if tokio::runtime::Handle::try_current().is_ok() {
                runtime.shutdown_background();
            }
        }
    }
}

#[cfg(feature = "kinesis")]
impl StreamTransport for KinesisTransport {
    fn put_record(&self, stream_name: &str, partition_key: &str, data: &[u8]) -> Result<()> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| Error::transport("Kinesis transport has been shut down"))?;
        drive(
            runtime,
            self.client
                .put_record()
                .stream_name(stream_name)
                .partition_key(partition_key)
                .data(aws_sdk_kinesis::primitives::Blob::new(data))
                .send(),
        )?
        .map_err(Error::transport)?;
        Ok(())
    }
}
