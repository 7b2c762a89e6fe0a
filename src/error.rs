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
//! [tracing-mozlog](crate) errors

use backtrace::Backtrace;

type StdError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// [tracing-mozlog](crate) error type
///
/// A plain enumeration rather than something built with [thiserror] or [anyhow]; the match arms
/// are chosen on the basis of what the caller will need to do in response. Every variant captures
/// a [`Backtrace`] at the point of failure, which is printed by the [`Debug`](std::fmt::Debug)
/// implementation.
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
#[non_exhaustive]
pub enum Error {
    /// A field could not be represented in JSON (a NaN, say); the record is dropped
    Serialization {
        source: serde_json::Error,
        back: Backtrace,
    },
    /// The streaming transport refused or failed the put
    Transport { source: StdError, back: Backtrace },
    /// Failed to write a formatted record
    Io {
        source: std::io::Error,
        back: Backtrace,
    },
    /// The secondary formatter of a [`ChainedFormatter`](crate::chained::ChainedFormatter) failed
    Chained { source: StdError, back: Backtrace },
    /// A `tracing` Event had no message field
    NoMessageField {
        name: &'static str,
        back: Backtrace,
    },
    /// Failed to install the global default subscriber
    Install { source: StdError, back: Backtrace },
}

impl Error {
    pub fn serialization(source: serde_json::Error) -> Error {
        Error::Serialization {
            source,
            back: Backtrace::new(),
        }
    }
    pub fn transport<E>(source: E) -> Error
    where
        E: Into<StdError>,
    {
        Error::Transport {
            source: source.into(),
            back: Backtrace::new(),
        }
    }
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Serialization { source, .. } => {
                write!(f, "Failed to serialize the log record to JSON: {}", source)
            }
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            Error::Io { source, .. } => write!(f, "While writing a log record, got {}", source),
            Error::Chained { source, .. } => {
                write!(f, "The chained formatter failed with {}", source)
            }
            Error::NoMessageField { name, .. } => write!(
                f,
                "Event '{}' had no message field, and so was not formatted",
                name
            ),
            Error::Install { source, .. } => {
                write!(f, "Failed to install the mozlog subscriber: {}", source)
            }
            _ => write!(f, "Other tracing-mozlog error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Serialization { source: _, back } => write!(f, "{}\n{:#?}", self, back),
            Error::Transport { source: _, back } => write!(f, "{}\n{:#?}", self, back),
            Error::Io { source: _, back } => write!(f, "{}\n{:#?}", self, back),
            Error::Chained { source: _, back } => write!(f, "{}\n{:#?}", self, back),
            Error::NoMessageField { name: _, back } => write!(f, "{}\n{:#?}", self, back),
            Error::Install { source: _, back } => write!(f, "{}\n{:#?}", self, back),
            err => write!(f, "tracing-mozlog error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    #[allow(unreachable_patterns)]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Serialization { source, .. } => Some(source),
            Error::Io { source, .. } => Some(source),
            Error::Transport { source, .. }
            | Error::Chained { source, .. }
            | Error::Install { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl std::convert::From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            source: err,
            back: Backtrace::new(),
        }
    }
}

impl std::convert::From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
