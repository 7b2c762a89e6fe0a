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
//! Event levels & their mapping onto syslog severities.
//!
//! The `severity` field of a mozlog envelope is expressed on the syslog scale of RFC [5424]
//! (0, `LOG_EMERG`, through 7, `LOG_DEBUG`). [`EventLevel`] is the (small, fixed) set of levels an
//! incoming event may carry.
//!
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424

type StdResult<T, E> = std::result::Result<T, E>;

/// The level attached to an incoming event, most severe first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventLevel {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Every [`EventLevel`]; hooks that don't filter report this set.
pub const ALL_LEVELS: &[EventLevel] = &[
    EventLevel::Panic,
    EventLevel::Fatal,
    EventLevel::Error,
    EventLevel::Warn,
    EventLevel::Info,
    EventLevel::Debug,
    EventLevel::Trace,
];

impl EventLevel {
    /// Map this level onto the syslog scale.
    ///
    /// Levels with no syslog counterpart (today, just [`EventLevel::Trace`]) map to zero. That is
    /// intentional: zero is the "unset" value of the envelope's `severity` field, which is then
    /// left out of the serialized record altogether.
    pub fn to_syslog_severity(self) -> u8 {
        match self {
            EventLevel::Panic => 1,
            EventLevel::Fatal => 2,
            EventLevel::Error => 3,
            EventLevel::Warn => 4,
            EventLevel::Info => 6,
            EventLevel::Debug => 7,
            _ => 0,
        }
    }
}

/// Free-function spelling of [`EventLevel::to_syslog_severity`]
pub fn to_syslog_severity(level: EventLevel) -> u8 {
    level.to_syslog_severity()
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                EventLevel::Panic => "panic",
                EventLevel::Fatal => "fatal",
                EventLevel::Error => "error",
                EventLevel::Warn => "warning",
                EventLevel::Info => "info",
                EventLevel::Debug => "debug",
                EventLevel::Trace => "trace",
            }
        )
    }
}

impl std::convert::From<&tracing::Level> for EventLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => EventLevel::Error,
            tracing::Level::WARN => EventLevel::Warn,
            tracing::Level::INFO => EventLevel::Info,
            tracing::Level::DEBUG => EventLevel::Debug,
            tracing::Level::TRACE => EventLevel::Trace,
        }
    }
}
