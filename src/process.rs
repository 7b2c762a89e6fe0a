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
//! Process-wide identity: hostname & process ID.
//!
//! Both are resolved at most once per process & shared by every envelope built thereafter. Tests
//! (or callers with unusual needs) construct a [`ProcessIdentity`] by hand instead of touching the
//! global.

use once_cell::sync::OnceCell;

/// Hostname used when the OS won't tell us ours
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// The identity of this process as recorded in every envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessIdentity {
    hostname: String,
    pid: u32,
}

static GLOBAL: OnceCell<ProcessIdentity> = OnceCell::new();

impl ProcessIdentity {
    pub fn new(hostname: impl Into<String>, pid: u32) -> ProcessIdentity {
        ProcessIdentity {
            hostname: hostname.into(),
            pid,
        }
    }
    /// The identity of the running process.
    ///
    /// Resolved on first call; concurrent first callers block until the winner has finished, so
    /// every caller observes a fully-initialized value.
    pub fn global() -> &'static ProcessIdentity {
        GLOBAL.get_or_init(ProcessIdentity::resolve)
    }
    /// Ask the OS, right now, who we are.
    ///
    /// Hostname lookup failure is not fatal: we fall back to [`UNKNOWN_HOSTNAME`] and say so on
    /// stderr. Reporting through `tracing` is not an option here since we may well be running
    /// inside the very layer that would receive the report.
    pub fn resolve() -> ProcessIdentity {
        ProcessIdentity::from_lookup(hostname::get(), std::process::id())
    }
    fn from_lookup(lookup: std::io::Result<std::ffi::OsString>, pid: u32) -> ProcessIdentity {
        let hostname = match lookup {
            Ok(hn) => string_from_os_str(hn),
            Err(err) => {
                eprintln!("tracing-mozlog: can't resolve hostname: {}", err);
                UNKNOWN_HOSTNAME.to_owned()
            }
        };
        ProcessIdentity { hostname, pid }
    }
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

/// Produce a [`String`] from an [`OsString`](std::ffi::OsString), replacing anything that isn't
/// UTF-8.
#[cfg(unix)]
fn string_from_os_str(s: std::ffi::OsString) -> String {
    use std::os::unix::ffi::OsStringExt;
    String::from_utf8_lossy(&s.into_vec()).into_owned()
}

#[cfg(not(unix))]
fn string_from_os_str(s: std::ffi::OsString) -> String {
    s.to_string_lossy().into_owned()
}

/// Name this process will log under when the caller doesn't supply one: the file name of the
/// current executable, or "-" if that can't be had.
pub fn default_logger_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|pbuf| pbuf.file_name().map(|s| string_from_os_str(s.to_os_string())))
        .unwrap_or_else(|| "-".to_owned())
}
