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

//! Write mozlog records to stdout, then read them back & check them.

use tracing::{debug, error, info, trace, warn};
use tracing_mozlog::{formatter::MozLog, hook::WriterHook, layer::Layer};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Tee(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for Tee {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stdout().write_all(buf)?;
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}

pub fn main() {
    let tee = Tee::default();
    let formatter = MozLog::builder().logger("stdout-test").build();
    // Setup the real subsriber...
    let subscriber =
        Registry::default().with(Layer::with_hook(WriterHook::new(formatter, tee.clone())));
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("Hello, 世界!");
    debug!("Hello, 世界!");
    info!(msg = "shadowed", "Hello, 世界!");
    warn!(code = 5, "Hello, 世界!");
    error!(ratio = 0.25, "Hello, 世界!");

    let buf = tee.0.lock().unwrap();
    let severities: Vec<Option<u64>> = std::str::from_utf8(&buf)
        .unwrap()
        .lines()
        .map(|line| {
            let rec: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(rec["fields"]["msg"], "Hello, 世界!");
            assert_eq!(rec["logger"], "stdout-test");
            rec.get("severity").and_then(|s| s.as_u64())
        })
        .collect();
    assert_eq!(severities, vec![None, Some(7), Some(6), Some(4), Some(3)]);
}
