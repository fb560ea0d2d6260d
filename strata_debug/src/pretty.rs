// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::trace::{
    BoundsPassEvent, PlanEvent, ResidencyEvent, TraceSink, TransformPassEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_transform_pass(&mut self, e: &TransformPassEvent) {
        let _ = writeln!(
            self.writer,
            "[transform] visited={} recomputed={}",
            e.visited, e.recomputed,
        );
    }

    fn on_bounds_pass(&mut self, e: &BoundsPassEvent) {
        let _ = writeln!(
            self.writer,
            "[bounds] visited={} empty={}",
            e.visited, e.empty,
        );
    }

    fn on_plan(&mut self, e: &PlanEvent) {
        let _ = writeln!(self.writer, "[plan] items={}", e.items);
    }

    fn on_residency(&mut self, e: &ResidencyEvent) {
        let _ = writeln!(
            self.writer,
            "[residency] textures={} uploads={}",
            e.textures, e.uploads,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_transform_pass() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_transform_pass(&TransformPassEvent {
            visited: 4,
            recomputed: 2,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[transform]"), "got: {output}");
        assert!(output.contains("visited=4"), "got: {output}");
        assert!(output.contains("recomputed=2"), "got: {output}");
    }

    #[test]
    fn pretty_print_residency() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_residency(&ResidencyEvent {
            textures: 3,
            uploads: 1,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[residency] textures=3 uploads=1"), "got: {output}");
    }
}
