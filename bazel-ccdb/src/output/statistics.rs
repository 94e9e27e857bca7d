// SPDX-License-Identifier: GPL-3.0-or-later

//! Statistics collection for the generation pipeline.
//!
//! A shared `Statistics` instance is passed to the database builder and to the
//! output writers during pipeline construction. Each stage updates its own
//! counters as the actions flow through, and the summary is logged when the
//! run completes.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Statistics collected during one run.
///
/// # Fields by stage
///
/// - **DatabaseBuilder**: `actions_received`, `skipped_tool_configuration`,
///   `skipped_internal_source`, `entries_produced`
/// - **ClangOutputWriter**: `entries_written`
#[derive(Debug, Default)]
pub struct Statistics {
    /// Number of actions reported by the query.
    pub actions_received: AtomicUsize,

    /// Number of actions dropped because they were configured for a tool.
    pub skipped_tool_configuration: AtomicUsize,

    /// Number of actions dropped because they compile build system internal sources.
    pub skipped_internal_source: AtomicUsize,

    /// Number of compilation database entries produced by the translation.
    pub entries_produced: AtomicUsize,

    /// Total number of entries written to the final output file.
    pub entries_written: AtomicUsize,
}

impl Statistics {
    /// Creates a new `Statistics` instance wrapped in an `Arc` for sharing.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn increment(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let received = self.actions_received.load(Ordering::Relaxed);
        let tools = self.skipped_tool_configuration.load(Ordering::Relaxed);
        let internal = self.skipped_internal_source.load(Ordering::Relaxed);
        let produced = self.entries_produced.load(Ordering::Relaxed);
        let written = self.entries_written.load(Ordering::Relaxed);

        writeln!(f, "Generation pipeline:")?;
        writeln!(f, "  query actions: {}", received)?;
        writeln!(f, "  filtered actions by tool configuration: {}", tools)?;
        writeln!(f, "  filtered actions by internal source: {}", internal)?;
        writeln!(f, "  current entries: {}", produced)?;
        write!(f, "  total entries written: {}", written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_arc() {
        let stats = Statistics::new();
        assert_eq!(stats.actions_received.load(Ordering::Relaxed), 0);
        assert_eq!(stats.entries_written.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_display_format() {
        let stats = Statistics::new();
        stats.actions_received.store(20, Ordering::Relaxed);
        stats.skipped_tool_configuration.store(5, Ordering::Relaxed);
        stats.skipped_internal_source.store(2, Ordering::Relaxed);
        stats.entries_produced.store(13, Ordering::Relaxed);
        stats.entries_written.store(13, Ordering::Relaxed);

        let output = format!("{}", stats);
        assert!(output.contains("Generation pipeline:"));
        assert!(output.contains("query actions: 20"));
        assert!(output.contains("filtered actions by tool configuration: 5"));
        assert!(output.contains("filtered actions by internal source: 2"));
        assert!(output.contains("current entries: 13"));
        assert!(output.contains("total entries written: 13"));
    }

    #[test]
    fn test_increment_from_multiple_references() {
        let stats = Statistics::new();
        let stats_clone = Arc::clone(&stats);

        Statistics::increment(&stats.actions_received);
        Statistics::increment(&stats_clone.actions_received);

        assert_eq!(stats.actions_received.load(Ordering::Relaxed), 2);
    }
}
