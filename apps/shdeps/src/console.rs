//! Terminal log sink

use shdeps_events::LogSink;
use shdeps_types::Severity;
use std::io::Write;

/// Prints `debug` lines to stdout and `warn`/`fatal` lines to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, severity: Severity, line: &str) {
        // a closed pipe must not abort the build
        let _ = match severity {
            Severity::Debug => writeln!(std::io::stdout().lock(), "{line}"),
            Severity::Warn | Severity::Fatal => writeln!(std::io::stderr().lock(), "{line}"),
        };
    }
}
