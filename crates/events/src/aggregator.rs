//! Threshold-filtered rendering of build events
//!
//! The aggregator is the single consumer of unit event streams. `debug`
//! lines print only at threshold `debug`, `warn` lines print below
//! threshold `fatal`, and a `fatal` line always prints and ends the run.

use std::sync::{Arc, Mutex};

use shdeps_errors::Error;
use shdeps_types::Severity;

use crate::{EventMessage, EventReceiver};

/// Destination for rendered log lines
pub trait LogSink: Send + Sync {
    fn write(&self, severity: Severity, line: &str);
}

/// Sink that records lines in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines in write order
    #[must_use]
    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Recorded messages without severities
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, line)| line).collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, severity: Severity, line: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push((severity, line.to_string()));
        }
    }
}

/// Renders events in arrival order against a verbosity threshold
pub struct LogAggregator {
    threshold: Severity,
    sink: Arc<dyn LogSink>,
}

impl LogAggregator {
    #[must_use]
    pub fn new(threshold: Severity, sink: Arc<dyn LogSink>) -> Self {
        Self { threshold, sink }
    }

    #[must_use]
    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    /// Render one event.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fatal` carrying the message when the event is fatal.
    pub fn dispatch(&mut self, message: &EventMessage) -> Result<(), Error> {
        let line = message.event.message();
        trace_event(message, &line);

        let threshold = self.threshold.rank();
        match message.meta.level {
            Severity::Debug => {
                if threshold < 1 {
                    self.sink.write(Severity::Debug, &line);
                }
                Ok(())
            }
            Severity::Warn => {
                if threshold < 2 {
                    self.sink.write(Severity::Warn, &line);
                }
                Ok(())
            }
            Severity::Fatal => {
                self.sink.write(Severity::Fatal, &line);
                Err(Error::fatal(line))
            }
        }
    }

    /// Dispatch every event from `rx` until all of its senders are dropped.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first fatal event.
    pub async fn drain(&mut self, rx: &mut EventReceiver) -> Result<(), Error> {
        while let Some(message) = rx.recv().await {
            self.dispatch(&message)?;
        }
        Ok(())
    }
}

fn trace_event(message: &EventMessage, line: &str) {
    let source = message.meta.source.as_str();
    let correlation = message.meta.correlation_id.as_deref().unwrap_or("-");
    match message.meta.level {
        Severity::Debug => {
            tracing::debug!(target: "shdeps::events", source, correlation, "{line}");
        }
        Severity::Warn => {
            tracing::warn!(target: "shdeps::events", source, correlation, "{line}");
        }
        Severity::Fatal => {
            tracing::error!(target: "shdeps::events", source, correlation, "{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{channel, EventEmitter, PackageEvent, VersionEvent};

    fn extracted(path: &str) -> VersionEvent {
        VersionEvent::FileExtracted {
            name: "react".into(),
            version: "17.0.1".into(),
            path: path.into(),
        }
    }

    #[tokio::test]
    async fn test_debug_threshold_prints_everything_up_to_fatal() {
        let sink = MemorySink::new();
        let mut aggregator = LogAggregator::new(Severity::Debug, Arc::new(sink.clone()));
        let (tx, mut rx) = channel();

        tx.emit_package(PackageEvent::Started {
            name: "react".into(),
        });
        tx.emit_version(extracted("package.json"));
        drop(tx);

        aggregator.drain(&mut rx).await.unwrap();
        assert_eq!(sink.messages(), vec!["--> react", "------> package.json"]);
    }

    #[tokio::test]
    async fn test_warn_threshold_hides_debug() {
        let sink = MemorySink::new();
        let mut aggregator = LogAggregator::new(Severity::Warn, Arc::new(sink.clone()));
        let (tx, mut rx) = channel();

        tx.emit_version(extracted("umd/react.js"));
        tx.emit_version(VersionEvent::Downloading {
            name: "react".into(),
            version: "17.0.1".into(),
        });
        drop(tx);

        aggregator.drain(&mut rx).await.unwrap();
        assert_eq!(
            sink.messages(),
            vec!["----> Downloading and extracting react@17.0.1"]
        );
    }

    #[tokio::test]
    async fn test_fatal_always_prints_and_stops_draining() {
        let sink = MemorySink::new();
        let mut aggregator = LogAggregator::new(Severity::Fatal, Arc::new(sink.clone()));
        let (tx, mut rx) = channel();

        tx.emit_package(PackageEvent::Started {
            name: "left-pad".into(),
        });
        tx.emit_package(PackageEvent::NoMatchingVersions {
            name: "left-pad".into(),
        });
        tx.emit_package(PackageEvent::Started {
            name: "never-shown".into(),
        });
        drop(tx);

        let err = aggregator.drain(&mut rx).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "----> No matching versions");
        assert_eq!(
            sink.lines(),
            vec![(Severity::Fatal, "----> No matching versions".to_string())]
        );
    }
}
