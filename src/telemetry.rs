//! Application telemetry events and sinks.
//!
//! Shiplog already logs through `tracing`; telemetry is the small set of
//! structured operational signals worth capturing as machine-readable
//! events, such as the active database schema version and cache backend
//! outages.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by shiplog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Records the current database schema version after migrations apply.
    SchemaVersionRecorded {
        /// Diesel migration version string (e.g. `20260715000000`).
        schema_version: String,
    },

    /// Records a cache backend failure that was degraded to a miss.
    CacheBackendUnavailable {
        /// The cache operation that failed (`read` or `write`).
        operation: String,
        /// Error detail from the cache backend.
        detail: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
///
/// This is intended for local debugging and is not transmitted anywhere.
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    //! Telemetry test doubles shared by unit and integration tests.

    use std::sync::Mutex;

    use super::{TelemetryEvent, TelemetrySink};

    /// Sink that stores events in memory for later assertions.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingSink {
        /// Drains and returns all recorded events.
        ///
        /// # Panics
        ///
        /// Panics when the internal mutex is poisoned.
        pub fn take(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .expect("events mutex should be available")
                .drain(..)
                .collect()
        }
    }

    impl TelemetrySink for RecordingSink {
        fn record(&self, event: TelemetryEvent) {
            self.events
                .lock()
                .expect("events mutex should be available")
                .push(event);
        }
    }
}
