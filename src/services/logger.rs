//! Structured diagnostics logger.
//!
//! Implements the `log` facade and fans records out to pluggable sinks:
//! a bounded ring buffer feeding the debug panel, and optionally a
//! channel sink forwarding records to another surface. Nothing here
//! touches the platform's built-in logging functions — code logs through
//! the `log` macros and sinks decide where records land.
//!
//! Verbose records are gated by the debug-mode flag (mirroring the
//! `debugMode` storage key); warnings and errors always reach the sinks.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::UnboundedSender;

/// Default ring-buffer capacity, matching the debug panel's backlog.
pub const RING_BUFFER_CAPACITY: usize = 100;

/// One structured log record.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp_ms: i64,
    pub level: log::Level,
    pub target: String,
    pub message: String,
}

/// A destination for log records. Sinks must tolerate being called from
/// any context and never block.
pub trait LogSink: Send + Sync {
    fn append(&self, record: &LogRecord);
}

/// Bounded in-memory backlog, newest first.
pub struct RingBufferSink {
    capacity: usize,
    entries: Mutex<VecDeque<LogRecord>>,
}

impl RingBufferSink {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        })
    }

    /// Current backlog, newest first.
    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl LogSink for RingBufferSink {
    fn append(&self, record: &LogRecord) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        entries.push_front(record.clone());
        while entries.len() > self.capacity {
            entries.pop_back();
        }
    }
}

/// Forwards records over a channel, e.g. to the overlay surface. Send
/// failures mean the receiving surface is gone; records are dropped.
pub struct ChannelSink {
    tx: UnboundedSender<LogRecord>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<LogRecord>) -> Self {
        Self { tx }
    }
}

impl LogSink for ChannelSink {
    fn append(&self, record: &LogRecord) {
        let _ = self.tx.send(record.clone());
    }
}

/// The `log::Log` implementation. Records always reach stderr; sinks see
/// warnings and errors unconditionally and everything else only while
/// debug mode is on.
pub struct ArchyLogger {
    debug_enabled: Arc<AtomicBool>,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl ArchyLogger {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            debug_enabled: Arc::new(AtomicBool::new(false)),
            sinks,
        }
    }

    /// Shared handle for flipping debug mode at runtime (mirrors the
    /// stored `debugMode` flag when it changes).
    pub fn debug_handle(&self) -> DebugToggle {
        DebugToggle(Arc::clone(&self.debug_enabled))
    }

    /// Installs this logger as the global `log` backend. Errors if a
    /// logger is already installed (e.g. by a second surface in tests).
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        log::set_max_level(log::LevelFilter::Debug);
        log::set_boxed_logger(Box::new(self))
    }

    fn record_from(&self, record: &log::Record) -> LogRecord {
        LogRecord {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as i64,
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        }
    }
}

impl log::Log for ArchyLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());

        let verbose = record.level() > log::Level::Warn;
        if verbose && !self.debug_enabled.load(Ordering::Relaxed) {
            return;
        }
        let structured = self.record_from(record);
        for sink in &self.sinks {
            sink.append(&structured);
        }
    }

    fn flush(&self) {}
}

/// Runtime switch for debug-mode gating.
#[derive(Clone)]
pub struct DebugToggle(Arc<AtomicBool>);

impl DebugToggle {
    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
