//! Injected logging capability: events over a bounded channel to a
//! dedicated writer thread.
//!
//! The versioning core holds an [`ActivityLoggerHandle`] and performs no
//! log I/O itself. `send()` uses `try_send()` so the write-intercept path
//! is never blocked by logging back-pressure; a full channel drops the
//! event and bumps a counter.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::core::errors::{Result, SvfsError};
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

/// Default bounded channel capacity for log events.
const CHANNEL_CAPACITY: usize = 1024;

/// Events emitted by the versioning layer.
#[derive(Debug, Clone)]
pub enum ActivityEvent {
    SessionStarted {
        config_hash: String,
    },
    SessionStopped {
        tracked_paths: usize,
        snapshots_reclaimed: u64,
    },
    SnapshotCreated {
        path: String,
        snapshot: String,
        write_count: u64,
        bytes: u64,
        duration_ms: u64,
    },
    SnapshotSkipped {
        path: String,
        reason: String,
    },
    SnapshotFailed {
        path: String,
        error_code: String,
        error_message: String,
    },
    SweepCompleted {
        records_visited: u64,
        entries_removed: u64,
        delete_failures: u64,
        duration_ms: u64,
    },
    ReclaimCompleted {
        entries_removed: u64,
        delete_failures: u64,
    },
    Error {
        code: String,
        message: String,
    },
    /// Sentinel to request graceful shutdown of the logger thread.
    Shutdown,
}

/// Thread-safe, cheaply-cloneable handle for sending log events.
#[derive(Clone)]
pub struct ActivityLoggerHandle {
    tx: Sender<ActivityEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl ActivityLoggerHandle {
    /// Send an event to the logger thread. Non-blocking.
    ///
    /// If the channel is full the event is dropped and the dropped-events
    /// counter is incremented. Disconnected is fine during shutdown.
    pub fn send(&self, event: ActivityEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of events dropped due to channel back-pressure.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Request graceful shutdown of the logger thread.
    pub fn shutdown(&self) {
        let _ = self.tx.send(ActivityEvent::Shutdown);
    }
}

/// Spawn the logger thread; returns the handle and the join handle.
///
/// The caller joins after `shutdown()` to guarantee the log is flushed
/// before teardown proceeds.
pub fn spawn_logger(
    config: JsonlConfig,
) -> Result<(ActivityLoggerHandle, thread::JoinHandle<()>)> {
    let (tx, rx) = bounded::<ActivityEvent>(CHANNEL_CAPACITY);
    let handle = ActivityLoggerHandle {
        tx,
        dropped_events: Arc::new(AtomicU64::new(0)),
    };

    let join = thread::Builder::new()
        .name("svfs-logger".to_string())
        .spawn(move || logger_loop(&rx, JsonlWriter::open(config)))
        .map_err(|_| SvfsError::Runtime {
            details: "failed to spawn logger thread".to_string(),
        })?;

    Ok((handle, join))
}

fn logger_loop(rx: &Receiver<ActivityEvent>, mut writer: JsonlWriter) {
    while let Ok(event) = rx.recv() {
        if matches!(event, ActivityEvent::Shutdown) {
            break;
        }
        writer.write_entry(&entry_for(&event));
    }
    writer.flush();
    writer.fsync();
}

fn entry_for(event: &ActivityEvent) -> LogEntry {
    match event {
        ActivityEvent::SessionStarted { config_hash } => {
            let mut e = LogEntry::new(EventType::SessionStart, Severity::Info);
            e.details = Some(format!("config_hash={config_hash}"));
            e
        }
        ActivityEvent::SessionStopped {
            tracked_paths,
            snapshots_reclaimed,
        } => {
            let mut e = LogEntry::new(EventType::SessionStop, Severity::Info);
            e.removed = Some(*snapshots_reclaimed);
            e.details = Some(format!("tracked_paths={tracked_paths}"));
            e
        }
        ActivityEvent::SnapshotCreated {
            path,
            snapshot,
            write_count,
            bytes,
            duration_ms,
        } => {
            let mut e = LogEntry::new(EventType::SnapshotCreate, Severity::Info);
            e.path = Some(path.clone());
            e.snapshot = Some(snapshot.clone());
            e.write_count = Some(*write_count);
            e.bytes = Some(*bytes);
            e.duration_ms = Some(*duration_ms);
            e
        }
        ActivityEvent::SnapshotSkipped { path, reason } => {
            let mut e = LogEntry::new(EventType::SnapshotSkip, Severity::Info);
            e.path = Some(path.clone());
            e.details = Some(reason.clone());
            e
        }
        ActivityEvent::SnapshotFailed {
            path,
            error_code,
            error_message,
        } => {
            let mut e = LogEntry::new(EventType::SnapshotFail, Severity::Warning);
            e.path = Some(path.clone());
            e.error_code = Some(error_code.clone());
            e.error_message = Some(error_message.clone());
            e
        }
        ActivityEvent::SweepCompleted {
            records_visited,
            entries_removed,
            delete_failures,
            duration_ms,
        } => {
            let mut e = LogEntry::new(EventType::SweepComplete, Severity::Info);
            e.removed = Some(*entries_removed);
            e.delete_failures = Some(*delete_failures);
            e.duration_ms = Some(*duration_ms);
            e.details = Some(format!("records_visited={records_visited}"));
            e
        }
        ActivityEvent::ReclaimCompleted {
            entries_removed,
            delete_failures,
        } => {
            let mut e = LogEntry::new(EventType::ReclaimComplete, Severity::Info);
            e.removed = Some(*entries_removed);
            e.delete_failures = Some(*delete_failures);
            e
        }
        ActivityEvent::Error { code, message } => {
            let mut e = LogEntry::new(EventType::Error, Severity::Critical);
            e.error_code = Some(code.clone());
            e.error_message = Some(message.clone());
            e
        }
        ActivityEvent::Shutdown => LogEntry::new(EventType::SessionStop, Severity::Info),
    }
}
