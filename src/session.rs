//! Mount-session context: the write-intercept trigger, the shared index,
//! and the retention clock behind one mutex.
//!
//! The hosting filesystem framework is free-threaded; every entry point
//! here may be called concurrently. All index reads and writes, record
//! mutation, chain mutation, and the sweep gate go through a single
//! coarse mutex — acceptable at filesystem-open call rates, and it makes
//! the gate check-and-update atomic for free.
//!
//! Versioning fails open: `on_write_open` reports what happened but never
//! errors, so the caller can always forward the underlying open.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::{Config, SnapshotConfig};
use crate::core::paths::snapshot_path;
use crate::index::table::{RecordSummary, VersionTable};
use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle};
use crate::retention::engine::{ReclaimReport, RetentionEngine};
use crate::snapshot::copy::copy_snapshot;
use crate::snapshot::flags::is_write_intent;

/// What a single `on_write_open` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A snapshot was taken and appended to the chain.
    Snapshotted {
        /// Where the copy landed.
        snapshot_path: PathBuf,
        /// Write count after this open.
        write_count: u64,
        /// Bytes streamed into the snapshot.
        bytes: u64,
    },
    /// The flags carried no write intent; nothing was touched.
    ReadOnly,
    /// First write to a path with no on-disk content yet; the record was
    /// created (or its counter bumped) but there was nothing to copy.
    NewFile {
        /// Write count after this open.
        write_count: u64,
    },
    /// The copy failed; the open proceeds, the chain has no entry, and the
    /// write count keeps the burned number.
    CopyFailed {
        /// Write count after this open.
        write_count: u64,
    },
}

impl OpenOutcome {
    /// Whether a snapshot was actually retained.
    #[must_use]
    pub const fn snapshotted(&self) -> bool {
        matches!(self, Self::Snapshotted { .. })
    }
}

struct SessionState {
    table: VersionTable,
    last_sweep: u64,
}

/// One mount's worth of versioning state.
pub struct VersionSession {
    state: Mutex<SessionState>,
    engine: RetentionEngine,
    snapshot: SnapshotConfig,
    clock: Arc<dyn Clock>,
    logger: Option<ActivityLoggerHandle>,
}

impl VersionSession {
    /// Construct the session: empty index, retention clock set to now.
    ///
    /// Called once at mount time.
    #[must_use]
    pub fn new(
        config: &Config,
        clock: Arc<dyn Clock>,
        logger: Option<ActivityLoggerHandle>,
    ) -> Self {
        let last_sweep = clock.now();
        if let Some(handle) = &logger {
            handle.send(ActivityEvent::SessionStarted {
                config_hash: config.stable_hash().unwrap_or_default(),
            });
        }
        Self {
            state: Mutex::new(SessionState {
                table: VersionTable::with_config(&config.index),
                last_sweep,
            }),
            engine: RetentionEngine::new(config.retention.clone(), logger.clone()),
            snapshot: config.snapshot.clone(),
            clock,
            logger,
        }
    }

    /// Default config, wall clock, no logger. Convenience for embedders.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(&Config::default(), Arc::new(SystemClock), None)
    }

    /// The write-intercept trigger.
    ///
    /// `path` is the canonical (mount-relative) path used as the index key;
    /// `absolute` is its resolved on-disk location. Invoked by the open
    /// handler before forwarding; read-only flag words are a no-op. The
    /// caller forwards the underlying open whatever the outcome.
    pub fn on_write_open(&self, path: &str, absolute: &Path, flags: i32) -> OpenOutcome {
        if !is_write_intent(flags) {
            return OpenOutcome::ReadOnly;
        }

        let now = self.clock.now();
        let started = Instant::now();
        let mut guard = self.state.lock();
        let SessionState { table, last_sweep } = &mut *guard;

        let record = table.record_for(path);
        let count = record.bump_write_count();
        let dest = snapshot_path(absolute, count, &self.snapshot.suffix);

        let outcome = if absolute.exists() {
            match copy_snapshot(
                absolute,
                &dest,
                self.snapshot.copy_chunk_bytes,
                self.snapshot.preserve_permissions,
            ) {
                Ok(copy) => {
                    record.append_snapshot(dest.clone(), now);
                    self.log(ActivityEvent::SnapshotCreated {
                        path: path.to_string(),
                        snapshot: dest.display().to_string(),
                        write_count: count,
                        bytes: copy.bytes_copied,
                        duration_ms: u64::try_from(started.elapsed().as_millis())
                            .unwrap_or(u64::MAX),
                    });
                    OpenOutcome::Snapshotted {
                        snapshot_path: dest,
                        write_count: count,
                        bytes: copy.bytes_copied,
                    }
                }
                Err(e) => {
                    self.log(ActivityEvent::SnapshotFailed {
                        path: path.to_string(),
                        error_code: e.code().to_string(),
                        error_message: e.to_string(),
                    });
                    OpenOutcome::CopyFailed { write_count: count }
                }
            }
        } else {
            self.log(ActivityEvent::SnapshotSkipped {
                path: path.to_string(),
                reason: "no on-disk content yet".to_string(),
            });
            OpenOutcome::NewFile { write_count: count }
        };

        // Gated internally; cheap when no sweep is due. Runs regardless of
        // the copy outcome so a missed sweep is recovered by any write.
        self.engine.sweep(table, last_sweep, now);

        outcome
    }

    /// Full reclaim: delete every retained snapshot regardless of age.
    ///
    /// Called once at unmount, before teardown proceeds. Idempotent — the
    /// chains are empty afterwards, so a second call finds nothing.
    pub fn shutdown(&self) -> ReclaimReport {
        let mut guard = self.state.lock();
        let report = self.engine.reclaim_all(&mut guard.table);
        self.log(ActivityEvent::SessionStopped {
            tracked_paths: guard.table.len(),
            snapshots_reclaimed: report.entries_removed,
        });
        report
    }

    /// Number of paths with a backup record this session.
    #[must_use]
    pub fn tracked_paths(&self) -> usize {
        self.state.lock().table.len()
    }

    /// Write count for `path`, if it is tracked.
    #[must_use]
    pub fn write_count(&self, path: &str) -> Option<u64> {
        self.state
            .lock()
            .table
            .lookup_by_path(path)
            .map(crate::index::record::BackupRecord::write_count)
    }

    /// Live snapshot count for `path`, if it is tracked.
    #[must_use]
    pub fn version_count(&self, path: &str) -> Option<usize> {
        self.state
            .lock()
            .table
            .lookup_by_path(path)
            .map(crate::index::record::BackupRecord::version_count)
    }

    /// Snapshot locations for `path`, oldest first, if it is tracked.
    #[must_use]
    pub fn snapshot_locations(&self, path: &str) -> Option<Vec<PathBuf>> {
        self.state.lock().table.lookup_by_path(path).map(|r| {
            r.chain()
                .iter()
                .map(|entry| entry.snapshot_path.clone())
                .collect()
        })
    }

    /// Per-record diagnostic summary.
    #[must_use]
    pub fn summarize(&self) -> Vec<RecordSummary> {
        self.state.lock().table.summarize()
    }

    fn log(&self, event: ActivityEvent) {
        if let Some(logger) = &self.logger {
            logger.send(event);
        }
    }
}
