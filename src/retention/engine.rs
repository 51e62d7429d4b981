//! Retention engine: interval-gated expiry sweep and shutdown reclaim.
//!
//! Sweeps run inline, opportunistically, from the write-intercept path —
//! there is no background thread. The gate makes the common call cheap:
//! unless the minimum interval has elapsed since the last sweep that
//! actually ran, `sweep` returns immediately.
//!
//! Snapshot file deletion is best-effort throughout: a failed delete (file
//! already gone, permissions) is counted and logged, the chain entry is
//! removed anyway, and processing continues.

#![allow(missing_docs)]

use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::core::config::RetentionConfig;
use crate::index::table::VersionTable;
use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle};

/// Summary of one `sweep` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Whether the sweep passed the interval gate and did work.
    pub ran: bool,
    /// Records visited (all of them, when the sweep ran).
    pub records_visited: u64,
    /// Chain entries removed.
    pub entries_removed: u64,
    /// Snapshot deletions that failed and were skipped.
    pub delete_failures: u64,
}

impl SweepReport {
    const fn skipped() -> Self {
        Self {
            ran: false,
            records_visited: 0,
            entries_removed: 0,
            delete_failures: 0,
        }
    }
}

/// Summary of a `reclaim_all` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Chain entries removed (every live entry).
    pub entries_removed: u64,
    /// Snapshot deletions that failed and were skipped.
    pub delete_failures: u64,
}

/// Expiry and reclaim passes over a [`VersionTable`].
pub struct RetentionEngine {
    config: RetentionConfig,
    logger: Option<ActivityLoggerHandle>,
}

impl RetentionEngine {
    /// Engine with the given policy and optional logger handle.
    #[must_use]
    pub fn new(config: RetentionConfig, logger: Option<ActivityLoggerHandle>) -> Self {
        Self { config, logger }
    }

    /// The policy this engine enforces.
    #[must_use]
    pub fn config(&self) -> &RetentionConfig {
        &self.config
    }

    /// Time-gated expiry pass.
    ///
    /// No-op unless `now - *last_sweep >= min_sweep_interval_secs`. When it
    /// runs it first updates `*last_sweep = now`, then removes every chain
    /// entry aged `max_snapshot_age_secs` or more, deleting its snapshot
    /// file. Survivors keep their relative order. The caller holds the
    /// session lock, so the gate check and update are atomic with respect
    /// to concurrent sweep attempts.
    pub fn sweep(&self, table: &mut VersionTable, last_sweep: &mut u64, now: u64) -> SweepReport {
        if now.saturating_sub(*last_sweep) < self.config.min_sweep_interval_secs {
            return SweepReport::skipped();
        }
        *last_sweep = now;

        let started = Instant::now();
        let mut report = SweepReport {
            ran: true,
            records_visited: 0,
            entries_removed: 0,
            delete_failures: 0,
        };

        let max_age = self.config.max_snapshot_age_secs;
        for record in table.records_mut() {
            report.records_visited += 1;

            let chain = record.chain_mut();
            let mut i = 0;
            while i < chain.len() {
                let age = now.saturating_sub(chain[i].created_at);
                if age >= max_age {
                    let entry = chain.remove(i).unwrap_or_else(|| {
                        unreachable!("index {i} checked against chain length")
                    });
                    if !self.delete_snapshot(&entry.snapshot_path) {
                        report.delete_failures += 1;
                    }
                    report.entries_removed += 1;
                } else {
                    i += 1;
                }
            }
        }

        self.log(ActivityEvent::SweepCompleted {
            records_visited: report.records_visited,
            entries_removed: report.entries_removed,
            delete_failures: report.delete_failures,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
        report
    }

    /// Unconditional reclaim of every retained snapshot, ignoring age.
    ///
    /// Invoked once at unmount. Records survive with empty chains; their
    /// memory goes away when the session is dropped.
    pub fn reclaim_all(&self, table: &mut VersionTable) -> ReclaimReport {
        let mut report = ReclaimReport {
            entries_removed: 0,
            delete_failures: 0,
        };

        for record in table.records_mut() {
            while let Some(entry) = record.chain_mut().pop_front() {
                if !self.delete_snapshot(&entry.snapshot_path) {
                    report.delete_failures += 1;
                }
                report.entries_removed += 1;
            }
        }

        self.log(ActivityEvent::ReclaimCompleted {
            entries_removed: report.entries_removed,
            delete_failures: report.delete_failures,
        });
        report
    }

    /// Delete one snapshot file. Returns false on failure; never retries.
    fn delete_snapshot(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) => {
                self.log(ActivityEvent::Error {
                    code: "SVFS-2002".to_string(),
                    message: format!("snapshot delete failed for {}: {e}", path.display()),
                });
                false
            }
        }
    }

    fn log(&self, event: ActivityEvent) {
        if let Some(logger) = &self.logger {
            logger.send(event);
        }
    }
}
