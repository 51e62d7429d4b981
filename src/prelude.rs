//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use shadow_version_fs::prelude::*;
//! ```

// Core
pub use crate::core::clock::{Clock, ManualClock, SystemClock};
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, SvfsError};
pub use crate::core::paths::{resolve_full_path, snapshot_path};

// Index
pub use crate::index::record::{BackupRecord, ChainEntry};
pub use crate::index::table::{RecordSummary, VersionTable};

// Retention
pub use crate::retention::engine::{ReclaimReport, RetentionEngine, SweepReport};

// Session
pub use crate::session::{OpenOutcome, VersionSession};

// Logger
pub use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle, spawn_logger};
