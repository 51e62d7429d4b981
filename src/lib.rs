#![forbid(unsafe_code)]

//! shadow_version_fs (svfs) — versioning core for a passthrough filesystem.
//!
//! Every file opened with write intent gets a snapshot of its current
//! content *before* the write lands, retained for a bounded time window and
//! reclaimed automatically. Three moving parts:
//! 1. **Ordered index** — key-sorted table mapping hashed paths to per-path
//!    version chains
//! 2. **Write-intercept trigger** — snapshot-on-write at the open call site
//! 3. **Retention engine** — inline, time-gated sweeps plus full reclaim at
//!    unmount
//!
//! The passthrough forwarding operations themselves live in the hosting
//! filesystem framework; this crate owns only the versioning layer behind
//! them.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use shadow_version_fs::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use shadow_version_fs::core::config::Config;
//! use shadow_version_fs::session::VersionSession;
//! ```

pub mod prelude;

pub mod core;
pub mod index;
pub mod logger;
pub mod retention;
pub mod session;
pub mod snapshot;
