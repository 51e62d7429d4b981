//! Configuration system: TOML file + env var overrides + validated defaults.
//!
//! Every tuning constant the versioning layer uses is surfaced here — the
//! sweep gate, the retention window, the index growth policy, the copy chunk
//! size, and the snapshot suffix. Defaults keep the reference values; none
//! of them is claimed to be "correct".

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SvfsError};

/// Full configuration model for the versioning layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub retention: RetentionConfig,
    pub snapshot: SnapshotConfig,
    pub index: IndexConfig,
    pub paths: PathsConfig,
}

/// Retention window and sweep gating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetentionConfig {
    /// Chain entries at least this old (seconds) are removed by a sweep.
    pub max_snapshot_age_secs: u64,
    /// Sweeps invoked again within this many seconds are skipped.
    pub min_sweep_interval_secs: u64,
}

/// Snapshot copy behavior and on-disk naming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Suffix inserted before the write count, e.g. `.backup` in
    /// `report.csv.backup.3`.
    pub suffix: String,
    /// Copy loop buffer size in bytes.
    pub copy_chunk_bytes: usize,
    /// Whether snapshots keep the source file's permission bits.
    pub preserve_permissions: bool,
}

/// Ordered-index capacity management.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Capacity a fresh index starts with.
    pub initial_capacity: usize,
    /// Added to the capacity before scaling on growth.
    pub growth_increment: usize,
    /// Multiplier applied on growth; result is floored.
    pub growth_factor: f64,
}

/// Filesystem paths used by svfs itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_snapshot_age_secs: 50,
            min_sweep_interval_secs: 10,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            suffix: ".backup".to_string(),
            copy_chunk_bytes: 64 * 1024,
            preserve_permissions: true,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 5,
            growth_increment: 10,
            growth_factor: 1.5,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!("[SVFS-CONFIG] WARNING: HOME not set, falling back to /tmp for paths");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("svfs").join("config.toml");
        let data = home_dir.join(".local").join("share").join("svfs");
        Self {
            config_file: cfg,
            jsonl_log: data.join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from the default
    /// path; defaults are used. An explicit path that is absent is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| SvfsError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(SvfsError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for log correlation.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes and
    /// Rust releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        // retention
        set_env_u64(
            "SVFS_RETENTION_MAX_SNAPSHOT_AGE_SECS",
            &mut self.retention.max_snapshot_age_secs,
        )?;
        set_env_u64(
            "SVFS_RETENTION_MIN_SWEEP_INTERVAL_SECS",
            &mut self.retention.min_sweep_interval_secs,
        )?;

        // snapshot
        if let Some(raw) = env_var("SVFS_SNAPSHOT_SUFFIX") {
            self.snapshot.suffix = raw;
        }
        set_env_usize(
            "SVFS_SNAPSHOT_COPY_CHUNK_BYTES",
            &mut self.snapshot.copy_chunk_bytes,
        )?;
        set_env_bool(
            "SVFS_SNAPSHOT_PRESERVE_PERMISSIONS",
            &mut self.snapshot.preserve_permissions,
        )?;

        // index
        set_env_usize(
            "SVFS_INDEX_INITIAL_CAPACITY",
            &mut self.index.initial_capacity,
        )?;
        set_env_usize(
            "SVFS_INDEX_GROWTH_INCREMENT",
            &mut self.index.growth_increment,
        )?;
        set_env_f64("SVFS_INDEX_GROWTH_FACTOR", &mut self.index.growth_factor)?;

        // paths
        if let Some(raw) = env_var("SVFS_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.retention.max_snapshot_age_secs == 0 {
            return Err(SvfsError::InvalidConfig {
                details: "retention.max_snapshot_age_secs must be > 0".to_string(),
            });
        }

        if self.snapshot.copy_chunk_bytes == 0 {
            return Err(SvfsError::InvalidConfig {
                details: "snapshot.copy_chunk_bytes must be > 0".to_string(),
            });
        }

        let suffix = &self.snapshot.suffix;
        if suffix.is_empty() || !suffix.starts_with('.') || suffix.contains('/') {
            return Err(SvfsError::InvalidConfig {
                details: format!(
                    "snapshot.suffix must be non-empty, start with '.', and contain no '/': {suffix:?}"
                ),
            });
        }

        if self.index.initial_capacity == 0 {
            return Err(SvfsError::InvalidConfig {
                details: "index.initial_capacity must be >= 1".to_string(),
            });
        }

        // Growth must make forward progress for amortized O(1) inserts.
        if self.index.growth_increment == 0 && self.index.growth_factor <= 1.0 {
            return Err(SvfsError::InvalidConfig {
                details: "index growth must increase capacity: increment >= 1 or factor > 1.0"
                    .to_string(),
            });
        }
        if !self.index.growth_factor.is_finite() || self.index.growth_factor < 1.0 {
            return Err(SvfsError::InvalidConfig {
                details: format!(
                    "index.growth_factor must be finite and >= 1.0, got {}",
                    self.index.growth_factor
                ),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn set_env_u64(name: &str, slot: &mut u64) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = raw.parse::<u64>().map_err(|error| SvfsError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}

fn set_env_usize(name: &str, slot: &mut usize) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = raw
            .parse::<usize>()
            .map_err(|error| SvfsError::ConfigParse {
                context: "env",
                details: format!("{name}={raw:?}: {error}"),
            })?;
    }
    Ok(())
}

fn set_env_f64(name: &str, slot: &mut f64) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = raw.parse::<f64>().map_err(|error| SvfsError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}

fn set_env_bool(name: &str, slot: &mut bool) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = raw.parse::<bool>().map_err(|error| SvfsError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}
