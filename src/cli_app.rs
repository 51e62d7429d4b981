//! Top-level CLI definition and dispatch.
//!
//! The mount itself is owned by the hosting filesystem framework; this
//! binary covers the operator surface around it: inspecting the effective
//! configuration and purging snapshot files left behind by previous
//! sessions (a new session rebuilds its index from empty, so leftovers are
//! invisible to its sweeps).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use clap::{Args, Parser, Subcommand};
use colored::{Colorize, control};
use serde_json::json;

use shadow_version_fs::core::config::Config;
use shadow_version_fs::core::errors::{Result, SvfsError};
use shadow_version_fs::core::paths::{SnapshotNamePattern, resolve_absolute_path};

/// shadow_version_fs — snapshot-on-write versioning for a passthrough filesystem.
#[derive(Debug, Parser)]
#[command(
    name = "svfs",
    author,
    version,
    about = "svfs - write-triggered file versioning",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print the effective configuration.
    Config(ConfigArgs),
    /// Delete leftover snapshot files from previous sessions.
    Purge(PurgeArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Show built-in defaults instead of the loaded configuration.
    #[arg(long)]
    defaults: bool,
}

#[derive(Debug, Clone, Args)]
struct PurgeArgs {
    /// Directory tree to scan for leftover snapshots.
    root: PathBuf,
    /// List what would be deleted without deleting.
    #[arg(long)]
    dry_run: bool,
    /// Only purge snapshots whose mtime is at least this old.
    #[arg(long, value_name = "SECONDS")]
    older_than_secs: Option<u64>,
    /// Recursion depth limit.
    #[arg(long, default_value_t = 16, value_name = "DEPTH")]
    max_depth: usize,
}

/// Entry point called from `main`.
pub fn run(cli: &Cli) -> Result<()> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Config(args) => run_config(cli, args),
        Command::Purge(args) => run_purge(cli, args),
    }
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let cfg = if args.defaults {
        Config::default()
    } else {
        Config::load(cli.config.as_deref())?
    };

    if cli.json {
        let value = serde_json::to_value(&cfg)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let raw = toml::to_string_pretty(&cfg).map_err(|e| SvfsError::ConfigParse {
            context: "toml",
            details: e.to_string(),
        })?;
        print!("{raw}");
    }
    Ok(())
}

// ──────────────────── purge ────────────────────

#[derive(Debug, Default)]
struct PurgeReport {
    files_deleted: u64,
    files_failed: u64,
    files_skipped_young: u64,
    bytes_freed: u64,
}

fn run_purge(cli: &Cli, args: &PurgeArgs) -> Result<()> {
    let cfg = Config::load(cli.config.as_deref())?;
    let pattern = SnapshotNamePattern::new(&cfg.snapshot.suffix);
    let root = resolve_absolute_path(&args.root);

    if !root.is_dir() {
        return Err(SvfsError::InvalidConfig {
            details: format!("purge root is not a directory: {}", root.display()),
        });
    }

    let mut candidates = Vec::new();
    collect_snapshots(&root, &pattern, args.max_depth, &mut candidates);

    let now = SystemTime::now();
    let mut report = PurgeReport::default();
    for path in &candidates {
        if let Some(min_age) = args.older_than_secs
            && !is_older_than(path, now, min_age)
        {
            report.files_skipped_young += 1;
            continue;
        }

        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if args.dry_run {
            report.files_deleted += 1;
            report.bytes_freed += size;
            if !cli.json {
                println!("{} {}", "would delete".yellow(), path.display());
            }
            continue;
        }

        match fs::remove_file(path) {
            Ok(()) => {
                report.files_deleted += 1;
                report.bytes_freed += size;
                if !cli.json {
                    println!("{} {}", "deleted".green(), path.display());
                }
            }
            Err(e) => {
                report.files_failed += 1;
                if !cli.json {
                    eprintln!("{} {}: {e}", "failed".red(), path.display());
                }
            }
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "root": root.display().to_string(),
                "dry_run": args.dry_run,
                "files_deleted": report.files_deleted,
                "files_failed": report.files_failed,
                "files_skipped_young": report.files_skipped_young,
                "bytes_freed": report.bytes_freed,
            }))?
        );
    } else {
        let verb = if args.dry_run {
            "would delete"
        } else {
            "deleted"
        };
        println!(
            "{verb} {} snapshot file(s), {} byte(s); {} failed, {} skipped (too young)",
            report.files_deleted,
            report.bytes_freed,
            report.files_failed,
            report.files_skipped_young
        );
    }

    Ok(())
}

/// Recursively collect snapshot-named regular files under `dir`.
///
/// Symlinks are never followed; unreadable directories are skipped.
fn collect_snapshots(
    dir: &Path,
    pattern: &SnapshotNamePattern,
    depth_left: usize,
    out: &mut Vec<PathBuf>,
) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = fs::symlink_metadata(&path) else {
            continue;
        };
        if meta.file_type().is_symlink() {
            continue;
        }
        if meta.is_dir() {
            if depth_left > 0 {
                collect_snapshots(&path, pattern, depth_left - 1, out);
            }
        } else if meta.is_file() && pattern.matches(&path) {
            out.push(path);
        }
    }
}

fn is_older_than(path: &Path, now: SystemTime, min_age_secs: u64) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    let Ok(mtime) = meta.modified() else {
        return false;
    };
    now.duration_since(mtime)
        .map(|age| age.as_secs() >= min_age_secs)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_finds_snapshots_and_skips_depth_overflow() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();
        fs::write(dir.path().join("a.txt.backup.1"), b"x").unwrap();
        let nested = dir.path().join("deep");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("b.backup.2"), b"y").unwrap();

        let pattern = SnapshotNamePattern::new(".backup");

        let mut found = Vec::new();
        collect_snapshots(dir.path(), &pattern, 16, &mut found);
        found.sort();
        assert_eq!(
            found,
            vec![dir.path().join("a.txt.backup.1"), nested.join("b.backup.2")]
        );

        // Depth 0 stays at the top level.
        let mut shallow = Vec::new();
        collect_snapshots(dir.path(), &pattern, 0, &mut shallow);
        assert_eq!(shallow, vec![dir.path().join("a.txt.backup.1")]);
    }

    #[test]
    fn age_filter_uses_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = dir.path().join("f.backup.1");
        fs::write(&fresh, b"x").unwrap();

        // Nudge "now" forward so coarse filesystem timestamps cannot make
        // the age computation come out negative.
        let now = SystemTime::now() + std::time::Duration::from_secs(2);
        assert!(!is_older_than(&fresh, now, 3_600));
        assert!(is_older_than(&fresh, now, 0));
    }
}
