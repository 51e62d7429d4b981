//! Path utilities: mount-relative resolution and snapshot naming.
//!
//! Snapshots live alongside the original file, named
//! `<original>.backup.<N>` where `N` is the write count at the time of the
//! snapshot. Nothing else is persisted, so the name is the only metadata a
//! later session (or `svfs purge`) has to go on.

use std::env;
use std::path::{Component, Path, PathBuf};

use regex::Regex;

/// Map a mount-relative path onto the backing root directory.
///
/// `relative` is the path as seen through the mount (always `/`-prefixed in
/// the hosting framework's calling convention); the result is the absolute
/// on-disk location under `root`.
#[must_use]
pub fn resolve_full_path(root: &Path, relative: &str) -> PathBuf {
    root.join(relative.trim_start_matches('/'))
}

/// Derive the snapshot location for the `write_count`-th write to `original`.
///
/// The suffix is appended to the full file name, so `/a/b.txt` becomes
/// `/a/b.txt.backup.3` with the default suffix.
#[must_use]
pub fn snapshot_path(original: &Path, write_count: u64, suffix: &str) -> PathBuf {
    let mut name = original.as_os_str().to_os_string();
    name.push(format!("{suffix}.{write_count}"));
    PathBuf::from(name)
}

/// Matcher for snapshot file names produced by [`snapshot_path`].
///
/// Built once per purge pass; `parse` recovers the original path and the
/// write count from a candidate file name.
#[derive(Debug, Clone)]
pub struct SnapshotNamePattern {
    re: Regex,
}

impl SnapshotNamePattern {
    /// Compile the matcher for a configured suffix (e.g. `.backup`).
    #[must_use]
    pub fn new(suffix: &str) -> Self {
        let re = Regex::new(&format!(r"^(?s)(.+){}\.(\d+)$", regex::escape(suffix)))
            .unwrap_or_else(|e| unreachable!("escaped suffix pattern is always valid: {e}"));
        Self { re }
    }

    /// If `path` names a snapshot, return the original path and write count.
    #[must_use]
    pub fn parse(&self, path: &Path) -> Option<(PathBuf, u64)> {
        let name = path.to_str()?;
        let caps = self.re.captures(name)?;
        let original = PathBuf::from(caps.get(1)?.as_str());
        let count: u64 = caps.get(2)?.as_str().parse().ok()?;
        Some((original, count))
    }

    /// Whether `path` names a snapshot.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.parse(path).is_some()
    }
}

/// Resolve a path to an absolute, normalized path.
///
/// Canonicalizes when the path exists (resolving symlinks); otherwise makes
/// it absolute relative to CWD and resolves `..`/`.` syntactically. Used by
/// the CLI to pin down the purge root before walking it.
#[must_use]
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return canonical;
    }

    normalize_syntactic(&absolute)
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_full_path_joins_under_root() {
        let root = Path::new("/srv/backing");
        assert_eq!(
            resolve_full_path(root, "/notes/todo.txt"),
            PathBuf::from("/srv/backing/notes/todo.txt")
        );
        assert_eq!(resolve_full_path(root, "/"), PathBuf::from("/srv/backing"));
    }

    #[test]
    fn snapshot_path_appends_suffix_and_count() {
        let p = snapshot_path(Path::new("/a/b.txt"), 3, ".backup");
        assert_eq!(p, PathBuf::from("/a/b.txt.backup.3"));
    }

    #[test]
    fn snapshot_path_keeps_extensionless_names() {
        let p = snapshot_path(Path::new("/a/Makefile"), 12, ".backup");
        assert_eq!(p, PathBuf::from("/a/Makefile.backup.12"));
    }

    #[test]
    fn pattern_round_trips_snapshot_names() {
        let pattern = SnapshotNamePattern::new(".backup");
        let snap = snapshot_path(Path::new("/data/x.csv"), 7, ".backup");
        let (original, count) = pattern.parse(&snap).expect("should parse");
        assert_eq!(original, PathBuf::from("/data/x.csv"));
        assert_eq!(count, 7);
    }

    #[test]
    fn pattern_rejects_non_snapshots() {
        let pattern = SnapshotNamePattern::new(".backup");
        assert!(!pattern.matches(Path::new("/data/x.csv")));
        assert!(!pattern.matches(Path::new("/data/x.backup")));
        assert!(!pattern.matches(Path::new("/data/x.backup.abc")));
        // A different suffix must not match.
        assert!(!pattern.matches(Path::new("/data/x.bak.3")));
    }

    #[test]
    fn pattern_suffix_dot_is_literal() {
        // The "." in the suffix must not act as a regex wildcard.
        let pattern = SnapshotNamePattern::new(".backup");
        assert!(!pattern.matches(Path::new("/data/xXbackup.3")));
    }

    #[test]
    fn resolves_existing_path_canonically() {
        let cwd = env::current_dir().unwrap();
        let resolved = resolve_absolute_path(Path::new("."));
        assert_eq!(resolved, std::fs::canonicalize(&cwd).unwrap());
    }

    #[test]
    fn normalizes_nonexistent_path_syntactically() {
        #[cfg(unix)]
        let root = Path::new("/");
        #[cfg(windows)]
        let root = Path::new("C:");

        let input = root.join("nonexistent").join("foo").join("..").join("bar");
        let expected = root.join("nonexistent").join("bar");

        assert!(std::fs::canonicalize(&input).is_err());
        assert_eq!(resolve_absolute_path(&input), expected);
    }
}
