//! Ordered version index: a capacity-managed, key-sorted array of backup
//! records with binary-search lookup.
//!
//! Array-backed on purpose — cache-friendly scans and low per-entry
//! overhead in exchange for an O(n) shift per insert, which is acceptable
//! at mount-session path counts. Capacity grows by a deliberately slow
//! `(cap + increment) * factor` policy rather than doubling.
//!
//! Colliding keys are legal: two distinct paths may hash to the same key
//! and sit in adjacent slots. Reads scan the equal-key run and confirm the
//! canonical path by exact string comparison. Writes cannot create a
//! duplicate entry for the *same* path because the only public creation
//! path is [`VersionTable::record_for`], which proves absence before it
//! inserts.

use crate::core::config::IndexConfig;
use crate::index::hash::hash_path;
use crate::index::record::BackupRecord;

/// One line of [`VersionTable::summarize`] output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    /// Tracked canonical path.
    pub canonical_path: String,
    /// Index key (path hash).
    pub key: u32,
    /// Write-intent opens observed.
    pub write_count: u64,
    /// Live snapshots currently retained.
    pub live_versions: usize,
}

/// Key-sorted array of backup records.
#[derive(Debug)]
pub struct VersionTable {
    entries: Vec<BackupRecord>,
    capacity: usize,
    growth_increment: usize,
    growth_factor: f64,
}

impl Default for VersionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionTable {
    /// Empty table with the default capacity policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&IndexConfig::default())
    }

    /// Empty table with an explicit capacity policy.
    #[must_use]
    pub fn with_config(config: &IndexConfig) -> Self {
        let capacity = config.initial_capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            growth_increment: config.growth_increment,
            growth_factor: config.growth_factor,
        }
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any path is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current managed capacity (`len() <= capacity()` always holds).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up the record tracking exactly `path`.
    ///
    /// A key hit alone is not enough: the equal-key run is scanned and the
    /// canonical path confirmed by string comparison, so colliding paths
    /// never alias each other. A miss is not an error — it is the signal
    /// that no write-intent open has been seen for `path` this session.
    #[must_use]
    pub fn lookup_by_path(&self, path: &str) -> Option<&BackupRecord> {
        self.position_of(path).map(|i| &self.entries[i])
    }

    /// Look up the record for `path`, creating it on first use.
    ///
    /// This lookup-or-create is the only way records enter the table; a
    /// bare insert is deliberately not exposed, so every insert is
    /// preceded by a proven-absent lookup and the table can never hold two
    /// records for the same canonical path.
    pub fn record_for(&mut self, path: &str) -> &mut BackupRecord {
        if let Some(i) = self.position_of(path) {
            return &mut self.entries[i];
        }
        let idx = self.insert_record(BackupRecord::new(path));
        &mut self.entries[idx]
    }

    /// Iterate records in key order.
    pub fn records(&self) -> impl Iterator<Item = &BackupRecord> {
        self.entries.iter()
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut BackupRecord> {
        self.entries.iter_mut()
    }

    /// Per-record diagnostic summary, in key order.
    #[must_use]
    pub fn summarize(&self) -> Vec<RecordSummary> {
        self.entries
            .iter()
            .map(|r| RecordSummary {
                canonical_path: r.canonical_path().to_string(),
                key: r.key(),
                write_count: r.write_count(),
                live_versions: r.version_count(),
            })
            .collect()
    }

    /// Leftmost slot whose key is >= `key`; the insertion position that
    /// keeps the array sorted. O(log n).
    fn insertion_index(&self, key: u32) -> usize {
        self.entries.partition_point(|e| e.key() < key)
    }

    /// Index of the record whose canonical path equals `path`, if any.
    fn position_of(&self, path: &str) -> Option<usize> {
        let key = hash_path(path);
        let start = self.insertion_index(key);
        self.entries[start..]
            .iter()
            .take_while(|e| e.key() == key)
            .position(|e| e.canonical_path() == path)
            .map(|offset| start + offset)
    }

    /// Insert `record` at its sorted position, growing capacity first if
    /// the table is full. Returns the slot it landed in.
    fn insert_record(&mut self, record: BackupRecord) -> usize {
        if self.entries.len() + 1 > self.capacity {
            self.grow();
        }
        let pos = self.insertion_index(record.key());
        self.entries.insert(pos, record);
        pos
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn grow(&mut self) {
        let scaled = ((self.capacity + self.growth_increment) as f64 * self.growth_factor) as usize;
        // Guarantee forward progress even under a degenerate policy.
        self.capacity = scaled.max(self.capacity + 1);
        self.entries
            .reserve_exact(self.capacity - self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of(table: &VersionTable) -> Vec<u32> {
        table.records().map(BackupRecord::key).collect()
    }

    fn assert_sorted(table: &VersionTable) {
        let keys = keys_of(table);
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted, "entries must stay sorted by key");
    }

    #[test]
    fn stays_sorted_and_counts_inserts() {
        let mut table = VersionTable::new();
        let paths = [
            "/var/log/syslog",
            "/etc/hosts",
            "/home/user/a.txt",
            "/home/user/b.txt",
            "/tmp/scratch",
            "/usr/share/dict/words",
            "/opt/data.bin",
        ];
        for (i, path) in paths.iter().enumerate() {
            table.record_for(path);
            assert_eq!(table.len(), i + 1);
            assert_sorted(&table);
        }
    }

    #[test]
    fn record_for_is_idempotent() {
        let mut table = VersionTable::new();
        table.record_for("/a");
        table.record_for("/a");
        table.record_for("/a");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn lookup_miss_is_none() {
        let mut table = VersionTable::new();
        table.record_for("/a");
        assert!(table.lookup_by_path("/b").is_none());
    }

    #[test]
    fn colliding_paths_resolve_to_their_own_records() {
        // "/bA" and "/a`" share an x31 key (see index::hash tests).
        let mut table = VersionTable::new();
        assert_eq!(hash_path("/bA"), hash_path("/a`"));

        table.record_for("/bA").bump_write_count();
        table.record_for("/a`");

        assert_eq!(table.len(), 2);
        assert_sorted(&table);

        let first = table.lookup_by_path("/bA").expect("tracked");
        assert_eq!(first.canonical_path(), "/bA");
        assert_eq!(first.write_count(), 1);

        let second = table.lookup_by_path("/a`").expect("tracked");
        assert_eq!(second.canonical_path(), "/a`");
        assert_eq!(second.write_count(), 0);
    }

    #[test]
    fn colliding_paths_resolve_regardless_of_insert_order() {
        let mut table = VersionTable::new();
        table.record_for("/a`");
        table.record_for("/bA");
        assert_eq!(
            table.lookup_by_path("/bA").unwrap().canonical_path(),
            "/bA"
        );
        assert_eq!(
            table.lookup_by_path("/a`").unwrap().canonical_path(),
            "/a`"
        );
    }

    #[test]
    fn capacity_grows_by_slow_policy() {
        let mut table = VersionTable::new();
        assert_eq!(table.capacity(), 5);

        for i in 0..6 {
            table.record_for(&format!("/f{i}"));
        }
        // (5 + 10) * 1.5 = 22.5 -> 22
        assert_eq!(table.capacity(), 22);

        for i in 6..23 {
            table.record_for(&format!("/f{i}"));
        }
        // (22 + 10) * 1.5 = 48
        assert_eq!(table.capacity(), 48);
        assert_eq!(table.len(), 23);
        assert_sorted(&table);
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut table = VersionTable::with_config(&IndexConfig {
            initial_capacity: 1,
            growth_increment: 1,
            growth_factor: 1.0,
        });
        for i in 0..50 {
            table.record_for(&format!("/p{i}"));
            assert!(table.len() <= table.capacity());
        }
    }

    #[test]
    fn summarize_reflects_state() {
        let mut table = VersionTable::new();
        let record = table.record_for("/a");
        record.bump_write_count();
        record.append_snapshot(std::path::PathBuf::from("/a.backup.1"), 100);

        let summary = table.summarize();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].canonical_path, "/a");
        assert_eq!(summary[0].key, hash_path("/a"));
        assert_eq!(summary[0].write_count, 1);
        assert_eq!(summary[0].live_versions, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_inserts_keep_table_sorted_and_resolvable(
                paths in proptest::collection::vec("/[a-z]{1,10}(/[a-z0-9]{1,8}){0,3}", 1..40)
            ) {
                let mut table = VersionTable::new();
                for path in &paths {
                    table.record_for(path);
                }

                assert_sorted(&table);

                let distinct: std::collections::HashSet<&String> = paths.iter().collect();
                prop_assert_eq!(table.len(), distinct.len());

                for path in &paths {
                    let record = table.lookup_by_path(path);
                    prop_assert!(record.is_some());
                    prop_assert_eq!(record.unwrap().canonical_path(), path.as_str());
                }
            }
        }
    }
}
