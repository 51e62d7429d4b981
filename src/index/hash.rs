//! Seeded 32-bit path hash.
//!
//! x31 variant consuming two bytes per round: the hash seeds with
//! `seed + len` so equal-prefix strings of different lengths diverge
//! immediately, then folds each byte pair in with two multiply-add steps
//! and finishes odd-length input with a single-byte step. Not
//! cryptographic; colliding paths are disambiguated by the index via exact
//! string comparison.

/// Fixed seed for path keys. The index is rebuilt from empty every mount,
/// so nothing depends on this value surviving across versions.
pub const PATH_HASH_SEED: u32 = 0xbaff_fffe;

/// Hash `bytes` with the given seed, two bytes per round.
#[must_use]
pub fn x31(bytes: &[u8], seed: u32) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let mut hash = seed.wrapping_add(bytes.len() as u32);

    let mut pairs = bytes.chunks_exact(2);
    for pair in pairs.by_ref() {
        hash = hash
            .wrapping_mul(31)
            .wrapping_add(u32::from(pair[0]))
            .wrapping_mul(31)
            .wrapping_add(u32::from(pair[1]));
    }
    if let [tail] = pairs.remainder() {
        hash = hash.wrapping_mul(31).wrapping_add(u32::from(*tail));
    }

    hash
}

/// Hash a path string with the fixed seed.
#[must_use]
pub fn hash_path(path: &str) -> u32 {
    x31(path.as_bytes(), PATH_HASH_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = hash_path("/var/log/syslog");
        let b = hash_path("/var/log/syslog");
        assert_eq!(a, b);
    }

    #[test]
    fn seed_changes_output() {
        let bytes = b"/etc/hosts";
        assert_ne!(x31(bytes, 0), x31(bytes, 1));
    }

    #[test]
    fn length_seeding_separates_prefixes() {
        // "/a" is a prefix of "/ab"; the len term in the seed must make the
        // shared-prefix rounds differ, not just the final byte.
        assert_ne!(hash_path("/a"), hash_path("/ab"));
    }

    #[test]
    fn odd_length_tail_contributes() {
        assert_ne!(hash_path("/ab"), hash_path("/ac"));
        assert_ne!(hash_path("/abc"), hash_path("/abd"));
    }

    #[test]
    fn empty_input_is_just_the_seed() {
        assert_eq!(x31(b"", 7), 7);
    }

    #[test]
    fn known_collision_pair() {
        // Two-byte rounds fold pairs as 31*a + b, so ('b','A') and
        // ('a','`') collide: 31*98 + 65 == 31*97 + 96. The index must
        // tolerate such keys; this pins the pair used by collision tests.
        assert_eq!(hash_path("/bA"), hash_path("/a`"));
        assert_ne!("/bA", "/a`");
    }
}
