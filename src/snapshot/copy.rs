//! Chunked snapshot copy.
//!
//! Streams the source in fixed-size chunks; a zero-length read terminates
//! the loop (short reads just shrink the chunk, they never spin). The copy
//! happens *before* the triggering write lands, so the snapshot captures
//! the pre-write content. Permission bits are carried over so a restored
//! snapshot behaves like the original.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use crate::core::errors::{Result, SvfsError};

/// Result of a successful snapshot copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Total bytes streamed to the snapshot.
    pub bytes_copied: u64,
}

/// Copy `source` to `dest` in `chunk_bytes`-sized reads.
///
/// `dest` is created (or truncated) fresh; a partial snapshot left behind
/// by a mid-copy failure is overwritten by the next attempt at the same
/// location or reclaimed at shutdown.
pub fn copy_snapshot(
    source: &Path,
    dest: &Path,
    chunk_bytes: usize,
    preserve_permissions: bool,
) -> Result<CopyOutcome> {
    let mut src = File::open(source).map_err(|e| SvfsError::io(source, e))?;
    let metadata = src.metadata().map_err(|e| SvfsError::io(source, e))?;

    let mut dst = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .map_err(|e| SvfsError::io(dest, e))?;

    let mut buf = vec![0u8; chunk_bytes.max(1)];
    let mut bytes_copied: u64 = 0;
    loop {
        let n = src.read(&mut buf).map_err(|e| SvfsError::io(source, e))?;
        if n == 0 {
            break;
        }
        dst.write_all(&buf[..n]).map_err(|e| SvfsError::io(dest, e))?;
        bytes_copied += n as u64;
    }
    dst.flush().map_err(|e| SvfsError::io(dest, e))?;

    if preserve_permissions {
        fs::set_permissions(dest, metadata.permissions()).map_err(|e| SvfsError::io(dest, e))?;
    }

    Ok(CopyOutcome { bytes_copied })
}
