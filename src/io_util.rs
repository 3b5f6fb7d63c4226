//! Strict I/O and chunked-loop primitives shared by the pipeline, the
//! embed/extract engine, and the random writer.
//!
//! "Strict" means a short read or a short write is always an error: this
//! crate never silently proceeds on partial I/O.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ActionError;

/// Opens `path` for writing with exclusive-create semantics (fails if the
/// path already exists) and, on unix, owner-only permissions.
pub fn create_exclusive(path: &Path) -> std::io::Result<File> {
    let file = File::options().write(true).create_new(true).open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

/// Cleans up a freshly created output file after a failed action: truncates
/// it to zero length, then removes it from disk after operator confirmation.
/// Partial output is never left lying around.
pub fn truncate_and_remove(file: File, path: &Path, remove: bool) -> Result<()> {
    file.set_len(0).with_context(|| format!("failed to truncate partial output {}", path.display()))?;
    drop(file);
    if remove {
        std::fs::remove_file(path).with_context(|| format!("failed to remove partial output {}", path.display()))?;
    }
    Ok(())
}

/// Reads exactly `buf.len()` bytes or fails.
pub fn read_strict(reader: &mut impl Read, buf: &mut [u8]) -> Result<(), ActionError> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Err(ActionError::ShortRead { expected: buf.len(), got: total }),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ActionError::ReadError(e.to_string())),
        }
    }
    Ok(())
}

/// Writes every byte of `buf` or fails.
pub fn write_strict(writer: &mut impl Write, buf: &[u8]) -> Result<(), ActionError> {
    writer.write_all(buf).map_err(|e| ActionError::WriteError(e.to_string()))
}

/// A `total`-byte transfer split into `full_chunks` passes of `chunk_size`
/// plus one final `remainder`-byte pass (zero if `total` divides evenly).
pub struct ChunkPlan {
    pub full_chunks: u64,
    pub remainder: usize,
}

impl ChunkPlan {
    #[must_use]
    pub fn new(total: u64, chunk_size: usize) -> Self {
        let chunk_size_u64 = chunk_size as u64;
        Self { full_chunks: total / chunk_size_u64, remainder: (total % chunk_size_u64) as usize }
    }

    /// Iterates chunk lengths in order: `full_chunks` copies of `chunk_size`,
    /// then the remainder if nonzero.
    pub fn lengths(&self, chunk_size: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::repeat_n(chunk_size, self.full_chunks as usize).chain((self.remainder > 0).then_some(self.remainder))
    }
}

/// Sink for progress updates; throttled so UI redraws don't dominate runtime
/// on fast storage. [`crate::ui::progress::ProgressReporter`] is the
/// terminal-backed implementation; tests use a no-op.
pub trait ProgressSink {
    fn add(&mut self, delta: u64);
}

impl ProgressSink for () {
    fn add(&mut self, _delta: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_strict_rejects_short_input() {
        let mut cursor = Cursor::new(vec![1, 2, 3]);
        let mut buf = [0u8; 8];
        let err = read_strict(&mut cursor, &mut buf).unwrap_err();
        assert!(matches!(err, ActionError::ShortRead { expected: 8, got: 3 }));
    }

    #[test]
    fn read_strict_fills_buffer_across_multiple_reads() {
        let mut cursor = Cursor::new(vec![1, 2, 3, 4, 5]);
        let mut buf = [0u8; 5];
        read_strict(&mut cursor, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn chunk_plan_splits_evenly_and_with_remainder() {
        let even = ChunkPlan::new(32, 16);
        assert_eq!(even.full_chunks, 2);
        assert_eq!(even.remainder, 0);
        assert_eq!(even.lengths(16).collect::<Vec<_>>(), vec![16, 16]);

        let uneven = ChunkPlan::new(40, 16);
        assert_eq!(uneven.full_chunks, 2);
        assert_eq!(uneven.remainder, 8);
        assert_eq!(uneven.lengths(16).collect::<Vec<_>>(), vec![16, 16, 8]);
    }

    #[test]
    fn create_exclusive_refuses_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        std::fs::write(&path, b"x").unwrap();
        assert!(create_exclusive(&path).is_err());
    }

    #[test]
    fn truncate_and_remove_zeroes_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let mut file = create_exclusive(&path).unwrap();
        file.write_all(b"partial output").unwrap();
        truncate_and_remove(file, &path, true).unwrap();
        assert!(!path.exists());
    }
}
