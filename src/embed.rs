//! Position-based byte-exact embed/extract.
//!
//! No cryptography here: embedding a cryptoblob into a container and
//! extracting it back out is a plain positioned copy. The only thing this
//! module adds over `std::io::copy` is strict chunked I/O, progress
//! reporting, an unkeyed BLAKE2b-32 checksum of what moved, and an fsync
//! after writing into the container.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use anyhow::{Context, Result, ensure};

use crate::config::IO_CHUNK_SIZE;
use crate::error::ActionError;
use crate::io_util::{ChunkPlan, ProgressSink, read_strict, write_strict};

const CHECKSUM_LEN: usize = 32;

/// Report of a completed embed or extract: the byte range touched in the
/// container and an unkeyed BLAKE2b-32 checksum of the bytes that moved.
#[derive(Debug)]
pub struct TransferReport {
    pub start_pos: u64,
    pub end_pos: u64,
    pub checksum: [u8; CHECKSUM_LEN],
}

/// Copies `input_size` bytes from `input` into `container` starting at
/// `start_pos`, overwriting whatever was there. `container` must already be
/// at least `start_pos + input_size` bytes long.
pub fn embed(input: &mut impl Read, input_size: u64, container: &mut File, start_pos: u64, progress: &mut impl ProgressSink) -> Result<TransferReport> {
    let container_len = container.metadata().context("failed to stat container")?.len();
    let end_pos = start_pos + input_size;
    ensure!(end_pos <= container_len, "embed range [{start_pos}, {end_pos}) exceeds container size {container_len}");

    container.seek(SeekFrom::Start(start_pos)).map_err(|e| ActionError::SeekError(e.to_string()))?;

    let mut hasher = blake2b_simd::Params::new().hash_length(CHECKSUM_LEN).to_state();
    let plan = ChunkPlan::new(input_size, IO_CHUNK_SIZE);
    let mut buf = vec![0u8; IO_CHUNK_SIZE];
    for len in plan.lengths(IO_CHUNK_SIZE) {
        let chunk = &mut buf[..len];
        read_strict(input, chunk)?;
        write_strict(container, chunk)?;
        hasher.update(chunk);
        progress.add(len as u64);
        crate::signal::check()?;
    }

    container.sync_all().map_err(|e| ActionError::FsyncError(e.to_string()))?;

    let hash = hasher.finalize();
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(hash.as_bytes());
    Ok(TransferReport { start_pos, end_pos, checksum })
}

/// Copies the `[start_pos, end_pos)` range of `container` to `output`.
pub fn extract(container: &mut File, start_pos: u64, end_pos: u64, output: &mut impl Write, progress: &mut impl ProgressSink) -> Result<TransferReport> {
    ensure!(start_pos <= end_pos, "extract start {start_pos} is after end {end_pos}");
    let container_len = container.metadata().context("failed to stat container")?.len();
    ensure!(end_pos <= container_len, "extract range [{start_pos}, {end_pos}) exceeds container size {container_len}");

    container.seek(SeekFrom::Start(start_pos)).map_err(|e| ActionError::SeekError(e.to_string()))?;

    let total = end_pos - start_pos;
    let mut hasher = blake2b_simd::Params::new().hash_length(CHECKSUM_LEN).to_state();
    let plan = ChunkPlan::new(total, IO_CHUNK_SIZE);
    let mut buf = vec![0u8; IO_CHUNK_SIZE];
    for len in plan.lengths(IO_CHUNK_SIZE) {
        let chunk = &mut buf[..len];
        read_strict(container, chunk)?;
        write_strict(output, chunk)?;
        hasher.update(chunk);
        progress.add(len as u64);
        crate::signal::check()?;
    }

    let hash = hasher.finalize();
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(hash.as_bytes());
    Ok(TransferReport { start_pos, end_pos, checksum })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    #[test]
    fn embed_then_extract_recovers_exact_bytes_and_leaves_rest_untouched() {
        let mut container_data = vec![0xAAu8; 10 * 1024 * 1024];
        let payload = vec![0x42u8; 1024 * 1024];

        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), &container_data).unwrap();
        let mut container = File::options().read(true).write(true).open(file.path()).unwrap();

        let start = 3 * 1024 * 1024;
        let report = embed(&mut Cursor::new(&payload), payload.len() as u64, &mut container, start, &mut ()).unwrap();
        assert_eq!(report.start_pos, start);
        assert_eq!(report.end_pos, start + payload.len() as u64);

        let mut recovered = Vec::new();
        let extract_report = extract(&mut container, report.start_pos, report.end_pos, &mut recovered, &mut ()).unwrap();
        assert_eq!(recovered, payload);
        assert_eq!(extract_report.checksum, report.checksum);

        container_data[start as usize..report.end_pos as usize].copy_from_slice(&payload);
        let on_disk = std::fs::read(file.path()).unwrap();
        assert_eq!(on_disk, container_data);
    }

    #[test]
    fn embed_rejects_range_past_container_end() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), vec![0u8; 100]).unwrap();
        let mut container = File::options().read(true).write(true).open(file.path()).unwrap();

        let err = embed(&mut Cursor::new(vec![0u8; 50]), 50, &mut container, 80, &mut ()).unwrap_err();
        assert!(err.to_string().contains("exceeds container size"));
    }
}
