//! CSPRNG fill/overwrite for container preparation.
//!
//! Used both to stand up containers for steganographic embedding (option 8)
//! and to scrub an existing byte range (option 9). Neither path touches the
//! cipher or MAC: the output here is never meant to be decrypted.

use std::io::Write;

use anyhow::Result;
use rand::TryRng;
use rand::rngs::SysRng;

use crate::config::IO_CHUNK_SIZE;
use crate::io_util::{ChunkPlan, ProgressSink};

/// Writes `total` bytes of CSPRNG output to `writer`, in chunks of at most
/// [`IO_CHUNK_SIZE`], reporting progress as it goes.
pub fn write_random(writer: &mut impl Write, total: u64, progress: &mut impl ProgressSink) -> Result<()> {
    let plan = ChunkPlan::new(total, IO_CHUNK_SIZE);
    let mut buf = vec![0u8; IO_CHUNK_SIZE];
    let mut rng = SysRng;

    for len in plan.lengths(IO_CHUNK_SIZE) {
        let chunk = &mut buf[..len];
        rng.try_fill_bytes(chunk).map_err(|e| anyhow::anyhow!("system RNG failed: {e}"))?;
        writer.write_all(chunk)?;
        progress.add(len as u64);
        crate::signal::check()?;
    }

    Ok(())
}
