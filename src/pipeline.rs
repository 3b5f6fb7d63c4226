//! The cryptoblob pipeline: the encrypt and decrypt state machines.
//!
//! Orchestrates the salts, the encrypted pad IKM, the padding block, the
//! comments block, and the payload chunk stream around the primitives in
//! [`crate::keys`], [`crate::cipher`], and [`crate::padding`]. Nothing here
//! knows whether its input/output is a standalone file or an embedded range
//! of a container; that is [`crate::embed`]'s concern.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use rand::TryRng;
use rand::rngs::SysRng;

use crate::cipher::mac::{self, Aad};
use crate::cipher::nonce::NonceCounter;
use crate::cipher::stream;
use crate::config::{COMMENTS_LEN, COMMENTS_SEPARATOR, MAC_TAG_LEN, MAX_PT_CHUNK_SIZE, MIN_UNPADDED_SIZE, PAD_IKM_LEN, SALT_LEN};
use crate::error::ActionError;
use crate::ikm;
use crate::io_util::{ChunkPlan, ProgressSink, read_strict, write_strict};
use crate::keys::{self, KeySchedule};
use crate::padding;

const MAX_CT_CHUNK_SIZE: usize = MAX_PT_CHUNK_SIZE + MAC_TAG_LEN;

/// Everything the pipeline needs to collect IKM and derive keys, shared by
/// both directions.
pub struct Credentials<'a> {
    pub keyfile_paths: &'a [std::path::PathBuf],
    pub passphrase: Option<&'a str>,
    pub time_cost: u32,
}

fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    SysRng.try_fill_bytes(&mut buf).map_err(|e| anyhow::anyhow!("system RNG failed: {e}"))?;
    Ok(buf)
}

fn write_random_fill(output: &mut impl Write, total: u64, mac: &mut mac::ChunkMac, progress: &mut impl ProgressSink) -> Result<()> {
    let plan = ChunkPlan::new(total, MAX_PT_CHUNK_SIZE);
    let mut buf = vec![0u8; MAX_PT_CHUNK_SIZE];
    let mut rng = SysRng;
    for len in plan.lengths(MAX_PT_CHUNK_SIZE) {
        let chunk = &mut buf[..len];
        rng.try_fill_bytes(chunk).map_err(|e| anyhow::anyhow!("system RNG failed: {e}"))?;
        write_strict(output, chunk)?;
        mac.update(chunk);
        progress.add(len as u64);
        crate::signal::check()?;
    }
    Ok(())
}

fn consume_padding(input: &mut impl Read, total: u64, mac: &mut mac::ChunkMac, progress: &mut impl ProgressSink) -> Result<()> {
    let plan = ChunkPlan::new(total, MAX_PT_CHUNK_SIZE);
    let mut buf = vec![0u8; MAX_PT_CHUNK_SIZE];
    for len in plan.lengths(MAX_PT_CHUNK_SIZE) {
        let chunk = &mut buf[..len];
        read_strict(input, chunk)?;
        mac.update(chunk);
        progress.add(len as u64);
        crate::signal::check()?;
    }
    Ok(())
}

/// Builds the 1024-byte comments block: sanitized UTF-8 comment, truncated
/// to leave room for the separator, then the separator, then random filler.
fn build_comments_block(comments: &str) -> Result<[u8; COMMENTS_LEN]> {
    let mut bytes = comments.as_bytes().to_vec();
    bytes.truncate(COMMENTS_LEN - 1);
    let mut sanitized = String::from_utf8_lossy(&bytes).into_owned();

    // `from_utf8_lossy` can replace a dangling lead byte left by the
    // truncation above with U+FFFD (3 bytes), growing past COMMENTS_LEN - 1.
    // Re-truncate on a char boundary so the block never overflows.
    if sanitized.len() > COMMENTS_LEN - 1 {
        let mut cut = COMMENTS_LEN - 1;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
    }

    let mut block = [0u8; COMMENTS_LEN];
    let sanitized_bytes = sanitized.as_bytes();
    block[..sanitized_bytes.len()].copy_from_slice(sanitized_bytes);
    block[sanitized_bytes.len()] = COMMENTS_SEPARATOR;

    let filler_start = sanitized_bytes.len() + 1;
    let filler = random_array::<COMMENTS_LEN>()?;
    block[filler_start..].copy_from_slice(&filler[filler_start..]);
    Ok(block)
}

/// Recovers the comment text from a decrypted comments block: everything
/// before the first `0xFF` separator byte, decoded as UTF-8.
fn decode_comments_block(block: &[u8; COMMENTS_LEN]) -> String {
    let end = block.iter().position(|&b| b == COMMENTS_SEPARATOR).unwrap_or(block.len());
    String::from_utf8_lossy(&block[..end]).into_owned()
}

/// Encrypted payload size (ciphertext + one MAC tag per chunk) produced from
/// a plaintext of `contents_size` bytes.
fn enc_contents_size(contents_size: u64) -> u64 {
    let full_chunks = contents_size / MAX_PT_CHUNK_SIZE as u64;
    let remainder = contents_size % MAX_PT_CHUNK_SIZE as u64;
    let mut size = full_chunks * MAX_CT_CHUNK_SIZE as u64;
    if remainder != 0 {
        size += remainder + MAC_TAG_LEN as u64;
    }
    size
}

/// Inverse of [`enc_contents_size`]: recovers the plaintext size from an
/// encrypted payload size, or fails if the tail isn't a valid partial chunk.
fn contents_size_from_enc(enc_size: u64) -> Result<u64, ActionError> {
    let full_chunks = enc_size / MAX_CT_CHUNK_SIZE as u64;
    let remainder = enc_size % MAX_CT_CHUNK_SIZE as u64;

    if remainder != 0 && remainder < 1 + MAC_TAG_LEN as u64 {
        return Err(ActionError::SizeValidation);
    }

    let tail = remainder.saturating_sub(MAC_TAG_LEN as u64);
    Ok(full_chunks * MAX_PT_CHUNK_SIZE as u64 + tail)
}

fn build_aad(schedule: &KeySchedule, argon2_salt: &[u8; SALT_LEN], blake2_salt: &[u8; SALT_LEN], encrypted_pad_ikm: &[u8], padded_size: u64, pad_size: u64, contents_size: u64) -> Aad {
    Aad {
        enc_key_hash: schedule.enc_key_hash,
        argon2_salt: *argon2_salt,
        blake2_salt: *blake2_salt,
        encrypted_pad_ikm: encrypted_pad_ikm.to_vec(),
        padded_size,
        pad_size,
        contents_size,
    }
}

fn derive_schedule(creds: &Credentials, blake2_salt: &[u8; SALT_LEN], argon2_salt: &[u8; SALT_LEN]) -> Result<KeySchedule> {
    let argon2_password = ikm::collect_argon2_password(creds.keyfile_paths, creds.passphrase, blake2_salt).context("failed to collect key material")?;
    #[cfg(any(test, feature = "test-support"))]
    {
        keys::derive_key_schedule_with_memory(&argon2_password, argon2_salt, creds.time_cost, 16)
    }
    #[cfg(not(any(test, feature = "test-support")))]
    {
        keys::derive_key_schedule(&argon2_password, argon2_salt, creds.time_cost)
    }
}

/// Runs the encrypt state machine, writing a complete cryptoblob to
/// `output`. Returns the padded size written.
pub fn encrypt(input: &mut impl Read, input_size: u64, comments: &str, output: &mut impl Write, creds: &Credentials, progress: &mut impl ProgressSink) -> Result<u64> {
    let argon2_salt = random_array::<SALT_LEN>()?;
    let blake2_salt = random_array::<SALT_LEN>()?;
    let pad_ikm = random_array::<PAD_IKM_LEN>()?;
    let pad_key = keys::derive_pad_key(&pad_ikm)?;

    let enc_size = enc_contents_size(input_size);
    let unpadded_size = enc_size + MIN_UNPADDED_SIZE;
    let pad_size = padding::forward(unpadded_size, pad_key);
    let padded_size = unpadded_size + pad_size;

    let schedule = derive_schedule(creds, &blake2_salt, &argon2_salt)?;
    let mut counter = NonceCounter::new();

    write_strict(output, &argon2_salt)?;

    let pad_nonce = counter.advance();
    let mut encrypted_pad_ikm = pad_ikm.to_vec();
    stream::apply_keystream(&schedule.enc_key, &pad_nonce, &mut encrypted_pad_ikm)?;
    write_strict(output, &encrypted_pad_ikm)?;

    let mut pad_mac = mac::start_chunk(&schedule.mac_key);
    pad_mac.update(&encrypted_pad_ikm);
    write_random_fill(output, pad_size, &mut pad_mac, progress)?;
    let aad = build_aad(&schedule, &argon2_salt, &blake2_salt, &encrypted_pad_ikm, padded_size, pad_size, input_size);
    let pad_tag = pad_mac.finalize(&pad_nonce, &aad);
    write_strict(output, &pad_tag)?;

    let comments_nonce = counter.advance();
    let mut comments_block = build_comments_block(comments)?;
    stream::apply_keystream(&schedule.enc_key, &comments_nonce, &mut comments_block)?;
    write_strict(output, &comments_block)?;
    let mut comments_mac = mac::start_chunk(&schedule.mac_key);
    comments_mac.update(&comments_block);
    let comments_tag = comments_mac.finalize(&comments_nonce, &aad);
    write_strict(output, &comments_tag)?;

    let mut written = (SALT_LEN + PAD_IKM_LEN + MAC_TAG_LEN + COMMENTS_LEN + MAC_TAG_LEN) as u64 + pad_size;
    let plan = ChunkPlan::new(input_size, MAX_PT_CHUNK_SIZE);
    let mut buf = vec![0u8; MAX_PT_CHUNK_SIZE];
    for len in plan.lengths(MAX_PT_CHUNK_SIZE) {
        let chunk = &mut buf[..len];
        read_strict(input, chunk).map_err(anyhow::Error::from)?;

        let chunk_nonce = counter.advance();
        stream::apply_keystream(&schedule.enc_key, &chunk_nonce, chunk)?;
        write_strict(output, chunk)?;

        let mut chunk_mac = mac::start_chunk(&schedule.mac_key);
        chunk_mac.update(chunk);
        let tag = chunk_mac.finalize(&chunk_nonce, &aad);
        write_strict(output, &tag)?;

        written += len as u64 + MAC_TAG_LEN as u64;
        progress.add(len as u64);
        crate::signal::check()?;
    }

    write_strict(output, &blake2_salt)?;
    written += SALT_LEN as u64;

    if written != padded_size {
        bail!("internal size mismatch: wrote {written} bytes, expected {padded_size}");
    }
    Ok(padded_size)
}

/// Result of a successful decrypt: the recovered comment text. The
/// plaintext itself has already been written to the caller's output.
#[derive(Debug)]
pub struct DecryptOutcome {
    pub comments: String,
}

/// Runs the decrypt state machine against a cryptoblob whose `blake2_salt`
/// has already been sliced off by the caller (embedded cryptoblobs may not
/// have a seekable, self-delimited input, so the caller resolves the
/// `[start, end)` range and presents it to us as plain sequential reads plus
/// the trailing salt).
pub fn decrypt(input: &mut impl Read, padded_size: u64, blake2_salt: [u8; SALT_LEN], output: &mut impl Write, creds: &Credentials, allow_unsafe_decrypt: bool, progress: &mut impl ProgressSink) -> Result<DecryptOutcome, ActionError> {
    if padded_size < MIN_UNPADDED_SIZE {
        return Err(ActionError::SizeValidation);
    }

    let mut argon2_salt = [0u8; SALT_LEN];
    read_strict(input, &mut argon2_salt)?;

    let schedule = derive_schedule(creds, &blake2_salt, &argon2_salt).map_err(|_| ActionError::AuthenticationFailure)?;
    let mut counter = NonceCounter::new();

    let pad_nonce = counter.advance();
    let mut encrypted_pad_ikm = [0u8; PAD_IKM_LEN];
    read_strict(input, &mut encrypted_pad_ikm)?;
    let mut pad_ikm = encrypted_pad_ikm;
    stream::apply_keystream(&schedule.enc_key, &pad_nonce, &mut pad_ikm).map_err(|_| ActionError::AuthenticationFailure)?;
    let pad_key = keys::derive_pad_key(&pad_ikm).map_err(|_| ActionError::AuthenticationFailure)?;

    let pad_size = padding::inverse(padded_size, pad_key);
    let unpadded_size = padded_size - pad_size;
    let enc_size = unpadded_size.checked_sub(MIN_UNPADDED_SIZE).ok_or(ActionError::SizeValidation)?;
    let contents_size = contents_size_from_enc(enc_size)?;

    let aad = build_aad(&schedule, &argon2_salt, &blake2_salt, &encrypted_pad_ikm, padded_size, pad_size, contents_size);

    let mut pad_mac = mac::start_chunk(&schedule.mac_key);
    pad_mac.update(&encrypted_pad_ikm);
    consume_padding(input, pad_size, &mut pad_mac, progress).map_err(|e| match e.downcast::<ActionError>() {
        Ok(action_err) => action_err,
        Err(e) => ActionError::ReadError(e.to_string()),
    })?;
    let mut pad_tag = [0u8; MAC_TAG_LEN];
    read_strict(input, &mut pad_tag)?;
    let expected_pad_tag = pad_mac.finalize(&pad_nonce, &aad);
    if !mac::tags_match(&pad_tag, &expected_pad_tag) && !allow_unsafe_decrypt {
        return Err(ActionError::AuthenticationFailure);
    }

    let comments_nonce = counter.advance();
    let mut comments_block = [0u8; COMMENTS_LEN];
    read_strict(input, &mut comments_block)?;
    let mut comments_tag = [0u8; MAC_TAG_LEN];
    read_strict(input, &mut comments_tag)?;

    let mut comments_mac = mac::start_chunk(&schedule.mac_key);
    comments_mac.update(&comments_block);
    let expected_comments_tag = comments_mac.finalize(&comments_nonce, &aad);
    if !mac::tags_match(&comments_tag, &expected_comments_tag) && !allow_unsafe_decrypt {
        return Err(ActionError::AuthenticationFailure);
    }

    stream::apply_keystream(&schedule.enc_key, &comments_nonce, &mut comments_block).map_err(|_| ActionError::AuthenticationFailure)?;
    let comments = decode_comments_block(&comments_block);

    let plan = ChunkPlan::new(contents_size, MAX_PT_CHUNK_SIZE);
    let mut buf = vec![0u8; MAX_PT_CHUNK_SIZE];
    let mut written = 0u64;
    for len in plan.lengths(MAX_PT_CHUNK_SIZE) {
        let chunk = &mut buf[..len];
        read_strict(input, chunk)?;

        let chunk_nonce = counter.advance();
        let mut chunk_mac = mac::start_chunk(&schedule.mac_key);
        chunk_mac.update(chunk);
        let mut tag = [0u8; MAC_TAG_LEN];
        read_strict(input, &mut tag)?;
        let expected = chunk_mac.finalize(&chunk_nonce, &aad);
        if !mac::tags_match(&tag, &expected) && !allow_unsafe_decrypt {
            return Err(ActionError::AuthenticationFailure);
        }

        stream::apply_keystream(&schedule.enc_key, &chunk_nonce, chunk).map_err(|_| ActionError::AuthenticationFailure)?;
        write_strict(output, chunk)?;
        written += len as u64;
        progress.add(len as u64);
        if crate::signal::check().is_err() {
            return Err(ActionError::Signal);
        }
    }

    if written != contents_size {
        return Err(ActionError::SizeValidation);
    }

    Ok(DecryptOutcome { comments })
}

/// Reads a keyfile path list from disk-backed paths, used by both directions
/// to validate every path exists before the (slow) Argon2 pass begins.
pub fn validate_keyfiles(paths: &[impl AsRef<Path>]) -> Result<(), ActionError> {
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ActionError::InputNotFound(path.display().to_string()));
        }
    }
    Ok(())
}
