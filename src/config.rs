//! Cryptographic and format constants.
//!
//! This module is the single source of truth for the cryptoblob binary layout:
//! field widths, chunk sizes, and Argon2id defaults. Nothing here is negotiable
//! at runtime except `time_cost`, which the operator may raise above the floor.

/// The application name used in user-facing output and prompts.
pub const APP_NAME: &str = "purbox";

/// Width of each random salt (`argon2_salt`, `blake2_salt`) in bytes.
pub const SALT_LEN: usize = 16;

/// Width of the pad IKM, both in plaintext and as stored ciphertext.
pub const PAD_IKM_LEN: usize = 8;

/// Width of a MAC tag in bytes (keyed BLAKE2b-32 output).
pub const MAC_TAG_LEN: usize = 32;

/// Width of the comments block, ciphertext included.
pub const COMMENTS_LEN: usize = 1024;

/// Maximum plaintext size of a single payload chunk (16 MiB).
///
/// Each chunk gets a fresh nonce, so this bound only limits how much
/// plaintext a single stream-cipher invocation may cover, not the total
/// payload size.
pub const MAX_PT_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Minimum unpadded cryptoblob size: two salts, the encrypted pad IKM and its
/// tag, the comments block and its tag, with no payload.
pub const MIN_UNPADDED_SIZE: u64 = (2 * SALT_LEN + PAD_IKM_LEN + MAC_TAG_LEN + COMMENTS_LEN + MAC_TAG_LEN) as u64;

/// Argon2id memory cost in KiB (1 GiB). Fixed: this is what makes brute
/// force expensive regardless of `time_cost`, and it is not exposed as a
/// tunable.
pub const ARGON2_MEMORY_KIB: u32 = 1024 * 1024;

/// Minimum accepted Argon2id time cost (number of passes).
pub const MIN_ARGON2_TIME_COST: u32 = 4;

/// Default Argon2id time cost offered at the prompt.
pub const DEFAULT_ARGON2_TIME_COST: u32 = 4;

/// Argon2id parallelism (lanes). Single-lane keeps derivation deterministic
/// and reproducible across machines with different core counts.
pub const ARGON2_PARALLELISM: u32 = 1;

/// Length of the Argon2id output tag, and of `enc_key`/`mac_key` after HKDF.
pub const KEY_LEN: usize = 32;

/// Maximum passphrase length after UTF-8 encoding, before hashing.
pub const MAX_PASSPHRASE_BYTES: usize = 2048;

/// Personalization string for keyfile IKM digests (16 bytes, repeated `K`).
pub const PERSON_KEYFILE: &[u8; 16] = b"KKKKKKKKKKKKKKKK";

/// Personalization string for passphrase IKM digests (16 bytes, repeated `P`).
pub const PERSON_PASSPHRASE: &[u8; 16] = b"PPPPPPPPPPPPPPPP";

/// HKDF info string selecting the MAC sub-key.
pub const HKDF_INFO_MAC: &[u8] = b"MAC";

/// HKDF info string selecting the encryption sub-key.
pub const HKDF_INFO_ENCRYPT: &[u8] = b"ENCRYPT";

/// HKDF info string selecting the padding sub-key.
pub const HKDF_INFO_PAD: &[u8] = b"PAD";

/// Byte separating comment text from random filler inside the comments block.
/// `0xFF` can never appear in valid UTF-8, so the split point is unambiguous.
pub const COMMENTS_SEPARATOR: u8 = 0xFF;

/// Numerator of the padding-size fraction (25%).
pub const PAD_SIZE_PERCENT: u64 = 25;

/// Size of the I/O chunk used by the random writer and the embed/extract
/// engine, independent of `MAX_PT_CHUNK_SIZE` since neither path runs a MAC.
pub const IO_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Minimum interval between progress bar redraws.
pub const PROGRESS_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);
