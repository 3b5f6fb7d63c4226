//! Raw ChaCha20 keystream application with an externally managed nonce.
//!
//! This is a hazmat primitive: it provides confidentiality only. Authenticity
//! comes from [`crate::cipher::mac`], applied by the pipeline around every
//! chunk this module encrypts or decrypts.

use anyhow::{Result, anyhow};
use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};

use crate::cipher::nonce::NONCE_LEN;
use crate::config::KEY_LEN;

/// Encrypts or decrypts `data` in place with `enc_key` under the given
/// 12-byte nonce. ChaCha20 is its own inverse, so this single function
/// serves both encryption and decryption.
pub fn apply_keystream(enc_key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], data: &mut [u8]) -> Result<()> {
    let mut cipher = ChaCha20::new(enc_key.into(), nonce.into());
    cipher.try_apply_keystream(data).map_err(|_| anyhow!("chacha20 keystream application failed"))
}
