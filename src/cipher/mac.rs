//! Per-chunk keyed BLAKE2b message authentication.
//!
//! Every MAC tag in a cryptoblob commits to one logical chunk's ciphertext,
//! the chunk's byte length, the nonce that encrypted it, and a fixed tuple of
//! session values (the additional authenticated data, or AAD). Binding the
//! AAD into every tag means a chunk cannot be replayed into a different
//! cryptoblob, and the encryption key's identity is committed to via
//! `enc_key_hash` without ever revealing the key itself.

use subtle::ConstantTimeEq;

use crate::cipher::nonce::NONCE_LEN;
use crate::config::{KEY_LEN, MAC_TAG_LEN, SALT_LEN};

/// Session-wide values bound into every MAC tag.
pub struct Aad {
    pub enc_key_hash: [u8; MAC_TAG_LEN],
    pub argon2_salt: [u8; SALT_LEN],
    pub blake2_salt: [u8; SALT_LEN],
    pub encrypted_pad_ikm: Vec<u8>,
    pub padded_size: u64,
    pub pad_size: u64,
    pub contents_size: u64,
}

impl Aad {
    fn feed(&self, state: &mut blake2b_simd::State) {
        state.update(&self.enc_key_hash);
        state.update(&self.argon2_salt);
        state.update(&self.blake2_salt);
        state.update(&self.encrypted_pad_ikm);
        state.update(&self.padded_size.to_le_bytes());
        state.update(&self.pad_size.to_le_bytes());
        state.update(&self.contents_size.to_le_bytes());
    }
}

/// Accumulates one chunk's ciphertext ahead of finalizing its MAC tag.
pub struct ChunkMac {
    state: blake2b_simd::State,
    size_sum: u64,
}

impl ChunkMac {
    fn new(mac_key: &[u8; KEY_LEN]) -> Self {
        let state = blake2b_simd::Params::new().hash_length(MAC_TAG_LEN).key(mac_key).to_state();
        Self { state, size_sum: 0 }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
        self.size_sum += data.len() as u64;
    }

    pub fn finalize(mut self, nonce: &[u8; NONCE_LEN], aad: &Aad) -> [u8; MAC_TAG_LEN] {
        self.state.update(&self.size_sum.to_le_bytes());
        self.state.update(nonce);
        aad.feed(&mut self.state);

        let hash = self.state.finalize();
        let mut tag = [0u8; MAC_TAG_LEN];
        tag.copy_from_slice(hash.as_bytes());
        tag
    }
}

/// Starts a fresh [`ChunkMac`] under the session's `mac_key`.
pub fn start_chunk(mac_key: &[u8; KEY_LEN]) -> ChunkMac {
    ChunkMac::new(mac_key)
}

/// Constant-time comparison of a received tag against the locally computed one.
pub fn tags_match(received: &[u8], computed: &[u8; MAC_TAG_LEN]) -> bool {
    received.len() == MAC_TAG_LEN && bool::from(received.ct_eq(computed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aad() -> Aad {
        Aad {
            enc_key_hash: [1u8; MAC_TAG_LEN],
            argon2_salt: [2u8; SALT_LEN],
            blake2_salt: [3u8; SALT_LEN],
            encrypted_pad_ikm: vec![4u8; 8],
            padded_size: 1128,
            pad_size: 0,
            contents_size: 0,
        }
    }

    #[test]
    fn deterministic_and_key_dependent() {
        let key_a = [9u8; KEY_LEN];
        let key_b = [10u8; KEY_LEN];
        let nonce = [5u8; NONCE_LEN];

        let mut m1 = start_chunk(&key_a);
        m1.update(b"ciphertext bytes");
        let tag1 = m1.finalize(&nonce, &aad());

        let mut m2 = start_chunk(&key_a);
        m2.update(b"ciphertext bytes");
        let tag2 = m2.finalize(&nonce, &aad());
        assert_eq!(tag1, tag2);

        let mut m3 = start_chunk(&key_b);
        m3.update(b"ciphertext bytes");
        let tag3 = m3.finalize(&nonce, &aad());
        assert_ne!(tag1, tag3);
    }

    #[test]
    fn aad_binding_detects_tamper() {
        let key = [1u8; KEY_LEN];
        let nonce = [5u8; NONCE_LEN];

        let mut m = start_chunk(&key);
        m.update(b"data");
        let tag = m.finalize(&nonce, &aad());

        let mut tampered = aad();
        tampered.pad_size = 1;
        let mut m2 = start_chunk(&key);
        m2.update(b"data");
        let tag2 = m2.finalize(&nonce, &tampered);

        assert!(!tags_match(&tag2, &tag));
    }
}
