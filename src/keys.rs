//! Argon2id key stretch and HKDF-SHA-256 key schedule.
//!
//! The Argon2id pass is the expensive, memory-hard step; everything derived
//! from its output is a cheap HKDF expansion, so the cost of a brute-force
//! attempt is dominated entirely by `ARGON2_MEMORY_KIB` and `time_cost`.

use anyhow::{Result, anyhow, ensure};
use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::config::{ARGON2_MEMORY_KIB, ARGON2_PARALLELISM, HKDF_INFO_ENCRYPT, HKDF_INFO_MAC, HKDF_INFO_PAD, KEY_LEN, MIN_ARGON2_TIME_COST, PAD_IKM_LEN};

/// The two sub-keys and the key-commitment hash produced from one Argon2id
/// tag. Neither `enc_key` nor `mac_key` is ever derived from the other.
#[derive(Debug)]
pub struct KeySchedule {
    pub enc_key: [u8; KEY_LEN],
    pub mac_key: [u8; KEY_LEN],
    pub enc_key_hash: [u8; KEY_LEN],
}

/// Stretches `argon2_password` (the folded IKM digest) with Argon2id and
/// splits the result into `enc_key`/`mac_key` via HKDF-SHA-256.
pub fn derive_key_schedule(argon2_password: &[u8], argon2_salt: &[u8], time_cost: u32) -> Result<KeySchedule> {
    derive_key_schedule_with_memory(argon2_password, argon2_salt, time_cost, ARGON2_MEMORY_KIB)
}

/// Same as [`derive_key_schedule`] but with the memory cost as a parameter,
/// so tests and benchmarks can stretch with a fraction of the production
/// 1 GiB footprint without duplicating the HKDF split logic.
pub(crate) fn derive_key_schedule_with_memory(argon2_password: &[u8], argon2_salt: &[u8], time_cost: u32, memory_kib: u32) -> Result<KeySchedule> {
    ensure!(time_cost >= MIN_ARGON2_TIME_COST, "argon2 time cost must be at least {MIN_ARGON2_TIME_COST}");

    let params = Params::new(memory_kib, time_cost, ARGON2_PARALLELISM, Some(KEY_LEN)).map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut tag = [0u8; KEY_LEN];
    argon2.hash_password_into(argon2_password, argon2_salt, &mut tag).map_err(|e| anyhow!("argon2id derivation failed: {e}"))?;

    let hk = Hkdf::<Sha256>::new(None, &tag);
    tag.zeroize();

    let mut mac_key = [0u8; KEY_LEN];
    hk.expand(HKDF_INFO_MAC, &mut mac_key).map_err(|e| anyhow!("hkdf expand (mac) failed: {e}"))?;
    let mut enc_key = [0u8; KEY_LEN];
    hk.expand(HKDF_INFO_ENCRYPT, &mut enc_key).map_err(|e| anyhow!("hkdf expand (encrypt) failed: {e}"))?;

    let enc_key_hash = {
        let hash = blake2b_simd::Params::new().hash_length(KEY_LEN).hash(&enc_key);
        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(hash.as_bytes());
        out
    };

    Ok(KeySchedule { enc_key, mac_key, enc_key_hash })
}

/// Derives the 8-byte `pad_key` (as a little-endian integer) from `pad_ikm`.
pub fn derive_pad_key(pad_ikm: &[u8; PAD_IKM_LEN]) -> Result<u64> {
    let hk = Hkdf::<Sha256>::new(None, pad_ikm);
    let mut out = [0u8; PAD_IKM_LEN];
    hk.expand(HKDF_INFO_PAD, &mut out).map_err(|e| anyhow!("hkdf expand (pad) failed: {e}"))?;
    Ok(u64::from_le_bytes(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Memory cost low enough that the full test suite runs in well under a
    /// second; production always uses `ARGON2_MEMORY_KIB` (1 GiB).
    const TEST_MEMORY_KIB: u32 = 16;

    fn derive_with_test_params(password: &[u8], salt: &[u8]) -> KeySchedule {
        derive_key_schedule_with_memory(password, salt, MIN_ARGON2_TIME_COST, TEST_MEMORY_KIB).unwrap()
    }

    #[test]
    fn enc_and_mac_keys_differ() {
        let ks = derive_with_test_params(b"ikm", &[0u8; 16]);
        assert_ne!(ks.enc_key, ks.mac_key);
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let a = derive_with_test_params(b"ikm", &[1u8; 16]);
        let b = derive_with_test_params(b"ikm", &[1u8; 16]);
        assert_eq!(a.enc_key, b.enc_key);
        assert_eq!(a.mac_key, b.mac_key);
    }

    #[test]
    fn different_salts_diverge() {
        let a = derive_with_test_params(b"ikm", &[1u8; 16]);
        let b = derive_with_test_params(b"ikm", &[2u8; 16]);
        assert_ne!(a.enc_key, b.enc_key);
    }

    #[test]
    fn pad_key_is_order_independent_of_session_keys() {
        let k1 = derive_pad_key(&[0u8; PAD_IKM_LEN]).unwrap();
        let k2 = derive_pad_key(&[0u8; PAD_IKM_LEN]).unwrap();
        assert_eq!(k1, k2);
        let k3 = derive_pad_key(&[1u8; PAD_IKM_LEN]).unwrap();
        assert_ne!(k1, k3);
    }

    #[test]
    fn rejects_time_cost_below_floor() {
        let err = derive_key_schedule(b"ikm", &[0u8; 16], MIN_ARGON2_TIME_COST - 1).unwrap_err();
        assert!(err.to_string().contains("time cost"));
    }
}
