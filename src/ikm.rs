//! Input keying material: turning keyfiles, keyfile directories, and a
//! passphrase into the single 32-byte digest Argon2id stretches.
//!
//! Every digest is salted and personalized with `blake2_salt`, so the same
//! keyfile contributes a different digest to every cryptoblob. Digests are
//! folded in sorted order, which is what makes the final `argon2_password`
//! independent of the order keyfiles were supplied in.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

use crate::config::{MAX_PASSPHRASE_BYTES, PERSON_KEYFILE, PERSON_PASSPHRASE, SALT_LEN};

const DIGEST_LEN: usize = 32;

fn keyed_digest(data: &[u8], blake2_salt: &[u8; SALT_LEN], person: &[u8; 16]) -> [u8; DIGEST_LEN] {
    let hash = blake2b_simd::Params::new().hash_length(DIGEST_LEN).salt(blake2_salt).personal(person).hash(data);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// Hashes a single keyfile's contents.
pub fn hash_keyfile(path: &Path, blake2_salt: &[u8; SALT_LEN]) -> Result<[u8; DIGEST_LEN]> {
    let data = fs::read(path).with_context(|| format!("failed to read keyfile {}", path.display()))?;
    Ok(keyed_digest(&data, blake2_salt, PERSON_KEYFILE))
}

/// Recursively hashes every regular file in a directory. Any I/O error
/// anywhere in the walk aborts the whole directory: it contributes no
/// digests rather than a partial set.
pub fn hash_keyfile_directory(dir: &Path, blake2_salt: &[u8; SALT_LEN]) -> Result<Vec<[u8; DIGEST_LEN]>> {
    let mut digests = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("failed to walk directory {}", dir.display()))?;
        if entry.file_type().is_file() {
            digests.push(hash_keyfile(entry.path(), blake2_salt)?);
        }
    }
    Ok(digests)
}

/// Normalizes, truncates, and hashes a passphrase.
///
/// Normalization is NFC so visually identical passphrases typed on different
/// input methods hash identically. Truncation happens on the UTF-8 encoded
/// bytes, not on `char`s, matching the comments-block truncation rule.
pub fn hash_passphrase(passphrase: &str, blake2_salt: &[u8; SALT_LEN]) -> [u8; DIGEST_LEN] {
    let normalized: String = passphrase.nfc().collect();
    let mut bytes = normalized.into_bytes();
    bytes.truncate(MAX_PASSPHRASE_BYTES);
    keyed_digest(&bytes, blake2_salt, PERSON_PASSPHRASE)
}

/// Collects every keyfile/directory/passphrase digest, sorts them, and folds
/// them into the 32-byte `argon2_password` with one more salted BLAKE2b pass.
/// The result is independent of the order `keyfile_paths` was supplied in.
pub fn collect_argon2_password(keyfile_paths: &[impl AsRef<Path>], passphrase: Option<&str>, blake2_salt: &[u8; SALT_LEN]) -> Result<[u8; DIGEST_LEN]> {
    let mut digests = Vec::new();

    for path in keyfile_paths {
        let path = path.as_ref();
        if path.is_dir() {
            digests.extend(hash_keyfile_directory(path, blake2_salt)?);
        } else {
            digests.push(hash_keyfile(path, blake2_salt)?);
        }
    }

    if let Some(passphrase) = passphrase {
        digests.push(hash_passphrase(passphrase, blake2_salt));
    }

    digests.sort_unstable();

    let mut state = blake2b_simd::Params::new().hash_length(DIGEST_LEN).salt(blake2_salt).to_state();
    for digest in &digests {
        state.update(digest);
    }
    let hash = state.finalize();

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(hash.as_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn passphrase_digest_is_deterministic() {
        let salt = [0u8; SALT_LEN];
        assert_eq!(hash_passphrase("hello", &salt), hash_passphrase("hello", &salt));
    }

    #[test]
    fn different_salts_diverge() {
        assert_ne!(hash_passphrase("hello", &[0u8; SALT_LEN]), hash_passphrase("hello", &[1u8; SALT_LEN]));
    }

    #[test]
    fn truncates_long_passphrase() {
        let salt = [2u8; SALT_LEN];
        let short = "a".repeat(MAX_PASSPHRASE_BYTES);
        let long = "a".repeat(MAX_PASSPHRASE_BYTES + 500);
        assert_eq!(hash_passphrase(&short, &salt), hash_passphrase(&long, &salt));
    }

    #[test]
    fn keyfile_order_is_irrelevant() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.key");
        let b = dir.path().join("b.key");
        File::create(&a).unwrap().write_all(b"alpha").unwrap();
        File::create(&b).unwrap().write_all(b"bravo").unwrap();

        let salt = [9u8; SALT_LEN];
        let forward = collect_argon2_password(&[a.clone(), b.clone()], None, &salt).unwrap();
        let backward = collect_argon2_password(&[b, a], None, &salt).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn directory_scan_finds_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        File::create(dir.path().join("top.key")).unwrap().write_all(b"top").unwrap();
        File::create(nested.join("deep.key")).unwrap().write_all(b"deep").unwrap();

        let salt = [4u8; SALT_LEN];
        let digests = hash_keyfile_directory(dir.path(), &salt).unwrap();
        assert_eq!(digests.len(), 2);
    }

    #[test]
    fn combining_keyfiles_and_passphrase_changes_result() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.key");
        File::create(&a).unwrap().write_all(b"alpha").unwrap();

        let salt = [5u8; SALT_LEN];
        let keyfile_only = collect_argon2_password(&[a.clone()], None, &salt).unwrap();
        let with_passphrase = collect_argon2_password(&[a], Some("extra"), &salt).unwrap();
        assert_ne!(keyfile_only, with_passphrase);
    }
}
