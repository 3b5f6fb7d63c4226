//! End-to-end scenarios exercising the pipeline, embed/extract, and random-fill
//! engines together, the way the interactive menu wires them.

use std::io::Cursor;

use purbox::config::{COMMENTS_LEN, MAC_TAG_LEN, MIN_UNPADDED_SIZE, PAD_IKM_LEN, SALT_LEN};
use purbox::embed;
use purbox::error::ActionError;
use purbox::pipeline::{self, Credentials};
use purbox::random_io;

fn creds(passphrase: &'static str) -> Credentials<'static> {
    Credentials { keyfile_paths: &[], passphrase: Some(passphrase), time_cost: 4 }
}

/// S1: an empty plaintext produces a cryptoblob whose size matches the
/// layout formula exactly, for whatever padding the random pad key happened
/// to pick.
#[test]
fn empty_plaintext_matches_size_formula() {
    let mut output = Vec::new();
    let padded_size = pipeline::encrypt(&mut Cursor::new(b""), 0, "", &mut output, &creds("test"), &mut ()).unwrap();

    assert_eq!(output.len() as u64, padded_size);
    let unpadded_size = MIN_UNPADDED_SIZE;
    assert!(padded_size >= unpadded_size + SALT_LEN as u64);
    assert!(padded_size - unpadded_size - SALT_LEN as u64 <= unpadded_size / 4 + 1);

    assert_eq!(2 * SALT_LEN + PAD_IKM_LEN + 2 * MAC_TAG_LEN + COMMENTS_LEN, MIN_UNPADDED_SIZE as usize);
}

/// S2: two independent encryptions of the same plaintext under keyfiles plus
/// a passphrase differ in every meaningful byte yet both recover the
/// original plaintext.
#[test]
fn independent_encryptions_diverge_but_both_decrypt() {
    let dir = tempfile::tempdir().unwrap();
    let keyfile_a = dir.path().join("a.key");
    let keyfile_b = dir.path().join("b.key");
    std::fs::write(&keyfile_a, [0xAAu8; 4]).unwrap();
    std::fs::write(&keyfile_b, [0xBBu8; 8]).unwrap();
    let keyfiles = vec![keyfile_a, keyfile_b];

    let plaintext = vec![0u8; 1024 * 1024];
    let creds = Credentials { keyfile_paths: &keyfiles, passphrase: Some("pw"), time_cost: 4 };

    let mut out1 = Vec::new();
    let padded1 = pipeline::encrypt(&mut Cursor::new(&plaintext), plaintext.len() as u64, "", &mut out1, &creds, &mut ()).unwrap();
    let mut out2 = Vec::new();
    let padded2 = pipeline::encrypt(&mut Cursor::new(&plaintext), plaintext.len() as u64, "", &mut out2, &creds, &mut ()).unwrap();
    assert_ne!(out1, out2);

    for (padded, out) in [(padded1, &out1), (padded2, &out2)] {
        let salt: [u8; SALT_LEN] = out[out.len() - SALT_LEN..].try_into().unwrap();
        let body = &out[..out.len() - SALT_LEN];
        let mut recovered = Vec::new();
        pipeline::decrypt(&mut Cursor::new(body), padded, salt, &mut recovered, &creds, false, &mut ()).unwrap();
        assert_eq!(recovered, plaintext);
    }
}

/// S3: flipping the first byte of `encrypted_pad_ikm` (offset 17, right
/// after the 16-byte argon2 salt) must be caught as an authentication
/// failure, not silently accepted.
#[test]
fn bit_flip_at_encrypted_pad_ikm_is_rejected() {
    let mut output = Vec::new();
    let padded_size = pipeline::encrypt(&mut Cursor::new(b""), 0, "test", &mut output, &creds("test"), &mut ()).unwrap();
    let blake2_salt: [u8; SALT_LEN] = output[output.len() - SALT_LEN..].try_into().unwrap();
    let mut body = output[..output.len() - SALT_LEN].to_vec();

    body[17] ^= 0x01;
    let mut sink = Vec::new();
    let err = pipeline::decrypt(&mut Cursor::new(body), padded_size, blake2_salt, &mut sink, &creds("test"), false, &mut ()).unwrap_err();
    // A corrupt `encrypted_pad_ikm` desynchronizes `pad_key`, so the failure
    // surfaces either as a rejected pad size or as a MAC mismatch depending on
    // how the garbage pad size interacts with the padding formula; both are
    // reported identically to the operator.
    assert!(matches!(err, ActionError::AuthenticationFailure | ActionError::SizeValidation));
}

/// S4: a fresh container, encrypted-and-embedded at an offset, comes back
/// out through extract-and-decrypt intact.
#[test]
fn encrypt_embed_then_extract_decrypt_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let container_path = dir.path().join("container.bin");
    {
        let mut container = std::fs::File::create(&container_path).unwrap();
        random_io::write_random(&mut container, 16 * 1024 * 1024, &mut ()).unwrap();
    }

    let plaintext = vec![0x5Au8; 100];
    let creds = creds("pw");

    let mut cryptoblob = Vec::new();
    let padded_size = pipeline::encrypt(&mut Cursor::new(&plaintext), plaintext.len() as u64, "round trip", &mut cryptoblob, &creds, &mut ()).unwrap();

    let start = 1024 * 1024;
    let mut container = std::fs::File::options().read(true).write(true).open(&container_path).unwrap();
    let embed_report = embed::embed(&mut Cursor::new(&cryptoblob), padded_size, &mut container, start, &mut ()).unwrap();
    assert_eq!(embed_report.end_pos, start + padded_size);

    let mut extracted = Vec::new();
    embed::extract(&mut container, embed_report.start_pos, embed_report.end_pos, &mut extracted, &mut ()).unwrap();
    assert_eq!(extracted, cryptoblob);

    let split = extracted.len() - SALT_LEN;
    let blake2_salt: [u8; SALT_LEN] = extracted[split..].try_into().unwrap();
    let body = extracted[..split].to_vec();

    let mut recovered = Vec::new();
    let outcome = pipeline::decrypt(&mut Cursor::new(body), padded_size, blake2_salt, &mut recovered, &creds, false, &mut ()).unwrap();
    assert_eq!(recovered, plaintext);
    assert_eq!(outcome.comments, "round trip");
}

/// S5: overwriting the first half of a file with random bytes leaves the
/// second half byte-identical to the original.
#[test]
fn overwrite_preserves_untouched_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target.bin");
    let original = vec![0x77u8; 2 * 1024 * 1024];
    std::fs::write(&path, &original).unwrap();

    let mut file = std::fs::File::options().read(true).write(true).open(&path).unwrap();
    random_io::write_random(&mut file, 1024 * 1024, &mut ()).unwrap();
    drop(file);

    let after = std::fs::read(&path).unwrap();
    assert_ne!(after[..1024 * 1024], original[..1024 * 1024]);
    assert_eq!(after[1024 * 1024..], original[1024 * 1024..]);
}

/// S6: a file shorter than the minimum possible cryptoblob size is rejected
/// immediately, before any key derivation is attempted.
#[test]
fn undersized_file_is_rejected_before_derivation() {
    let mut sink = Vec::new();
    let err = pipeline::decrypt(&mut Cursor::new(vec![0u8; 1127]), 1127, [0u8; SALT_LEN], &mut sink, &creds("test"), false, &mut ()).unwrap_err();
    assert!(matches!(err, ActionError::SizeValidation));
}
