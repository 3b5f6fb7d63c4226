//! purbox - offline file encryption producing padded, uniform, random-looking
//! cryptoblobs.
//!
//! - ChaCha20 keystream with an externally managed nonce counter, keyed by an
//!   Argon2id + HKDF-SHA-256 schedule, each chunk committed by a keyed
//!   BLAKE2b-32 MAC
//! - A secret-dependent padding size hides the plaintext length to within a
//!   quarter of the cryptoblob
//! - Plain positional embed/extract into a pre-existing container, for
//!   steganographic storage

pub mod app;
pub mod cipher;
pub mod cli;
pub mod config;
pub mod embed;
pub mod error;
pub mod ikm;
pub mod io_util;
pub mod keys;
pub mod padding;
pub mod pipeline;
pub mod random_io;
pub mod signal;
pub mod types;
pub mod ui;
