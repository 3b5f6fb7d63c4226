//! Chunk-level cryptographic primitives: the ChaCha20 keystream and the
//! keyed BLAKE2b MAC that authenticates every chunk it produces.

pub mod mac;
pub mod nonce;
pub mod stream;
