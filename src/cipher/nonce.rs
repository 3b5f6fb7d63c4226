//! The 96-bit monotonic counter shared by the stream cipher and the MAC.
//!
//! A cryptoblob never reuses a nonce under the same key: every stream-cipher
//! invocation and every MAC chunk draws the next value from one counter,
//! starting at zero and advancing before each use.

/// Width of the counter as stored in the cryptoblob's MAC terminator field.
pub const NONCE_LEN: usize = 12;

#[derive(Clone, Copy, Default)]
pub struct NonceCounter(u128);

impl NonceCounter {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Advances the counter and returns the new value's 12-byte little-endian
    /// encoding, ready to feed both ChaCha20's IV and the MAC terminator.
    pub fn advance(&mut self) -> [u8; NONCE_LEN] {
        self.0 += 1;
        let full = self.0.to_le_bytes();
        let mut out = [0u8; NONCE_LEN];
        out.copy_from_slice(&full[..NONCE_LEN]);
        out
    }
}
