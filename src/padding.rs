//! Deterministic padding-size derivation.
//!
//! A cryptoblob's padding length is not random noise picked independently of
//! its key material: it is a function of the secret `pad_key`, so an
//! observer who doesn't know `pad_key` cannot tell padded size from payload
//! size, and the legitimate holder can recompute the padding length on
//! decrypt from nothing but `padded_size` and `pad_key`.

use crate::config::PAD_SIZE_PERCENT;

/// `2^64`, the size of the space `pad_key` is drawn from.
const PAD_KEY_SPACE: u128 = 1u128 << 64;

/// Forward direction, used while encrypting: derive `pad_size` from the
/// cryptoblob's unpadded size and the secret `pad_key`.
#[must_use]
pub fn forward(unpadded_size: u64, pad_key: u64) -> u64 {
    let numerator = u128::from(unpadded_size) * u128::from(pad_key) * u128::from(PAD_SIZE_PERCENT);
    let denominator = PAD_KEY_SPACE * 100;
    (numerator / denominator) as u64
}

/// Inverse direction, used while decrypting: recover `pad_size` from the
/// cryptoblob's total padded size and the secret `pad_key`, without needing
/// to know the unpadded size in advance.
#[must_use]
pub fn inverse(padded_size: u64, pad_key: u64) -> u64 {
    let numerator = u128::from(padded_size) * u128::from(pad_key) * u128::from(PAD_SIZE_PERCENT);
    let denominator = u128::from(pad_key) * u128::from(PAD_SIZE_PERCENT) + PAD_KEY_SPACE * 100;
    (numerator / denominator) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_then_inverse_round_trips() {
        for unpadded in [1128u64, 1128 + 1, 1128 + 1_000_000, 1128 + (1 << 20)] {
            for pad_key in [0u64, 1, u64::MAX / 3, u64::MAX] {
                let pad_size = forward(unpadded, pad_key);
                let padded = unpadded + pad_size;
                assert_eq!(inverse(padded, pad_key), pad_size, "unpadded={unpadded} pad_key={pad_key}");
            }
        }
    }

    #[test]
    fn zero_pad_key_means_zero_padding() {
        assert_eq!(forward(1_000_000, 0), 0);
    }

    #[test]
    fn padding_never_exceeds_a_quarter() {
        let unpadded = 1_000_000u64;
        let pad_size = forward(unpadded, u64::MAX);
        assert!(pad_size <= unpadded / 4 + 1);
    }

    #[test]
    fn padding_grows_with_pad_key() {
        let unpadded = 10_000_000u64;
        assert!(forward(unpadded, 1000) <= forward(unpadded, u64::MAX));
    }
}
