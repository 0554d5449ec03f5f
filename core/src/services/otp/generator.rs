//! Passcode generation

use rand::{rngs::OsRng, Rng};

/// Generate a numeric code of `length` digits from the operating system CSPRNG.
///
/// Each digit is drawn with `gen_range`, which rejects out-of-range samples
/// instead of reducing modulo 10, so every one of the `10^length` codes is
/// equally likely. Leading zeros are kept.
pub fn generate_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
