//! Numeric code generation and comparison.

use rand::Rng;
use subtle::ConstantTimeEq;

/// Generates a uniformly random numeric code of `length` digits.
pub fn generate_numeric_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Constant-time comparison of a submitted code against the issued one.
pub fn codes_match(issued: &str, submitted: &str) -> bool {
    issued.as_bytes().ct_eq(submitted.trim().as_bytes()).into()
}
