//! Constant-time comparison helpers
//!
//! Legacy plaintext credentials are compared through these helpers so that a
//! mismatch position cannot be recovered from response timing.

use subtle::ConstantTimeEq;

/// Constant-time comparison of two byte slices.
///
/// Slices of different length compare unequal; the length itself is not
/// treated as secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Constant-time comparison of two strings.
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
