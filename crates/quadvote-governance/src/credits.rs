//! Credit calculation for quadratic voting.
//!
//! A voter's weight is `floor(sqrt(balance))` of their credential holding,
//! so doubling influence costs four times the stake.

/// Largest balance for which `(balance as f64).sqrt()` is guaranteed exact.
///
/// Above 2^52 an `f64` can no longer represent every integer, and a float
/// square root may round across an integer boundary. [`credits`] uses integer
/// arithmetic only and is exact for every `u64`.
pub const F64_EXACT_BALANCE_LIMIT: u64 = 1 << 52;

/// Credits granted for `balance`: `floor(sqrt(balance))`.
///
/// Monotonic non-decreasing, `credits(0) == 0`, and `credits(u64::MAX)`
/// is `u32::MAX`.
pub fn credits(balance: u64) -> u64 {
    integer_sqrt(balance)
}

/// Integer square root using Newton's method.
/// Returns floor(sqrt(n)).
pub fn integer_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }

    // (n + 1) / 2 without overflowing at u64::MAX
    let mut x = n;
    let mut y = n / 2 + (n & 1);

    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }

    x
}
