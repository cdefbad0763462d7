//! Encoded-size estimation
//!
//! Payloads travel as base64 text, which inflates them by 4/3.

/// Estimated size of `raw_len` bytes once encoded for transport: `ceil(raw_len * 4 / 3)`
pub const fn encoded_size(raw_len: u64) -> u64 {
    raw_len.saturating_mul(4).div_ceil(3)
}
