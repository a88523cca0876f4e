//! # Media Time Arithmetic
//!
//! All pipeline timestamps are signed 64-bit microseconds. Conversions
//! that would leave that range must fail explicitly instead of wrapping.

/// Microseconds per second.
pub const USECS_PER_S: i64 = 1_000_000;

/// Convert a frame count at `rate` Hz into microseconds.
///
/// Returns `None` if the intermediate product overflows or `rate` is
/// zero. Truncates toward zero like the rest of the pipeline's integer
/// time math.
pub fn frames_to_usecs(frames: i64, rate: u32) -> Option<i64> {
    if rate == 0 {
        return None;
    }
    frames.checked_mul(USECS_PER_S)?.checked_div(rate as i64)
}
