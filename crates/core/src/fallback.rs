//! Placeholder slide count for the degraded render path.
//!
//! The estimate is a rough approximation derived from byte size only. It has
//! no relationship to the real slide boundaries of the source.

use serde::Serialize;

/// Bytes of source attributed to one estimated slide (10 KiB).
pub const BYTES_PER_ESTIMATED_SLIDE: usize = 10 * 1024;

/// Fewest placeholder slides ever produced.
pub const MIN_ESTIMATED_SLIDES: usize = 1;

/// Most placeholder slides ever produced.
pub const MAX_ESTIMATED_SLIDES: usize = 30;

/// Slide count derived from the byte length of a fetched source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FallbackEstimate {
    pub slide_count: usize,
}

impl FallbackEstimate {
    /// `clamp(floor(byte_len / 1024 / 10), 1, 30)`.
    ///
    /// Monotonic non-decreasing in `byte_len` and deterministic.
    pub fn from_byte_len(byte_len: usize) -> Self {
        let slide_count = (byte_len / BYTES_PER_ESTIMATED_SLIDE)
            .clamp(MIN_ESTIMATED_SLIDES, MAX_ESTIMATED_SLIDES);
        Self { slide_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_200_kib() {
        assert_eq!(FallbackEstimate::from_byte_len(204_800).slide_count, 20);
    }

    #[test]
    fn test_estimate_lower_bound() {
        assert_eq!(FallbackEstimate::from_byte_len(0).slide_count, 1);
        assert_eq!(FallbackEstimate::from_byte_len(10_239).slide_count, 1);
        assert_eq!(FallbackEstimate::from_byte_len(20_480).slide_count, 2);
    }

    #[test]
    fn test_estimate_upper_bound() {
        assert_eq!(FallbackEstimate::from_byte_len(307_200).slide_count, 30);
        assert_eq!(FallbackEstimate::from_byte_len(50 * 1024 * 1024).slide_count, 30);
    }

    #[test]
    fn test_estimate_monotonic() {
        let mut previous = 0;
        for len in (0..400_000).step_by(1_000) {
            let count = FallbackEstimate::from_byte_len(len).slide_count;
            assert!(count >= previous);
            assert!((MIN_ESTIMATED_SLIDES..=MAX_ESTIMATED_SLIDES).contains(&count));
            previous = count;
        }
    }
}
