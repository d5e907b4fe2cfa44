use anchor_lang::prelude::*;

use crate::errors::PaymasterError;

/// Whether a fixed window that started at `window_start` has fully elapsed at `now`.
/// # Arguments
/// * `now` - The current unix timestamp in seconds.
/// * `window_start` - The timestamp at which the window was opened.
/// * `period` - The length of the window in seconds.
/// # Returns
/// * `Result<bool>` - True once `now - window_start >= period`.
#[inline(always)]
pub fn window_expired(now: i64, window_start: i64, period: u64) -> Result<bool> {
    let elapsed = now
        .checked_sub(window_start)
        .ok_or(PaymasterError::MathOverflow)?;

    require_gte!(elapsed, 0, PaymasterError::NegativeTimeSinceWindowStart);

    Ok(elapsed as u64 >= period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_open_before_period() {
        assert!(!window_expired(1_059, 1_000, 60).unwrap());
    }

    #[test]
    fn test_window_expires_when_elapsed_equals_period() {
        assert!(window_expired(1_060, 1_000, 60).unwrap());
    }

    #[test]
    fn test_window_expires_after_period() {
        assert!(window_expired(5_000, 1_000, 60).unwrap());
    }

    #[test]
    fn test_never_opened_window_is_expired() {
        // Zeroed windows from a fresh account roll over on first use
        assert!(window_expired(1_700_000_000, 0, 3_600).unwrap());
    }

    #[test]
    fn test_no_time_passed() {
        assert!(!window_expired(1_000, 1_000, 1).unwrap());
    }

    #[test]
    fn test_negative_time_since_window_start() {
        let result = window_expired(990, 1_000, 60);
        assert_eq!(
            result.unwrap_err(),
            PaymasterError::NegativeTimeSinceWindowStart.into()
        );
    }

    #[test]
    fn test_overflowing_subtraction() {
        assert!(window_expired(i64::MIN, 1, 60).is_err());
    }
}
