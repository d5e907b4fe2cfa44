use anchor_lang::prelude::*;

use crate::{errors::PaymasterError, utils::window_expired};

/// Per-app rate and gas limits
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct AppLimits {
    // Length of the operation-count window in seconds
    pub rate_limit_period: u64,

    // Maximum number of sponsored operations per rate window
    pub rate_limit_threshold: u64,

    // Length of the gas-spend window in seconds
    pub gas_limit_period: u64,

    // Maximum lamports charged per gas window
    pub gas_limit_threshold: u64,
}

impl AppLimits {
    /// Both window periods must be non-zero
    pub fn validate(&self) -> Result<()> {
        require_gt!(self.rate_limit_period, 0, PaymasterError::InvalidLimits);
        require_gt!(self.gas_limit_period, 0, PaymasterError::InvalidLimits);
        Ok(())
    }
}

/// Fixed window counting sponsored operations
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct RateWindow {
    pub operation_count: u64,
    pub window_start: i64,
}

impl RateWindow {
    /// Returns the window as seen at `now`, reset if its period has elapsed
    pub fn rolled(&self, now: i64, period: u64) -> Result<Self> {
        if window_expired(now, self.window_start, period)? {
            Ok(Self {
                operation_count: 0,
                window_start: now,
            })
        } else {
            Ok(*self)
        }
    }

    /// Counts one more operation, failing if that would pass `threshold`
    pub fn consume(&mut self, threshold: u64) -> Result<()> {
        let next = self
            .operation_count
            .checked_add(1)
            .ok_or(PaymasterError::MathOverflow)?;

        if next > threshold {
            msg!(
                "Rate limit exceeded: {} operations allowed per window",
                threshold
            );
            return err!(PaymasterError::RateLimitExceeded);
        }

        self.operation_count = next;
        Ok(())
    }
}

/// Fixed window summing lamports provisionally or finally charged
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct GasWindow {
    pub gas_spent: u64,
    pub window_start: i64,
}

impl GasWindow {
    /// Returns the window as seen at `now`, reset if its period has elapsed
    pub fn rolled(&self, now: i64, period: u64) -> Result<Self> {
        if window_expired(now, self.window_start, period)? {
            Ok(Self {
                gas_spent: 0,
                window_start: now,
            })
        } else {
            Ok(*self)
        }
    }

    /// Adds `cost` to the window, failing if the total would pass `threshold`
    pub fn consume(&mut self, cost: u64, threshold: u64) -> Result<()> {
        let next = self
            .gas_spent
            .checked_add(cost)
            .ok_or(PaymasterError::MathOverflow)?;

        if next > threshold {
            msg!(
                "Gas limit exceeded: {} spent of {} allowed, requested {}",
                self.gas_spent,
                threshold,
                cost
            );
            return err!(PaymasterError::GasLimitExceeded);
        }

        self.gas_spent = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_require_non_zero_periods() {
        let limits = AppLimits {
            rate_limit_period: 60,
            rate_limit_threshold: 10,
            gas_limit_period: 0,
            gas_limit_threshold: 1_000,
        };
        assert_eq!(
            limits.validate().unwrap_err(),
            PaymasterError::InvalidLimits.into()
        );

        let limits = AppLimits {
            gas_limit_period: 3_600,
            ..limits
        };
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_blocks_everything() {
        let mut window = RateWindow::default();
        assert_eq!(
            window.consume(0).unwrap_err(),
            PaymasterError::RateLimitExceeded.into()
        );
        assert_eq!(window.operation_count, 0);
    }

    #[test]
    fn test_rate_window_keeps_count_inside_period() {
        let window = RateWindow {
            operation_count: 7,
            window_start: 1_000,
        };
        assert_eq!(window.rolled(1_030, 60).unwrap(), window);
    }

    #[test]
    fn test_rate_window_resets_after_period() {
        let window = RateWindow {
            operation_count: 7,
            window_start: 1_000,
        };
        let rolled = window.rolled(1_060, 60).unwrap();
        assert_eq!(rolled.operation_count, 0);
        assert_eq!(rolled.window_start, 1_060);
    }

    #[test]
    fn test_gas_window_exact_threshold_is_allowed() {
        let mut window = GasWindow {
            gas_spent: 400,
            window_start: 0,
        };
        window.consume(600, 1_000).unwrap();
        assert_eq!(window.gas_spent, 1_000);

        assert_eq!(
            window.consume(1, 1_000).unwrap_err(),
            PaymasterError::GasLimitExceeded.into()
        );
        assert_eq!(window.gas_spent, 1_000);
    }

    #[test]
    fn test_gas_window_overflow() {
        let mut window = GasWindow {
            gas_spent: u64::MAX,
            window_start: 0,
        };
        assert_eq!(
            window.consume(1, u64::MAX).unwrap_err(),
            PaymasterError::MathOverflow.into()
        );
    }
}
