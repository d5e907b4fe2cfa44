use anchor_lang::prelude::*;

use crate::{
    errors::PaymasterError,
    state::{AppLimits, GasWindow, RateWindow},
};

/// SponsorAccount state account - deposit ledger and limiter state for one app
/// The account also holds the deposited lamports on top of its rent reserve
#[account]
#[derive(InitSpace, Debug)]
pub struct SponsorAccount {
    // The app this balance belongs to
    pub app: Pubkey,

    // Prepaid lamports credited to the app
    pub balance: u64,

    // Sum of the costs reserved by operations awaiting settlement
    // The withdrawable balance is `balance - locked`
    pub locked: u64,

    // Slot at which a pending withdrawal may be finalized, zero when none is pending
    pub unlock_slot: u64,

    // Lifetime lamports charged at settlement
    pub total_spent: u64,

    // Operation count for the current rate window
    pub rate_window: RateWindow,

    // Lamports spent in the current gas window
    pub gas_window: GasWindow,

    // Limits set by a paymaster admin, used instead of the registry limits when present
    pub limit_override: Option<AppLimits>,

    // The bump used to derive the PDA for this account
    // Stored so we don't need to recalculate it later
    pub bump: u8,
}

impl SponsorAccount {
    pub fn is_initialized(&self) -> bool {
        self.app != Pubkey::default()
    }

    pub fn available_balance(&self) -> Result<u64> {
        self.balance
            .checked_sub(self.locked)
            .ok_or(PaymasterError::MathOverflow.into())
    }

    pub fn has_pending_withdrawal(&self) -> bool {
        self.unlock_slot != 0
    }

    /// Limits that apply to this app, given the limits recorded in the registry
    pub fn effective_limits(&self, registry_limits: &AppLimits) -> AppLimits {
        self.limit_override.unwrap_or(*registry_limits)
    }

    /// Credits a deposit to the app balance
    /// # Arguments
    /// * `amount` - The number of lamports deposited
    /// # Returns
    /// * `Result<u64>` - The balance after the deposit
    pub fn credit(&mut self, amount: u64) -> Result<u64> {
        require_gt!(amount, 0, PaymasterError::InvalidAmount);

        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(PaymasterError::MathOverflow)?;

        Ok(self.balance)
    }

    /// Runs the limiter and balance checks for a user operation and reserves its cost.
    /// Both windows are rolled and counted on copies, so nothing is written unless
    /// every check passes.
    /// # Arguments
    /// * `limits` - The effective limits for the app
    /// * `now` - The current unix timestamp
    /// * `max_cost` - The maximum cost the operation may be charged
    /// # Returns
    /// * `Result<i64>` - The start of the gas window the reservation was counted in
    pub fn admit_user_op(&mut self, limits: &AppLimits, now: i64, max_cost: u64) -> Result<i64> {
        let mut rate_window = self.rate_window.rolled(now, limits.rate_limit_period)?;
        let mut gas_window = self.gas_window.rolled(now, limits.gas_limit_period)?;

        rate_window.consume(limits.rate_limit_threshold)?;
        gas_window.consume(max_cost, limits.gas_limit_threshold)?;

        let available = self.available_balance()?;
        if available < max_cost {
            msg!(
                "Insufficient sponsor balance: {} available, {} required",
                available,
                max_cost
            );
            return err!(PaymasterError::InsufficientBalance);
        }

        self.locked = self
            .locked
            .checked_add(max_cost)
            .ok_or(PaymasterError::MathOverflow)?;
        self.rate_window = rate_window;
        self.gas_window = gas_window;

        Ok(gas_window.window_start)
    }

    /// Releases a reservation and charges the final cost of the operation.
    /// If the gas window that counted the reservation is still open, the provisional
    /// `locked_cost` in it is replaced by the final charge.
    /// # Arguments
    /// * `locked_cost` - The cost reserved at validation
    /// * `actual_gas_cost` - The gas cost reported by the EntryPoint
    /// * `overhead` - The configured settlement overhead
    /// * `lock_gas_window_start` - The gas window start recorded with the reservation
    /// # Returns
    /// * `Result<u64>` - The number of lamports charged
    pub fn settle(
        &mut self,
        locked_cost: u64,
        actual_gas_cost: u64,
        overhead: u64,
        lock_gas_window_start: i64,
    ) -> Result<u64> {
        require_gte!(
            locked_cost,
            actual_gas_cost,
            PaymasterError::ActualCostExceedsLock
        );

        let charge = actual_gas_cost.saturating_add(overhead).min(locked_cost);

        self.locked = self
            .locked
            .checked_sub(locked_cost)
            .ok_or(PaymasterError::MathOverflow)?;
        self.balance = self
            .balance
            .checked_sub(charge)
            .ok_or(PaymasterError::MathOverflow)?;
        self.total_spent = self
            .total_spent
            .checked_add(charge)
            .ok_or(PaymasterError::MathOverflow)?;

        if self.gas_window.window_start == lock_gas_window_start {
            self.gas_window.gas_spent = self
                .gas_window
                .gas_spent
                .saturating_sub(locked_cost)
                .checked_add(charge)
                .ok_or(PaymasterError::MathOverflow)?;
        }

        Ok(charge)
    }

    /// Starts the withdrawal delay
    /// # Returns
    /// * `Result<u64>` - The slot at which the withdrawal unlocks
    pub fn request_withdraw(&mut self, current_slot: u64, delay_slots: u64) -> Result<u64> {
        require!(
            !self.has_pending_withdrawal(),
            PaymasterError::WithdrawalAlreadyRequested
        );

        self.unlock_slot = current_slot
            .checked_add(delay_slots)
            .ok_or(PaymasterError::MathOverflow)?;

        Ok(self.unlock_slot)
    }

    pub fn cancel_withdraw(&mut self) -> Result<()> {
        require!(
            self.has_pending_withdrawal(),
            PaymasterError::NoPendingWithdrawal
        );

        self.unlock_slot = 0;
        Ok(())
    }

    /// Debits an unlocked withdrawal and clears the pending request.
    /// Lamports are moved by the caller after this returns.
    /// # Returns
    /// * `Result<u64>` - The balance after the withdrawal
    pub fn withdraw(&mut self, current_slot: u64, amount: u64) -> Result<u64> {
        require!(
            self.has_pending_withdrawal(),
            PaymasterError::NoPendingWithdrawal
        );
        require_gte!(
            current_slot,
            self.unlock_slot,
            PaymasterError::WithdrawalLocked
        );
        require_gt!(amount, 0, PaymasterError::InvalidAmount);

        let available = self.available_balance()?;
        if amount > available {
            msg!(
                "Withdrawal of {} exceeds available balance {}",
                amount,
                available
            );
            return err!(PaymasterError::InsufficientBalance);
        }

        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(PaymasterError::MathOverflow)?;
        self.unlock_slot = 0;

        Ok(self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: i64 = 1_700_000_000;

    fn create_test_limits() -> AppLimits {
        AppLimits {
            rate_limit_period: 60,
            rate_limit_threshold: 10,
            gas_limit_period: 3_600,
            gas_limit_threshold: 1_000_000_000,
        }
    }

    fn create_test_account(balance: u64) -> SponsorAccount {
        SponsorAccount {
            app: Pubkey::new_unique(),
            balance,
            locked: 0,
            unlock_slot: 0,
            total_spent: 0,
            rate_window: RateWindow::default(),
            gas_window: GasWindow::default(),
            limit_override: None,
            bump: 255,
        }
    }

    #[test]
    fn test_rate_limit_allows_threshold_then_rejects() {
        let limits = create_test_limits();
        let mut account = create_test_account(1_000_000);

        for i in 0..10 {
            account.admit_user_op(&limits, NOW + i, 100).unwrap();
        }
        assert_eq!(account.rate_window.operation_count, 10);

        let result = account.admit_user_op(&limits, NOW + 30, 100);
        assert_eq!(
            result.unwrap_err(),
            PaymasterError::RateLimitExceeded.into()
        );

        // Rejection leaves the ledger and both windows untouched
        assert_eq!(account.rate_window.operation_count, 10);
        assert_eq!(account.locked, 1_000);
        assert_eq!(account.gas_window.gas_spent, 1_000);
    }

    #[test]
    fn test_rate_window_resets_after_period() {
        let limits = create_test_limits();
        let mut account = create_test_account(1_000_000);

        for _ in 0..10 {
            account.admit_user_op(&limits, NOW, 100).unwrap();
        }
        assert!(account.admit_user_op(&limits, NOW + 59, 100).is_err());

        account.admit_user_op(&limits, NOW + 60, 100).unwrap();
        assert_eq!(account.rate_window.operation_count, 1);
        assert_eq!(account.rate_window.window_start, NOW + 60);
    }

    #[test]
    fn test_gas_limit_exceeded() {
        let limits = AppLimits {
            gas_limit_threshold: 500,
            ..create_test_limits()
        };
        let mut account = create_test_account(1_000_000);

        account.admit_user_op(&limits, NOW, 300).unwrap();
        let result = account.admit_user_op(&limits, NOW + 1, 300);
        assert_eq!(result.unwrap_err(), PaymasterError::GasLimitExceeded.into());

        // The rate window was not charged for the rejected operation
        assert_eq!(account.rate_window.operation_count, 1);
        assert_eq!(account.gas_window.gas_spent, 300);
    }

    #[test]
    fn test_concurrent_locks_cannot_overdraw() {
        let limits = create_test_limits();
        let mut account = create_test_account(100);

        account.admit_user_op(&limits, NOW, 80).unwrap();
        assert_eq!(account.available_balance().unwrap(), 20);

        let result = account.admit_user_op(&limits, NOW, 80);
        assert_eq!(
            result.unwrap_err(),
            PaymasterError::InsufficientBalance.into()
        );
        assert_eq!(account.locked, 80);
        assert_eq!(account.rate_window.operation_count, 1);
    }

    #[test]
    fn test_validate_then_settle_charges_actual_cost() {
        let limits = create_test_limits();
        let mut account = create_test_account(10_000);

        let window_start = account.admit_user_op(&limits, NOW, 5_000).unwrap();
        let charge = account.settle(5_000, 1_234, 0, window_start).unwrap();

        assert_eq!(charge, 1_234);
        assert_eq!(account.balance, 10_000 - 1_234);
        assert_eq!(account.locked, 0);
        assert_eq!(account.total_spent, 1_234);
        assert_eq!(account.gas_window.gas_spent, 1_234);
    }

    #[test]
    fn test_settle_overhead_is_capped_at_locked_cost() {
        let limits = create_test_limits();
        let mut account = create_test_account(10_000);

        let window_start = account.admit_user_op(&limits, NOW, 5_000).unwrap();
        let charge = account.settle(5_000, 4_900, 500, window_start).unwrap();

        assert_eq!(charge, 5_000);
        assert_eq!(account.balance, 5_000);
    }

    #[test]
    fn test_settle_rejects_cost_above_lock() {
        let limits = create_test_limits();
        let mut account = create_test_account(10_000);

        let window_start = account.admit_user_op(&limits, NOW, 5_000).unwrap();
        let result = account.settle(5_000, 5_001, 0, window_start);

        assert_eq!(
            result.unwrap_err(),
            PaymasterError::ActualCostExceedsLock.into()
        );
        assert_eq!(account.locked, 5_000);
        assert_eq!(account.balance, 10_000);
    }

    #[test]
    fn test_settle_after_gas_window_rollover_leaves_new_window() {
        let limits = create_test_limits();
        let mut account = create_test_account(1_000_000);

        let first_window = account.admit_user_op(&limits, NOW, 5_000).unwrap();

        // A later operation opens a new gas window before the first settles
        let second_window = account.admit_user_op(&limits, NOW + 3_600, 7_000).unwrap();
        assert_ne!(first_window, second_window);
        assert_eq!(account.gas_window.gas_spent, 7_000);

        account.settle(5_000, 1_000, 0, first_window).unwrap();
        assert_eq!(account.gas_window.gas_spent, 7_000);
        assert_eq!(account.locked, 7_000);

        account.settle(7_000, 2_000, 0, second_window).unwrap();
        assert_eq!(account.gas_window.gas_spent, 2_000);
        assert_eq!(account.total_spent, 3_000);
    }

    #[test]
    fn test_limit_override_takes_precedence() {
        let registry_limits = create_test_limits();
        let mut account = create_test_account(0);
        assert_eq!(account.effective_limits(&registry_limits), registry_limits);

        let override_limits = AppLimits {
            rate_limit_threshold: 1,
            ..registry_limits
        };
        account.limit_override = Some(override_limits);
        assert_eq!(account.effective_limits(&registry_limits), override_limits);
    }

    #[test]
    fn test_credit_rejects_zero() {
        let mut account = create_test_account(0);
        assert_eq!(
            account.credit(0).unwrap_err(),
            PaymasterError::InvalidAmount.into()
        );
        assert_eq!(account.credit(500).unwrap(), 500);
    }

    #[test]
    fn test_withdraw_requires_request_and_delay() {
        let mut account = create_test_account(1_000);

        assert_eq!(
            account.withdraw(100, 500).unwrap_err(),
            PaymasterError::NoPendingWithdrawal.into()
        );

        let unlock_slot = account.request_withdraw(100, 50).unwrap();
        assert_eq!(unlock_slot, 150);
        assert_eq!(
            account.request_withdraw(101, 50).unwrap_err(),
            PaymasterError::WithdrawalAlreadyRequested.into()
        );

        assert_eq!(
            account.withdraw(149, 500).unwrap_err(),
            PaymasterError::WithdrawalLocked.into()
        );

        assert_eq!(account.withdraw(150, 500).unwrap(), 500);
        assert_eq!(account.unlock_slot, 0);

        // The request is consumed by the first withdrawal
        assert_eq!(
            account.withdraw(151, 100).unwrap_err(),
            PaymasterError::NoPendingWithdrawal.into()
        );
    }

    #[test]
    fn test_withdraw_cannot_touch_locked_funds() {
        let limits = create_test_limits();
        let mut account = create_test_account(1_000);
        account.admit_user_op(&limits, NOW, 600).unwrap();
        account.request_withdraw(0, 10).unwrap();

        assert_eq!(
            account.withdraw(10, 401).unwrap_err(),
            PaymasterError::InsufficientBalance.into()
        );
        assert_eq!(account.withdraw(10, 400).unwrap(), 600);
        assert_eq!(account.balance, account.locked);
    }

    #[test]
    fn test_withdraw_zero_amount() {
        let mut account = create_test_account(1_000);
        account.request_withdraw(0, 10).unwrap();
        assert_eq!(
            account.withdraw(10, 0).unwrap_err(),
            PaymasterError::InvalidAmount.into()
        );
        // Failed withdrawal leaves the request pending
        assert_eq!(account.unlock_slot, 10);
    }

    #[test]
    fn test_deposit_then_withdraw_restores_balance() {
        let mut account = create_test_account(250);
        account.credit(1_000).unwrap();
        account.request_withdraw(0, 5).unwrap();
        assert_eq!(account.withdraw(5, 1_000).unwrap(), 250);
    }

    #[test]
    fn test_cancel_withdraw() {
        let mut account = create_test_account(1_000);
        assert_eq!(
            account.cancel_withdraw().unwrap_err(),
            PaymasterError::NoPendingWithdrawal.into()
        );

        account.request_withdraw(0, 10).unwrap();
        account.cancel_withdraw().unwrap();
        assert!(!account.has_pending_withdrawal());
        assert_eq!(
            account.withdraw(20, 100).unwrap_err(),
            PaymasterError::NoPendingWithdrawal.into()
        );
    }

    proptest! {
        #[test]
        fn test_limiter_and_ledger_invariants_fuzz(
            balance in 0u64..=1_000_000u64,
            threshold in 0u64..=20u64,
            gas_threshold in 0u64..=2_000_000u64,
            ops in proptest::collection::vec((0i64..=90i64, 0u64..=200_000u64, 0u64..=200_000u64), 1..60),
        ) {
            let limits = AppLimits {
                rate_limit_period: 60,
                rate_limit_threshold: threshold,
                gas_limit_period: 120,
                gas_limit_threshold: gas_threshold,
            };
            let mut account = create_test_account(balance);
            let mut now = NOW;
            let mut pending: Vec<(u64, u64, i64)> = Vec::new();

            for (elapsed, max_cost, actual) in ops {
                now += elapsed;
                if let Ok(window_start) = account.admit_user_op(&limits, now, max_cost) {
                    pending.push((max_cost, actual.min(max_cost), window_start));
                }

                prop_assert!(account.rate_window.operation_count <= threshold);
                prop_assert!(account.gas_window.gas_spent <= gas_threshold);
                prop_assert!(account.balance >= account.locked);

                // Settle every other admitted operation to interleave locks
                if pending.len() > 1 {
                    let (locked_cost, actual_cost, window_start) = pending.remove(0);
                    let before = account.balance;
                    let charge = account.settle(locked_cost, actual_cost, 0, window_start).unwrap();
                    prop_assert_eq!(charge, actual_cost);
                    prop_assert_eq!(account.balance, before - charge);
                    prop_assert!(account.balance >= account.locked);
                }
            }

            let reserved: u64 = pending.iter().map(|(locked_cost, _, _)| locked_cost).sum();
            prop_assert_eq!(account.locked, reserved);
            prop_assert_eq!(account.balance + account.total_spent, balance);
        }

        #[test]
        fn test_withdraw_never_goes_below_locked_fuzz(
            balance in 1u64..=1_000_000u64,
            locked_fraction in 0u64..=100u64,
            amount in 1u64..=1_000_000u64,
        ) {
            let mut account = create_test_account(balance);
            account.locked = balance * locked_fraction / 100;
            account.request_withdraw(0, 1).unwrap();

            let result = account.withdraw(1, amount);
            if amount <= balance - account.locked {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(result.is_err());
            }
            prop_assert!(account.balance >= account.locked);
        }
    }
}
