use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_WITHDRAWAL_DELAY_SLOTS, PAYMASTER_CONFIG_VERSION},
    errors::PaymasterError,
};

/// PaymasterConfig state account - global runtime parameters of the paymaster
#[account]
#[derive(InitSpace, Debug)]
pub struct PaymasterConfig {
    // Layout version, checked on every validation
    pub version: u8,

    // The only key allowed to validate and settle user operations
    pub entry_point: Pubkey,

    // Slots between a withdrawal request and its finalization
    pub withdrawal_delay_slots: u64,

    // Maximum cost a single user operation may reserve
    pub user_op_max_cost: u64,

    // Lamports added to the actual gas cost at settlement, capped by the reserved cost
    pub post_op_overhead: u64,

    // Whether validation of new user operations is paused
    // Settlement of already validated operations is never paused
    pub paused: bool,

    // The bump used to derive the PDA for this account
    // Stored so we don't need to recalculate it later
    pub bump: u8,
}

impl PaymasterConfig {
    pub fn ensure_current_version(&self) -> Result<()> {
        require!(
            self.version == PAYMASTER_CONFIG_VERSION,
            PaymasterError::ConfigVersionMismatch
        );
        Ok(())
    }

    /// Fails if the account layout is stale or new operations are paused
    pub fn ensure_active(&self) -> Result<()> {
        self.ensure_current_version()?;
        require!(!self.paused, PaymasterError::PaymasterPaused);
        Ok(())
    }

    pub fn validate_entry_point(entry_point: &Pubkey) -> Result<()> {
        require!(
            *entry_point != Pubkey::default(),
            PaymasterError::InvalidEntryPoint
        );
        Ok(())
    }

    pub fn validate_withdrawal_delay(delay_slots: u64) -> Result<()> {
        require!(
            (1..=MAX_WITHDRAWAL_DELAY_SLOTS).contains(&delay_slots),
            PaymasterError::InvalidWithdrawalDelay
        );
        Ok(())
    }

    pub fn validate_user_op_max_cost(max_cost: u64) -> Result<()> {
        require_gt!(max_cost, 0, PaymasterError::InvalidAmount);
        Ok(())
    }

    /// Checks the reserved cost of an operation against the configured cap
    pub fn check_max_cost(&self, max_cost: u64) -> Result<()> {
        if max_cost > self.user_op_max_cost {
            msg!(
                "User operation max cost {} exceeds cap {}",
                max_cost,
                self.user_op_max_cost
            );
            return err!(PaymasterError::UserOpCostTooHigh);
        }
        Ok(())
    }
}
