use anchor_lang::prelude::*;

use crate::{errors::PaymasterError, state::PaymasterContext};

/// CostLock account - the cost reserved for one validated user operation
/// Created by `validate_paymaster_user_op` and closed by `post_op`
#[account]
#[derive(InitSpace, Debug)]
pub struct CostLock {
    // Hash of the user operation this lock belongs to
    pub op_hash: [u8; 32],

    // The app whose balance is reserved
    pub app: Pubkey,

    // The sender of the user operation
    pub sender: Pubkey,

    // Maximum cost reserved at validation
    pub locked_cost: u64,

    // Start of the gas window the reservation was counted in
    pub gas_window_start: i64,

    // The timestamp when the operation was validated
    pub validated_at: i64,

    // The bump used to derive the PDA for this account
    // Stored so we don't need to recalculate it later
    pub bump: u8,
}

impl CostLock {
    /// Checks that this lock is the one described by `context` and reserved from `app`
    /// # Returns
    /// * `Result<()>` - Ok if the lock matches, Err(NoActiveLock) otherwise
    pub fn check_context(&self, context: &PaymasterContext, app: &Pubkey) -> Result<()> {
        if self.op_hash != context.op_hash
            || self.app != context.app
            || self.app != *app
            || self.locked_cost != context.max_cost
        {
            msg!("Cost lock of app {} does not match the paymaster context", self.app);
            return err!(PaymasterError::NoActiveLock);
        }

        Ok(())
    }
}
