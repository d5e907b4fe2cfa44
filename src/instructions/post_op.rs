use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::PaymasterError,
    events::UserOpCharged,
    state::{
        CostLock, Credential, PaymasterConfig, PaymasterContext, PaymasterEntryPoint, PostOpMode,
        SponsorAccount,
    },
    utils::{close_program_account, load_program_record, transfer_program_lamports},
};

/// Settle a validated user operation, charging its final cost to the sponsoring app
/// Requires the signer to be the configured EntryPoint
#[derive(Accounts)]
pub struct PostOp<'info> {
    /// The EntryPoint, receives the charged lamports and the `CostLock` rent
    #[account(mut)]
    pub entry_point: Signer<'info>,

    /// The `PaymasterConfig` account
    /// # PDA Seeds
    /// - `PAYMASTER_CONFIG_SEED`
    #[account(
        seeds = [PAYMASTER_CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PaymasterConfig>,

    /// The sponsoring app's `SponsorAccount`
    /// # PDA Seeds
    /// - `SPONSOR_ACCOUNT_SEED`
    /// - The app's address
    #[account(
        mut,
        seeds = [SPONSOR_ACCOUNT_SEED, sponsor_account.app.as_ref()],
        bump = sponsor_account.bump,
    )]
    pub sponsor_account: Account<'info, SponsorAccount>,

    /// The `CostLock` account of the operation
    ///
    /// CHECK: Loaded in `load_cost_lock`, only program-owned locks matching the context are accepted
    #[account(mut)]
    pub cost_lock: UncheckedAccount<'info>,
}

impl<'info> PostOp<'info> {
    /// Loads the live lock for the operation described by `context`.
    /// Only this program writes program-owned `CostLock` accounts, and each one is
    /// created at the PDA of its `op_hash`, so a matching hash identifies the lock.
    /// # Returns
    /// * `Result<CostLock>` - The lock, Err(NoActiveLock) if it is missing, settled or does not match
    #[inline(always)]
    fn load_cost_lock(&self, context: &PaymasterContext) -> Result<CostLock> {
        let lock: CostLock = load_program_record(&self.cost_lock, PaymasterError::NoActiveLock)?;
        lock.check_context(context, &self.sponsor_account.app)?;

        Ok(lock)
    }

    /// Settle a user operation.
    /// The reservation is released, the final cost is charged and paid to the EntryPoint,
    /// and the `CostLock` is closed. `mode` is recorded but never changes the charge.
    /// # Arguments
    /// * `mode` - The outcome of the operation
    /// * `context` - The context returned by `validate_paymaster_user_op`
    /// * `actual_gas_cost` - The gas cost of the operation
    /// # Returns
    /// * `Result<()>` - Ok if the operation is settled, Err otherwise
    pub fn post_op(
        &mut self,
        mode: PostOpMode,
        context: Vec<u8>,
        actual_gas_cost: u64,
    ) -> Result<()> {
        self.config.ensure_current_version()?;

        PaymasterEntryPoint::PostOp.authorize(
            &self.entry_point.key(),
            Credential::EntryPoint {
                configured: self.config.entry_point,
            },
        )?;

        let context = PaymasterContext::decode(&context)?;
        let lock = self.load_cost_lock(&context)?;

        let charge = self.sponsor_account.settle(
            lock.locked_cost,
            actual_gas_cost,
            self.config.post_op_overhead,
            lock.gas_window_start,
        )?;

        close_program_account(
            &self.cost_lock.to_account_info(),
            &self.entry_point.to_account_info(),
        )?;

        transfer_program_lamports(
            &self.sponsor_account.to_account_info(),
            &self.entry_point.to_account_info(),
            charge,
        )?;

        emit!(UserOpCharged {
            app: lock.app,
            op_hash: lock.op_hash,
            mode,
            actual_gas_cost,
            amount: charge,
        });

        Ok(())
    }
}
