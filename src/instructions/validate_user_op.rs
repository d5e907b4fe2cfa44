use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    program::{invoke, invoke_signed},
    system_instruction,
};
use anchor_lang::Discriminator;

use crate::{
    constants::*,
    errors::PaymasterError,
    events::UserOpSponsored,
    state::{
        AppMetadata, CostLock, Credential, KycRecord, PaymasterConfig, PaymasterContext,
        PaymasterEntryPoint, PaymasterValidation, SponsorAccount, SponsorLink, UserOperation,
    },
    utils::{load_program_record, store_program_record},
};

/// Validate a user operation and reserve its maximum cost from the sponsoring app
/// Requires the signer to be the configured EntryPoint
#[derive(Accounts)]
#[instruction(op: UserOperation, op_hash: [u8; 32])]
pub struct ValidatePaymasterUserOp<'info> {
    /// The EntryPoint, also pays for the `CostLock` account
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

    /// The sender's `SponsorLink` account, may not exist
    /// # PDA Seeds
    /// - `SPONSOR_LINK_SEED`
    /// - The operation sender
    ///
    /// CHECK: Loaded in `resolve_sponsor`, a missing link fails with `NotSponsored`
    #[account(
        seeds = [SPONSOR_LINK_SEED, op.sender.as_ref()],
        bump
    )]
    pub sponsor_link: UncheckedAccount<'info>,

    /// The sponsoring app's `AppMetadata` account
    /// # PDA Seeds
    /// - `APP_METADATA_SEED`
    /// - The app's address
    #[account(
        seeds = [APP_METADATA_SEED, app_metadata.app.as_ref()],
        bump = app_metadata.bump,
    )]
    pub app_metadata: Account<'info, AppMetadata>,

    /// The sponsoring app's `SponsorAccount`, missing until the app is first funded
    /// # PDA Seeds
    /// - `SPONSOR_ACCOUNT_SEED`
    /// - The app's address
    ///
    /// CHECK: Loaded in `reserve_cost`, an unfunded app fails with `InsufficientBalance`
    #[account(
        mut,
        seeds = [SPONSOR_ACCOUNT_SEED, app_metadata.app.as_ref()],
        bump
    )]
    pub sponsor_account: UncheckedAccount<'info>,

    /// The sender's `KycRecord` account, may not exist
    /// # PDA Seeds
    /// - `KYC_RECORD_SEED`
    /// - The operation sender
    ///
    /// CHECK: Only read when the app requires KYC, a missing record fails with `KYCRequired`
    #[account(
        seeds = [KYC_RECORD_SEED, op.sender.as_ref()],
        bump
    )]
    pub kyc_record: UncheckedAccount<'info>,

    /// The `CostLock` account created for this operation
    /// # PDA Seeds
    /// - `COST_LOCK_SEED`
    /// - The operation hash
    ///
    /// CHECK: Created in `initialize_cost_lock`, must not exist yet
    #[account(
        mut,
        seeds = [COST_LOCK_SEED, op_hash.as_ref()],
        bump
    )]
    pub cost_lock: UncheckedAccount<'info>,

    /// The system program
    pub system_program: Program<'info, System>,
}

impl<'info> ValidatePaymasterUserOp<'info> {
    /// Checks the operation is addressed to this paymaster, stays under the cost cap
    /// and hashes to `op_hash`.
    /// # Arguments
    /// * `op` - The user operation.
    /// * `op_hash` - The hash the EntryPoint computed for the operation.
    /// * `max_cost` - The maximum cost the operation may be charged.
    #[inline(always)]
    fn verify_user_op(&self, op: &UserOperation, op_hash: &[u8; 32], max_cost: u64) -> Result<()> {
        self.config.check_max_cost(max_cost)?;
        op.verify_paymaster(&crate::ID)?;

        require!(
            op.hash(&self.entry_point.key(), &CHAIN_ID) == *op_hash,
            PaymasterError::OpHashMismatch
        );

        Ok(())
    }

    /// Resolves the app sponsoring `sender` through its sponsor link.
    /// # Returns
    /// * `Result<Pubkey>` - The sponsoring app, Err(NotSponsored) otherwise
    #[inline(always)]
    fn resolve_sponsor(&self, sender: &Pubkey) -> Result<Pubkey> {
        let link: SponsorLink =
            load_program_record(&self.sponsor_link, PaymasterError::NotSponsored)?;

        link.sponsors(sender, &self.app_metadata.app)
    }

    /// Applies the app's KYC policy, reading the sender's record only when required
    #[inline(always)]
    fn verify_kyc(&self, sender: &Pubkey) -> Result<()> {
        let record = if self.app_metadata.kyc_required {
            load_program_record::<KycRecord>(&self.kyc_record, PaymasterError::KYCRequired).ok()
        } else {
            None
        };

        self.app_metadata.check_kyc(sender, record.as_ref())
    }

    /// Runs the limiter and balance checks and reserves `max_cost` from the app
    /// # Returns
    /// * `Result<i64>` - The start of the gas window the reservation was counted in
    #[inline(always)]
    fn reserve_cost(&mut self, now: i64, max_cost: u64) -> Result<i64> {
        let mut sponsor_account: SponsorAccount =
            load_program_record(&self.sponsor_account, PaymasterError::InsufficientBalance)?;

        let limits = sponsor_account.effective_limits(&self.app_metadata.limits);
        let gas_window_start = sponsor_account.admit_user_op(&limits, now, max_cost)?;

        store_program_record(&self.sponsor_account, &sponsor_account)?;

        Ok(gas_window_start)
    }

    /// Creates the `CostLock` account for an operation hash.
    /// Fails if the operation already holds a lock.
    /// # Arguments
    /// * `cost_lock` - The lock data to store.
    #[inline(always)]
    fn initialize_cost_lock(&mut self, cost_lock: CostLock) -> Result<()> {
        if !self.cost_lock.data_is_empty() {
            return err!(PaymasterError::OperationAlreadyValidated);
        }

        let space = 8 + CostLock::INIT_SPACE;
        let signer_seeds: &[&[u8]] = &[
            COST_LOCK_SEED,
            cost_lock.op_hash.as_ref(),
            &[cost_lock.bump],
        ];

        // Allocate space for the lock
        invoke_signed(
            &system_instruction::allocate(&self.cost_lock.key(), space as u64),
            &[self.cost_lock.to_account_info()],
            &[signer_seeds],
        )?;

        // Fund the lock to be rent-exempt
        invoke(
            &system_instruction::transfer(
                &self.entry_point.key(),
                &self.cost_lock.key(),
                Rent::get()?
                    .minimum_balance(space)
                    .saturating_sub(self.cost_lock.lamports()),
            ),
            &[
                self.entry_point.to_account_info(),
                self.cost_lock.to_account_info(),
            ],
        )?;

        // Assign the lock to the program
        invoke_signed(
            &system_instruction::assign(&self.cost_lock.key(), &crate::ID),
            &[self.cost_lock.to_account_info()],
            &[signer_seeds],
        )?;

        let mut data = self.cost_lock.try_borrow_mut_data()?;
        data[0..8].copy_from_slice(CostLock::DISCRIMINATOR);
        cost_lock.serialize(&mut &mut data[8..])?;

        Ok(())
    }

    /// Validate a user operation on behalf of its sponsoring app.
    /// On success the app's limiter windows are charged, `max_cost` is reserved from
    /// its balance and a `CostLock` is created for `op_hash`.
    /// # Arguments
    /// * `op` - The user operation
    /// * `op_hash` - The hash of the operation
    /// * `max_cost` - The maximum cost the operation may be charged
    /// * `bumps` - The PDA bumps for account derivation
    /// # Returns
    /// * `Result<PaymasterValidation>` - The context for `post_op` and the validation data
    pub fn validate_paymaster_user_op(
        &mut self,
        op: UserOperation,
        op_hash: [u8; 32],
        max_cost: u64,
        bumps: &ValidatePaymasterUserOpBumps,
    ) -> Result<PaymasterValidation> {
        self.config.ensure_active()?;

        PaymasterEntryPoint::ValidatePaymasterUserOp.authorize(
            &self.entry_point.key(),
            Credential::EntryPoint {
                configured: self.config.entry_point,
            },
        )?;

        self.verify_user_op(&op, &op_hash, max_cost)?;

        let app = self.resolve_sponsor(&op.sender)?;
        self.verify_kyc(&op.sender)?;

        let now = Clock::get()?.unix_timestamp;
        let gas_window_start = self.reserve_cost(now, max_cost)?;

        self.initialize_cost_lock(CostLock {
            op_hash,
            app,
            sender: op.sender,
            locked_cost: max_cost,
            gas_window_start,
            validated_at: now,
            bump: bumps.cost_lock,
        })?;

        emit!(UserOpSponsored {
            app,
            sender: op.sender,
            op_hash,
            max_cost,
        });

        let context = PaymasterContext {
            app,
            op_hash,
            max_cost,
        }
        .encode()?;

        Ok(PaymasterValidation {
            context,
            validation_data: VALIDATION_DATA_NONE,
        })
    }
}
