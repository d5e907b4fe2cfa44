use anchor_lang::prelude::*;

use crate::{
    constants::*,
    events::{LimitOverrideSet, PaymasterConfigSet, PaymasterPaused},
    state::{
        AppLimits, Credential, PaymasterConfig, PaymasterEntryPoint, RoleType, Roles,
        SponsorAccount,
    },
};

/// Initialize the `PaymasterConfig` account
/// Requires `ADMIN_ROLE_PAYMASTER` role
#[derive(Accounts)]
pub struct InitializePaymaster<'info> {
    /// Pays for account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The account with the authority to initialize the paymaster
    pub authority: Signer<'info>,

    /// The `PaymasterConfig` account to be initialized
    /// # PDA Seeds
    /// - `PAYMASTER_CONFIG_SEED`
    #[account(
        init,
        payer = payer,
        space = 8 + PaymasterConfig::INIT_SPACE,
        seeds = [PAYMASTER_CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, PaymasterConfig>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_PAYMASTER` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_PAYMASTER`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_PAYMASTER, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,

    /// The system program
    pub system_program: Program<'info, System>,
}

impl<'info> InitializePaymaster<'info> {
    /// Initialize the `PaymasterConfig` account
    /// # Arguments
    /// * `entry_point` - The only key allowed to validate and settle user operations
    /// * `withdrawal_delay_slots` - Slots between a withdrawal request and its finalization, defaults to `DEFAULT_WITHDRAWAL_DELAY_SLOTS`
    /// * `user_op_max_cost` - Cap on the cost one operation may reserve, defaults to `DEFAULT_USER_OP_MAX_COST`
    /// * `post_op_overhead` - Lamports added to each settlement, defaults to zero
    /// * `bumps` - The PDA bumps for account derivation
    /// # Returns
    /// * `Result<()>` - Ok if the PaymasterConfig is successfully initialized, Err otherwise
    pub fn initialize_paymaster(
        &mut self,
        entry_point: Pubkey,
        withdrawal_delay_slots: Option<u64>,
        user_op_max_cost: Option<u64>,
        post_op_overhead: Option<u64>,
        bumps: &InitializePaymasterBumps,
    ) -> Result<()> {
        PaymasterEntryPoint::InitializePaymaster.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        let withdrawal_delay_slots =
            withdrawal_delay_slots.unwrap_or(DEFAULT_WITHDRAWAL_DELAY_SLOTS);
        let user_op_max_cost = user_op_max_cost.unwrap_or(DEFAULT_USER_OP_MAX_COST);

        PaymasterConfig::validate_entry_point(&entry_point)?;
        PaymasterConfig::validate_withdrawal_delay(withdrawal_delay_slots)?;
        PaymasterConfig::validate_user_op_max_cost(user_op_max_cost)?;

        self.config.set_inner(PaymasterConfig {
            version: PAYMASTER_CONFIG_VERSION,
            entry_point,
            withdrawal_delay_slots,
            user_op_max_cost,
            post_op_overhead: post_op_overhead.unwrap_or(0),
            paused: false,
            bump: bumps.config,
        });

        emit!(PaymasterConfigSet {
            entry_point,
            withdrawal_delay_slots,
            user_op_max_cost,
            post_op_overhead: self.config.post_op_overhead,
            authority: self.authority.key(),
        });

        Ok(())
    }
}

/// Paymaster admin operations on the `PaymasterConfig` account
/// Requires `ADMIN_ROLE_PAYMASTER` role
#[derive(Accounts)]
pub struct PaymasterAdmin<'info> {
    /// The account with the authority to administer the paymaster
    pub authority: Signer<'info>,

    /// The `PaymasterConfig` account
    /// # PDA Seeds
    /// - `PAYMASTER_CONFIG_SEED`
    #[account(
        mut,
        seeds = [PAYMASTER_CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PaymasterConfig>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_PAYMASTER` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_PAYMASTER`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_PAYMASTER, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,
}

impl<'info> PaymasterAdmin<'info> {
    /// Update any combination of the paymaster parameters
    /// # Arguments
    /// * `entry_point` - The new EntryPoint key, if any
    /// * `withdrawal_delay_slots` - The new withdrawal delay, if any
    /// * `user_op_max_cost` - The new per-operation cost cap, if any
    /// * `post_op_overhead` - The new settlement overhead, if any
    /// # Returns
    /// * `Result<()>` - Ok if the config is successfully updated, Err otherwise
    pub fn update_paymaster_config(
        &mut self,
        entry_point: Option<Pubkey>,
        withdrawal_delay_slots: Option<u64>,
        user_op_max_cost: Option<u64>,
        post_op_overhead: Option<u64>,
    ) -> Result<()> {
        PaymasterEntryPoint::UpdatePaymasterConfig.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        if let Some(entry_point) = entry_point {
            PaymasterConfig::validate_entry_point(&entry_point)?;
            self.config.entry_point = entry_point;
        }

        if let Some(delay) = withdrawal_delay_slots {
            PaymasterConfig::validate_withdrawal_delay(delay)?;
            self.config.withdrawal_delay_slots = delay;
        }

        if let Some(max_cost) = user_op_max_cost {
            PaymasterConfig::validate_user_op_max_cost(max_cost)?;
            self.config.user_op_max_cost = max_cost;
        }

        if let Some(overhead) = post_op_overhead {
            self.config.post_op_overhead = overhead;
        }

        emit!(PaymasterConfigSet {
            entry_point: self.config.entry_point,
            withdrawal_delay_slots: self.config.withdrawal_delay_slots,
            user_op_max_cost: self.config.user_op_max_cost,
            post_op_overhead: self.config.post_op_overhead,
            authority: self.authority.key(),
        });

        Ok(())
    }

    /// Resume validation of new user operations
    /// # Returns
    /// * `Result<()>` - Ok if the paymaster is successfully resumed, Err otherwise
    pub fn resume_paymaster(&mut self) -> Result<()> {
        PaymasterEntryPoint::ResumePaymaster.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        self.config.paused = false;

        emit!(PaymasterPaused {
            is_paused: false,
            pauser: self.authority.key(),
        });

        Ok(())
    }
}

/// Pause validation of new user operations
/// Requires `PAUSER_ROLE_PAYMASTER` role
#[derive(Accounts)]
pub struct PaymasterPauser<'info> {
    /// The account with the authority to pause the paymaster
    pub authority: Signer<'info>,

    /// The `PaymasterConfig` account
    /// # PDA Seeds
    /// - `PAYMASTER_CONFIG_SEED`
    #[account(
        mut,
        seeds = [PAYMASTER_CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PaymasterConfig>,

    /// The `Roles` account verifying the authority has the `PAUSER_ROLE_PAYMASTER` role
    /// # PDA Seeds
    /// - `PAUSER_ROLE_PAYMASTER`
    /// - The authority's address
    #[account(
        seeds = [RoleType::PAUSER_ROLE_PAYMASTER, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,
}

impl<'info> PaymasterPauser<'info> {
    /// Pause validation. Operations already validated can still be settled.
    /// # Returns
    /// * `Result<()>` - Ok if the paymaster is successfully paused, Err otherwise
    pub fn pause_paymaster(&mut self) -> Result<()> {
        PaymasterEntryPoint::PausePaymaster.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        self.config.paused = true;

        emit!(PaymasterPaused {
            is_paused: true,
            pauser: self.authority.key(),
        });

        Ok(())
    }
}

/// Set or clear the limit override of an app
/// Requires `ADMIN_ROLE_PAYMASTER` role
#[derive(Accounts)]
pub struct SetLimitOverride<'info> {
    /// The account with the authority to override limits
    pub authority: Signer<'info>,

    /// The app's `SponsorAccount`
    /// # PDA Seeds
    /// - `SPONSOR_ACCOUNT_SEED`
    /// - The app's address
    #[account(
        mut,
        seeds = [SPONSOR_ACCOUNT_SEED, sponsor_account.app.as_ref()],
        bump = sponsor_account.bump,
    )]
    pub sponsor_account: Account<'info, SponsorAccount>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_PAYMASTER` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_PAYMASTER`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_PAYMASTER, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,
}

impl<'info> SetLimitOverride<'info> {
    /// Set the limits used instead of the registry limits, or clear them with `None`
    /// # Arguments
    /// * `limits` - The override limits, if any
    /// # Returns
    /// * `Result<()>` - Ok if the override is successfully set, Err otherwise
    pub fn set_limit_override(&mut self, limits: Option<AppLimits>) -> Result<()> {
        PaymasterEntryPoint::SetLimitOverride.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        if let Some(limits) = limits.as_ref() {
            limits.validate()?;
        }

        self.sponsor_account.limit_override = limits;

        emit!(LimitOverrideSet {
            app: self.sponsor_account.app,
            limits,
            authority: self.authority.key(),
        });

        Ok(())
    }
}
