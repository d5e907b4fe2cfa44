#![allow(unexpected_cfgs)]
#![allow(deprecated)]

use anchor_lang::prelude::*;
mod constants;
mod errors;
mod events;
mod instructions;
pub mod security;
mod state;
mod utils;

use instructions::*;
use state::{AppLimits, PaymasterValidation, PostOpMode, RoleType, UserOperation};

#[cfg(feature = "devnet")]
declare_id!("8ig6bVhPCG92eSBrEjeZWvjezXECNPiJbti7WofeY72C");
#[cfg(feature = "testnet")]
declare_id!("6UMU5LZBTbgowj9JaURNTETutzUrv2K1nNPBiCz2vwDd");
#[cfg(feature = "mainnet")]
declare_id!("3Yx5r88WjkQ1gcrbZ7fB2WYWrQXQtE22qqNkjgvb2U4f");
#[cfg(not(any(feature = "mainnet", feature = "devnet", feature = "testnet")))]
declare_id!("GRJ6bv963j3zJqxxnZgESRjZBRgpmF6XK9mst9K1rhd");

#[program]
pub mod sponsor_paymaster {
    use super::*;

    /// Grant a role to a user
    /// Signer must be the program upgrade authority
    pub fn grant_role(ctx: Context<GrantRole>, role: RoleType, user: Pubkey) -> Result<()> {
        ctx.accounts.grant_role(role, user, &ctx.bumps)
    }

    /// Revoke a role from a user
    /// Signer must be the program upgrade authority
    pub fn revoke_role(ctx: Context<RevokeRole>, _role: RoleType) -> Result<()> {
        ctx.accounts.revoke_role()
    }

    /// Initialize the paymaster configuration
    ///
    /// Sets the EntryPoint allowed to validate and settle user operations. Unset
    /// parameters take their defaults.
    /// Signer must have the ADMIN_ROLE_PAYMASTER role
    pub fn initialize_paymaster(
        ctx: Context<InitializePaymaster>,
        entry_point: Pubkey,
        withdrawal_delay_slots: Option<u64>,
        user_op_max_cost: Option<u64>,
        post_op_overhead: Option<u64>,
    ) -> Result<()> {
        ctx.accounts.initialize_paymaster(
            entry_point,
            withdrawal_delay_slots,
            user_op_max_cost,
            post_op_overhead,
            &ctx.bumps,
        )
    }

    /// Update the paymaster configuration
    /// Signer must have the ADMIN_ROLE_PAYMASTER role
    pub fn update_paymaster_config(
        ctx: Context<PaymasterAdmin>,
        entry_point: Option<Pubkey>,
        withdrawal_delay_slots: Option<u64>,
        user_op_max_cost: Option<u64>,
        post_op_overhead: Option<u64>,
    ) -> Result<()> {
        ctx.accounts.update_paymaster_config(
            entry_point,
            withdrawal_delay_slots,
            user_op_max_cost,
            post_op_overhead,
        )
    }

    /// Pause validation of new user operations
    /// Signer must have the PAUSER_ROLE_PAYMASTER role
    pub fn pause_paymaster(ctx: Context<PaymasterPauser>) -> Result<()> {
        ctx.accounts.pause_paymaster()
    }

    /// Resume validation of new user operations
    /// Signer must have the ADMIN_ROLE_PAYMASTER role
    pub fn resume_paymaster(ctx: Context<PaymasterAdmin>) -> Result<()> {
        ctx.accounts.resume_paymaster()
    }

    /// Override the registry limits of an app, or clear the override
    /// Signer must have the ADMIN_ROLE_PAYMASTER role
    pub fn set_limit_override(
        ctx: Context<SetLimitOverride>,
        limits: Option<AppLimits>,
    ) -> Result<()> {
        ctx.accounts.set_limit_override(limits)
    }

    /// Deposit lamports for a registered app
    pub fn deposit_for(ctx: Context<DepositFor>, app: Pubkey, amount: u64) -> Result<()> {
        ctx.accounts.deposit_for(app, amount, &ctx.bumps)
    }

    /// Start the withdrawal delay for an app's deposit
    /// Signer must be the app controller
    pub fn request_withdraw(ctx: Context<WithdrawalRequest>) -> Result<()> {
        ctx.accounts.request_withdraw()
    }

    /// Cancel a pending withdrawal request
    /// Signer must be the app controller
    pub fn cancel_withdraw(ctx: Context<WithdrawalRequest>) -> Result<()> {
        ctx.accounts.cancel_withdraw()
    }

    /// Withdraw from an app's deposit once the withdrawal delay has passed
    ///
    /// Lamports reserved for operations awaiting settlement cannot be withdrawn.
    /// Signer must be the app controller
    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        ctx.accounts.withdraw(amount)
    }

    /// Validate a user operation for sponsorship
    ///
    /// Resolves the sponsoring app, enforces its KYC policy, rate limit, gas limit
    /// and balance, and reserves `max_cost` until `post_op`.
    /// Signer must be the configured EntryPoint
    pub fn validate_paymaster_user_op(
        ctx: Context<ValidatePaymasterUserOp>,
        op: UserOperation,
        op_hash: [u8; 32],
        max_cost: u64,
    ) -> Result<PaymasterValidation> {
        ctx.accounts
            .validate_paymaster_user_op(op, op_hash, max_cost, &ctx.bumps)
    }

    /// Settle a validated user operation and charge its cost to the sponsoring app
    /// Signer must be the configured EntryPoint
    pub fn post_op(
        ctx: Context<PostOp>,
        mode: PostOpMode,
        context: Vec<u8>,
        actual_gas_cost: u64,
    ) -> Result<()> {
        ctx.accounts.post_op(mode, context, actual_gas_cost)
    }

    /// Register a sponsoring app
    /// Signer must have the ADMIN_ROLE_APP_REGISTRY role
    pub fn register_app(
        ctx: Context<RegisterApp>,
        app: Pubkey,
        controller: Pubkey,
        limits: AppLimits,
        kyc_required: bool,
    ) -> Result<()> {
        ctx.accounts
            .register_app(app, controller, limits, kyc_required, &ctx.bumps)
    }

    /// Update a registered app
    /// Signer must have the ADMIN_ROLE_APP_REGISTRY role
    pub fn update_app(
        ctx: Context<UpdateApp>,
        controller: Option<Pubkey>,
        limits: Option<AppLimits>,
        kyc_required: Option<bool>,
    ) -> Result<()> {
        ctx.accounts.update_app(controller, limits, kyc_required)
    }

    /// Link a contract to its sponsoring app
    /// Signer must have the ADMIN_ROLE_APP_REGISTRY role
    pub fn set_sponsor(ctx: Context<SetSponsor>, contract: Pubkey) -> Result<()> {
        ctx.accounts.set_sponsor(contract, &ctx.bumps)
    }

    /// Remove a contract's sponsor link
    /// Signer must have the ADMIN_ROLE_APP_REGISTRY role
    pub fn remove_sponsor(ctx: Context<RemoveSponsor>) -> Result<()> {
        ctx.accounts.remove_sponsor()
    }

    /// Grant KYC clearance to an address
    /// Signer must have the ADMIN_ROLE_IDENTITY_REGISTRY role
    pub fn grant_kyc(ctx: Context<GrantKyc>, user: Pubkey) -> Result<()> {
        ctx.accounts.grant_kyc(user, &ctx.bumps)
    }

    /// Revoke KYC clearance from an address
    /// Signer must have the ADMIN_ROLE_IDENTITY_REGISTRY role
    pub fn revoke_kyc(ctx: Context<RevokeKyc>) -> Result<()> {
        ctx.accounts.revoke_kyc()
    }
}
