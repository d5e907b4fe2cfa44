use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::{
    constants::*,
    errors::PaymasterError,
    events::{SponsorDeposited, WithdrawalCancelled, WithdrawalFinalized, WithdrawalRequested},
    state::{AppMetadata, Credential, PaymasterConfig, PaymasterEntryPoint, SponsorAccount},
    utils::transfer_program_lamports,
};

/// Deposit lamports for a registered app
/// Anyone may fund any app
#[derive(Accounts)]
#[instruction(app: Pubkey)]
pub struct DepositFor<'info> {
    /// Provides the lamports and pays for account creation on first deposit
    #[account(mut)]
    pub funder: Signer<'info>,

    /// The app's `AppMetadata` account, proving the app is registered
    /// # PDA Seeds
    /// - `APP_METADATA_SEED`
    /// - The app's address
    #[account(
        seeds = [APP_METADATA_SEED, app.as_ref()],
        bump = app_metadata.bump,
    )]
    pub app_metadata: Account<'info, AppMetadata>,

    /// The app's `SponsorAccount`, created on first deposit
    /// # PDA Seeds
    /// - `SPONSOR_ACCOUNT_SEED`
    /// - The app's address
    #[account(
        init_if_needed,
        payer = funder,
        space = 8 + SponsorAccount::INIT_SPACE,
        seeds = [SPONSOR_ACCOUNT_SEED, app.as_ref()],
        bump
    )]
    pub sponsor_account: Account<'info, SponsorAccount>,

    /// The system program
    pub system_program: Program<'info, System>,
}

impl<'info> DepositFor<'info> {
    /// Initializes the sponsor account if it has not been used yet
    /// # Arguments
    /// * `app` - The app the account belongs to
    /// * `bump` - The bump seed used for PDA derivation
    #[inline(always)]
    fn initialize_sponsor_account(&mut self, app: Pubkey, bump: u8) {
        if !self.sponsor_account.is_initialized() {
            self.sponsor_account.app = app;
            self.sponsor_account.bump = bump;

            msg!("Sponsor account initialized");
        }
    }

    /// Deposit `amount` lamports for `app`
    /// # Arguments
    /// * `app` - The app being funded
    /// * `amount` - The number of lamports to deposit
    /// * `bumps` - The PDA bumps for account derivation
    /// # Returns
    /// * `Result<()>` - Ok if the deposit succeeds, Err otherwise
    pub fn deposit_for(&mut self, app: Pubkey, amount: u64, bumps: &DepositForBumps) -> Result<()> {
        PaymasterEntryPoint::DepositFor.authorize(&self.funder.key(), Credential::Signer)?;

        require_gt!(amount, 0, PaymasterError::InvalidAmount);

        self.initialize_sponsor_account(app, bumps.sponsor_account);

        transfer(
            CpiContext::new(
                self.system_program.to_account_info(),
                Transfer {
                    from: self.funder.to_account_info(),
                    to: self.sponsor_account.to_account_info(),
                },
            ),
            amount,
        )?;

        let balance = self.sponsor_account.credit(amount)?;

        emit!(SponsorDeposited {
            app,
            funder: self.funder.key(),
            amount,
            balance,
        });

        Ok(())
    }
}

/// Request or cancel a withdrawal of an app's deposit
/// Requires the signer to be the app controller
#[derive(Accounts)]
pub struct WithdrawalRequest<'info> {
    /// The app controller
    pub controller: Signer<'info>,

    /// The `PaymasterConfig` account
    /// # PDA Seeds
    /// - `PAYMASTER_CONFIG_SEED`
    #[account(
        seeds = [PAYMASTER_CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, PaymasterConfig>,

    /// The app's `AppMetadata` account
    /// # PDA Seeds
    /// - `APP_METADATA_SEED`
    /// - The app's address
    #[account(
        seeds = [APP_METADATA_SEED, sponsor_account.app.as_ref()],
        bump = app_metadata.bump,
    )]
    pub app_metadata: Account<'info, AppMetadata>,

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
}

impl<'info> WithdrawalRequest<'info> {
    /// Start the withdrawal delay
    /// # Returns
    /// * `Result<()>` - Ok if the request is recorded, Err otherwise
    pub fn request_withdraw(&mut self) -> Result<()> {
        PaymasterEntryPoint::RequestWithdraw.authorize(
            &self.controller.key(),
            Credential::AppController {
                controller: self.app_metadata.controller,
            },
        )?;

        let unlock_slot = self
            .sponsor_account
            .request_withdraw(Clock::get()?.slot, self.config.withdrawal_delay_slots)?;

        emit!(WithdrawalRequested {
            app: self.sponsor_account.app,
            controller: self.controller.key(),
            unlock_slot,
            balance: self.sponsor_account.balance,
        });

        Ok(())
    }

    /// Cancel the pending withdrawal request
    /// # Returns
    /// * `Result<()>` - Ok if the request is cleared, Err otherwise
    pub fn cancel_withdraw(&mut self) -> Result<()> {
        PaymasterEntryPoint::CancelWithdraw.authorize(
            &self.controller.key(),
            Credential::AppController {
                controller: self.app_metadata.controller,
            },
        )?;

        self.sponsor_account.cancel_withdraw()?;

        emit!(WithdrawalCancelled {
            app: self.sponsor_account.app,
            controller: self.controller.key(),
        });

        Ok(())
    }
}

/// Finalize a withdrawal of an app's deposit
/// Requires the signer to be the app controller
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// The app controller
    pub controller: Signer<'info>,

    /// The app's `AppMetadata` account
    /// # PDA Seeds
    /// - `APP_METADATA_SEED`
    /// - The app's address
    #[account(
        seeds = [APP_METADATA_SEED, sponsor_account.app.as_ref()],
        bump = app_metadata.bump,
    )]
    pub app_metadata: Account<'info, AppMetadata>,

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

    /// Receives the withdrawn lamports
    ///
    /// CHECK: Any account chosen by the controller
    #[account(mut)]
    pub recipient: UncheckedAccount<'info>,
}

impl<'info> Withdraw<'info> {
    /// Withdraw `amount` lamports to `recipient` once the delay has passed
    /// The ledger is debited before lamports leave the account
    /// # Arguments
    /// * `amount` - The number of lamports to withdraw
    /// # Returns
    /// * `Result<()>` - Ok if the withdrawal succeeds, Err otherwise
    pub fn withdraw(&mut self, amount: u64) -> Result<()> {
        PaymasterEntryPoint::Withdraw.authorize(
            &self.controller.key(),
            Credential::AppController {
                controller: self.app_metadata.controller,
            },
        )?;

        let balance = self
            .sponsor_account
            .withdraw(Clock::get()?.slot, amount)?;

        transfer_program_lamports(
            &self.sponsor_account.to_account_info(),
            &self.recipient.to_account_info(),
            amount,
        )?;

        emit!(WithdrawalFinalized {
            app: self.sponsor_account.app,
            to: self.recipient.key(),
            amount,
            balance,
        });

        Ok(())
    }
}
