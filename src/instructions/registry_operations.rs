use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::PaymasterError,
    events::{AppMetadataSet, KycGranted, KycRevoked, SponsorLinkRemoved, SponsorLinkSet},
    state::{
        AppLimits, AppMetadata, Credential, KycRecord, PaymasterEntryPoint, RoleType, Roles,
        SponsorLink,
    },
};

/// Register a sponsoring app with its controller, limits and KYC policy
/// The app is linked to itself so its own operations are sponsored
/// Requires `ADMIN_ROLE_APP_REGISTRY` role
#[derive(Accounts)]
#[instruction(app: Pubkey)]
pub struct RegisterApp<'info> {
    /// Pays for account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The account with the authority to register apps
    pub authority: Signer<'info>,

    /// The `AppMetadata` account to be initialized
    /// # PDA Seeds
    /// - `APP_METADATA_SEED`
    /// - The app's address
    #[account(
        init,
        payer = payer,
        space = 8 + AppMetadata::INIT_SPACE,
        seeds = [APP_METADATA_SEED, app.as_ref()],
        bump
    )]
    pub app_metadata: Account<'info, AppMetadata>,

    /// The app's link to itself
    /// # PDA Seeds
    /// - `SPONSOR_LINK_SEED`
    /// - The app's address
    #[account(
        init,
        payer = payer,
        space = 8 + SponsorLink::INIT_SPACE,
        seeds = [SPONSOR_LINK_SEED, app.as_ref()],
        bump
    )]
    pub self_link: Account<'info, SponsorLink>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_APP_REGISTRY` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_APP_REGISTRY`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_APP_REGISTRY, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,

    /// The system program
    pub system_program: Program<'info, System>,
}

impl<'info> RegisterApp<'info> {
    /// Register an app
    /// # Arguments
    /// * `app` - The app identifier
    /// * `controller` - The key allowed to withdraw the app's deposit
    /// * `limits` - The app's rate and gas limits
    /// * `kyc_required` - Whether senders must hold a KYC record
    /// * `bumps` - The PDA bumps for account derivation
    /// # Returns
    /// * `Result<()>` - Ok if the app is successfully registered, Err otherwise
    pub fn register_app(
        &mut self,
        app: Pubkey,
        controller: Pubkey,
        limits: AppLimits,
        kyc_required: bool,
        bumps: &RegisterAppBumps,
    ) -> Result<()> {
        PaymasterEntryPoint::RegisterApp.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        require!(controller != Pubkey::default(), PaymasterError::InvalidUser);
        limits.validate()?;

        self.app_metadata.set_inner(AppMetadata {
            app,
            controller,
            limits,
            kyc_required,
            bump: bumps.app_metadata,
        });

        self.self_link.set_inner(SponsorLink {
            contract: app,
            app,
            bump: bumps.self_link,
        });

        emit!(AppMetadataSet {
            app,
            controller,
            limits,
            kyc_required,
        });

        emit!(SponsorLinkSet { contract: app, app });

        Ok(())
    }
}

/// Update a registered app
/// Requires `ADMIN_ROLE_APP_REGISTRY` role
#[derive(Accounts)]
pub struct UpdateApp<'info> {
    /// The account with the authority to update apps
    pub authority: Signer<'info>,

    /// The `AppMetadata` account to be updated
    /// # PDA Seeds
    /// - `APP_METADATA_SEED`
    /// - The app's address
    #[account(
        mut,
        seeds = [APP_METADATA_SEED, app_metadata.app.as_ref()],
        bump = app_metadata.bump,
    )]
    pub app_metadata: Account<'info, AppMetadata>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_APP_REGISTRY` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_APP_REGISTRY`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_APP_REGISTRY, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,
}

impl<'info> UpdateApp<'info> {
    /// Update any combination of the app's controller, limits and KYC policy
    /// # Arguments
    /// * `controller` - The new controller, if any
    /// * `limits` - The new limits, if any
    /// * `kyc_required` - The new KYC policy, if any
    /// # Returns
    /// * `Result<()>` - Ok if the app is successfully updated, Err otherwise
    pub fn update_app(
        &mut self,
        controller: Option<Pubkey>,
        limits: Option<AppLimits>,
        kyc_required: Option<bool>,
    ) -> Result<()> {
        PaymasterEntryPoint::UpdateApp.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        if let Some(controller) = controller {
            require!(controller != Pubkey::default(), PaymasterError::InvalidUser);
            self.app_metadata.controller = controller;
        }

        if let Some(limits) = limits {
            limits.validate()?;
            self.app_metadata.limits = limits;
        }

        if let Some(kyc_required) = kyc_required {
            self.app_metadata.kyc_required = kyc_required;
        }

        emit!(AppMetadataSet {
            app: self.app_metadata.app,
            controller: self.app_metadata.controller,
            limits: self.app_metadata.limits,
            kyc_required: self.app_metadata.kyc_required,
        });

        Ok(())
    }
}

/// Link a contract to the app that sponsors it, replacing any previous link
/// Requires `ADMIN_ROLE_APP_REGISTRY` role
#[derive(Accounts)]
#[instruction(contract: Pubkey)]
pub struct SetSponsor<'info> {
    /// Pays for account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The account with the authority to link contracts
    pub authority: Signer<'info>,

    /// The sponsoring app's `AppMetadata` account
    /// # PDA Seeds
    /// - `APP_METADATA_SEED`
    /// - The app's address
    #[account(
        seeds = [APP_METADATA_SEED, app_metadata.app.as_ref()],
        bump = app_metadata.bump,
    )]
    pub app_metadata: Account<'info, AppMetadata>,

    /// The contract's `SponsorLink` account
    /// # PDA Seeds
    /// - `SPONSOR_LINK_SEED`
    /// - The contract's address
    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + SponsorLink::INIT_SPACE,
        seeds = [SPONSOR_LINK_SEED, contract.as_ref()],
        bump
    )]
    pub sponsor_link: Account<'info, SponsorLink>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_APP_REGISTRY` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_APP_REGISTRY`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_APP_REGISTRY, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,

    /// The system program
    pub system_program: Program<'info, System>,
}

impl<'info> SetSponsor<'info> {
    /// Link `contract` to the app of `app_metadata`
    /// # Arguments
    /// * `contract` - The contract whose operations the app sponsors
    /// * `bumps` - The PDA bumps for account derivation
    /// # Returns
    /// * `Result<()>` - Ok if the link is successfully set, Err otherwise
    pub fn set_sponsor(&mut self, contract: Pubkey, bumps: &SetSponsorBumps) -> Result<()> {
        PaymasterEntryPoint::SetSponsor.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        let app = self.app_metadata.app;

        self.sponsor_link.set_inner(SponsorLink {
            contract,
            app,
            bump: bumps.sponsor_link,
        });

        emit!(SponsorLinkSet { contract, app });

        Ok(())
    }
}

/// Remove a contract's sponsor link by closing its `SponsorLink` account
/// Requires `ADMIN_ROLE_APP_REGISTRY` role
#[derive(Accounts)]
pub struct RemoveSponsor<'info> {
    /// The account with the authority to unlink contracts
    pub authority: Signer<'info>,

    /// Receives the lamports from closing the SponsorLink account
    #[account(mut)]
    pub recipient: SystemAccount<'info>,

    /// The `SponsorLink` account being closed
    /// # PDA Seeds
    /// - `SPONSOR_LINK_SEED`
    /// - The contract's address
    #[account(
        mut,
        close = recipient,
        seeds = [SPONSOR_LINK_SEED, sponsor_link.contract.as_ref()],
        bump = sponsor_link.bump,
    )]
    pub sponsor_link: Account<'info, SponsorLink>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_APP_REGISTRY` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_APP_REGISTRY`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_APP_REGISTRY, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,
}

impl<'info> RemoveSponsor<'info> {
    pub fn remove_sponsor(&mut self) -> Result<()> {
        PaymasterEntryPoint::RemoveSponsor.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        emit!(SponsorLinkRemoved {
            contract: self.sponsor_link.contract,
            removed_by: self.authority.key(),
        });

        Ok(())
    }
}

/// Grant KYC clearance to an address by initializing a `KycRecord` account
/// Requires `ADMIN_ROLE_IDENTITY_REGISTRY` role
#[derive(Accounts)]
#[instruction(user: Pubkey)]
pub struct GrantKyc<'info> {
    /// Pays for account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The account with the authority to grant KYC clearance
    pub authority: Signer<'info>,

    /// The `KycRecord` account to be initialized
    /// # PDA Seeds
    /// - `KYC_RECORD_SEED`
    /// - The cleared address
    #[account(
        init,
        payer = payer,
        space = 8 + KycRecord::INIT_SPACE,
        seeds = [KYC_RECORD_SEED, user.as_ref()],
        bump
    )]
    pub kyc_record: Account<'info, KycRecord>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_IDENTITY_REGISTRY` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_IDENTITY_REGISTRY`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_IDENTITY_REGISTRY, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,

    /// The system program
    pub system_program: Program<'info, System>,
}

impl<'info> GrantKyc<'info> {
    pub fn grant_kyc(&mut self, user: Pubkey, bumps: &GrantKycBumps) -> Result<()> {
        PaymasterEntryPoint::GrantKyc.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        self.kyc_record.set_inner(KycRecord {
            account: user,
            granted_at: Clock::get()?.unix_timestamp,
            bump: bumps.kyc_record,
        });

        emit!(KycGranted {
            account: user,
            granted_by: self.authority.key(),
        });

        Ok(())
    }
}

/// Revoke KYC clearance by closing the address's `KycRecord` account
/// Requires `ADMIN_ROLE_IDENTITY_REGISTRY` role
#[derive(Accounts)]
pub struct RevokeKyc<'info> {
    /// The account with the authority to revoke KYC clearance
    pub authority: Signer<'info>,

    /// Receives the lamports from closing the KycRecord account
    #[account(mut)]
    pub recipient: SystemAccount<'info>,

    /// The `KycRecord` account being closed
    /// # PDA Seeds
    /// - `KYC_RECORD_SEED`
    /// - The cleared address
    #[account(
        mut,
        close = recipient,
        seeds = [KYC_RECORD_SEED, kyc_record.account.as_ref()],
        bump = kyc_record.bump,
    )]
    pub kyc_record: Account<'info, KycRecord>,

    /// The `Roles` account verifying the authority has the `ADMIN_ROLE_IDENTITY_REGISTRY` role
    /// # PDA Seeds
    /// - `ADMIN_ROLE_IDENTITY_REGISTRY`
    /// - The authority's address
    #[account(
        seeds = [RoleType::ADMIN_ROLE_IDENTITY_REGISTRY, authority.key().as_ref()],
        bump = authority_role_account.bump,
    )]
    pub authority_role_account: Account<'info, Roles>,
}

impl<'info> RevokeKyc<'info> {
    pub fn revoke_kyc(&mut self) -> Result<()> {
        PaymasterEntryPoint::RevokeKyc.authorize(
            &self.authority.key(),
            Credential::Role(&self.authority_role_account),
        )?;

        emit!(KycRevoked {
            account: self.kyc_record.account,
            revoked_by: self.authority.key(),
        });

        Ok(())
    }
}
