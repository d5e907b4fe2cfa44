use anchor_lang::prelude::*;

use crate::{errors::PaymasterError, state::AppLimits};

/// AppMetadata account - registry entry for a sponsoring application
#[account]
#[derive(InitSpace, Debug)]
pub struct AppMetadata {
    // The app identifier
    pub app: Pubkey,

    // The only key allowed to withdraw the app's deposit
    pub controller: Pubkey,

    // Rate and gas limits applied to the app's operations
    pub limits: AppLimits,

    // Whether senders must hold a KYC record to be sponsored
    pub kyc_required: bool,

    // The bump used to derive the PDA for this account
    // Stored so we don't need to recalculate it later
    pub bump: u8,
}

impl AppMetadata {
    /// Applies the app's KYC policy to `sender`
    /// # Arguments
    /// * `sender` - The user operation sender
    /// * `record` - The sender's KYC record, if one exists
    /// # Returns
    /// * `Result<()>` - Ok if KYC is not required or the record belongs to `sender`, Err(KYCRequired) otherwise
    pub fn check_kyc(&self, sender: &Pubkey, record: Option<&KycRecord>) -> Result<()> {
        if !self.kyc_required {
            return Ok(());
        }

        match record {
            Some(record) if record.account == *sender => Ok(()),
            _ => {
                msg!("App {} requires KYC for sender {}", self.app, sender);
                err!(PaymasterError::KYCRequired)
            }
        }
    }
}

/// SponsorLink account - maps a contract to the app that sponsors it
/// An app is linked to itself when it is registered
#[account]
#[derive(InitSpace, Debug)]
pub struct SponsorLink {
    pub contract: Pubkey,
    pub app: Pubkey,
    pub bump: u8,
}

impl SponsorLink {
    /// Resolves the app sponsoring `sender` through this link.
    /// The link must belong to `sender` and point at `app`.
    /// # Returns
    /// * `Result<Pubkey>` - The sponsoring app, Err(NotSponsored) otherwise
    pub fn sponsors(&self, sender: &Pubkey, app: &Pubkey) -> Result<Pubkey> {
        if self.contract != *sender || self.app != *app {
            msg!("Sender {} is not sponsored by app {}", sender, app);
            return err!(PaymasterError::NotSponsored);
        }

        Ok(self.app)
    }
}

/// KycRecord account - marker that an address has passed KYC
/// Its existence is the only thing checked during validation
#[account]
#[derive(InitSpace, Debug)]
pub struct KycRecord {
    pub account: Pubkey,
    pub granted_at: i64,
    pub bump: u8,
}
