use anchor_lang::prelude::*;

use crate::{
    errors::PaymasterError,
    events::{RoleGranted, RoleRevoked},
    state::{Credential, PaymasterEntryPoint, RoleType, Roles},
};

/// Checks that `program_data` is the ProgramData account of this program
fn verify_program_data(
    program: &Program<crate::program::SponsorPaymaster>,
    program_data: &Account<ProgramData>,
) -> Result<()> {
    match program.programdata_address()? {
        Some(program_data_address) => {
            require_keys_eq!(
                program_data_address,
                program_data.key(),
                PaymasterError::ProgramMismatch
            );
            Ok(())
        }
        None => err!(PaymasterError::ProgramMismatch),
    }
}

/// Grant a role to a user by initializing a `Roles` account
/// Requires the signer to be the program upgrade authority
#[derive(Accounts)]
#[instruction(role: RoleType, user: Pubkey)]
pub struct GrantRole<'info> {
    /// Pays for account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The account with the authority to grant roles, must be the program upgrade authority
    pub authority: Signer<'info>,

    /// The Roles account to be initialized
    /// # PDA Seeds
    /// - The role seed (from RoleType)
    /// - The user's address
    #[account(
        init,
        payer = payer,
        space = Roles::INIT_SPACE,
        seeds = [role.seed(), user.as_ref()],
        bump
    )]
    pub role_to_grant: Account<'info, Roles>,

    /// The system program
    pub system_program: Program<'info, System>,

    /// The Sponsor Paymaster program
    #[account(address = crate::ID)]
    pub program: Program<'info, crate::program::SponsorPaymaster>,

    /// The ProgramData account of the Sponsor Paymaster program
    #[account(
        constraint =
            program_data.upgrade_authority_address == Some(authority.key()) @ PaymasterError::Unauthorized
    )]
    pub program_data: Account<'info, ProgramData>,
}

impl<'info> GrantRole<'info> {
    /// Grant a user a role by initializing the Roles account with the specified role and bump
    /// Validates that the signer is the program upgrade authority
    /// # Arguments
    /// * `role` - The RoleType to assign to the user
    /// * `user` - The address receiving the role
    /// * `bumps` - The bumps used for PDA derivation
    /// # Returns
    /// * `Result<()>` - Ok if successful, Err otherwise
    pub fn grant_role(
        &mut self,
        role: RoleType,
        user: Pubkey,
        bumps: &GrantRoleBumps,
    ) -> Result<()> {
        verify_program_data(&self.program, &self.program_data)?;
        PaymasterEntryPoint::GrantRole
            .authorize(&self.authority.key(), Credential::UpgradeAuthority)?;

        self.role_to_grant.set_inner(Roles {
            address: user,
            role,
            bump: bumps.role_to_grant,
        });

        emit!(RoleGranted {
            role,
            grantee: user,
            granter: self.authority.key(),
        });

        Ok(())
    }
}

/// Revoke a role from a user by closing their `Roles` account
/// Requires the signer to be the program upgrade authority
#[derive(Accounts)]
#[instruction(_role: RoleType)]
pub struct RevokeRole<'info> {
    /// Receives funds from account closure
    #[account(mut)]
    pub recipient: SystemAccount<'info>,

    /// The account with the authority to revoke roles, must be the program upgrade authority
    pub authority: Signer<'info>,

    /// The Roles account to be closed
    /// # PDA Seeds
    /// - `_role.seed()` (the seed for the role)
    /// - `role_to_revoke.address` (the user's address)
    #[account(
        mut,
        close = recipient,
        seeds = [_role.seed(), role_to_revoke.address.as_ref()],
        bump = role_to_revoke.bump
    )]
    pub role_to_revoke: Account<'info, Roles>,

    /// The system program
    pub system_program: Program<'info, System>,

    /// The Sponsor Paymaster program
    #[account(address = crate::ID)]
    pub program: Program<'info, crate::program::SponsorPaymaster>,

    /// The ProgramData account of the Sponsor Paymaster program
    #[account(
        constraint =
            program_data.upgrade_authority_address == Some(authority.key()) @ PaymasterError::Unauthorized
    )]
    pub program_data: Account<'info, ProgramData>,
}

impl<'info> RevokeRole<'info> {
    /// Revoke a role from a user by closing their Roles account
    /// Validates that the signer is the program upgrade authority
    /// # Returns
    /// * `Result<()>` - Ok if successful, Err otherwise
    pub fn revoke_role(&mut self) -> Result<()> {
        verify_program_data(&self.program, &self.program_data)?;
        PaymasterEntryPoint::RevokeRole
            .authorize(&self.authority.key(), Credential::UpgradeAuthority)?;

        emit!(RoleRevoked {
            role: self.role_to_revoke.role,
            grantee: self.role_to_revoke.address,
            revoker: self.authority.key(),
        });

        Ok(())
    }
}
