use anchor_lang::prelude::*;

use crate::errors::PaymasterError;

/// Roles state account - tracks role assignments for addresses
#[account]
pub struct Roles {
    // The address assigned to the role
    pub address: Pubkey,

    // The type of role assigned
    pub role: RoleType,

    // The bump used to derive the PDA for this account
    // Stored so we don't need to recalculate it later
    pub bump: u8,
}

impl Space for Roles {
    const INIT_SPACE: usize = 8 + size_of::<Roles>();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorDeserialize, AnchorSerialize)]
pub enum RoleType {
    AdminRolePaymaster,
    PauserRolePaymaster,
    AdminRoleAppRegistry,
    AdminRoleIdentityRegistry,
}

impl RoleType {
    pub const ADMIN_ROLE_PAYMASTER: &[u8] = b"AdminRolePaymaster";
    pub const PAUSER_ROLE_PAYMASTER: &[u8] = b"PauserRolePaymaster";
    pub const ADMIN_ROLE_APP_REGISTRY: &[u8] = b"AdminRoleAppRegistry";
    pub const ADMIN_ROLE_IDENTITY_REGISTRY: &[u8] = b"AdminRoleIdentityRegistry";

    pub const fn seed(&self) -> &'static [u8] {
        match self {
            RoleType::AdminRolePaymaster => Self::ADMIN_ROLE_PAYMASTER,
            RoleType::PauserRolePaymaster => Self::PAUSER_ROLE_PAYMASTER,
            RoleType::AdminRoleAppRegistry => Self::ADMIN_ROLE_APP_REGISTRY,
            RoleType::AdminRoleIdentityRegistry => Self::ADMIN_ROLE_IDENTITY_REGISTRY,
        }
    }
}

/// The credential a caller must present to use an entry point
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Any signer
    Anyone,
    /// The EntryPoint key stored in `PaymasterConfig`
    EntryPoint,
    /// The controller recorded for the app in its `AppMetadata`
    AppController,
    /// A `Roles` account of the given type owned by the signer
    Role(RoleType),
    /// The program upgrade authority
    UpgradeAuthority,
}

/// Every gated instruction of the program
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymasterEntryPoint {
    GrantRole,
    RevokeRole,
    InitializePaymaster,
    UpdatePaymasterConfig,
    PausePaymaster,
    ResumePaymaster,
    SetLimitOverride,
    DepositFor,
    RequestWithdraw,
    CancelWithdraw,
    Withdraw,
    ValidatePaymasterUserOp,
    PostOp,
    RegisterApp,
    UpdateApp,
    SetSponsor,
    RemoveSponsor,
    GrantKyc,
    RevokeKyc,
}

impl PaymasterEntryPoint {
    /// Capability table: the single credential each entry point accepts
    pub const fn required_capability(self) -> Capability {
        match self {
            Self::GrantRole | Self::RevokeRole => Capability::UpgradeAuthority,
            Self::InitializePaymaster
            | Self::UpdatePaymasterConfig
            | Self::ResumePaymaster
            | Self::SetLimitOverride => Capability::Role(RoleType::AdminRolePaymaster),
            Self::PausePaymaster => Capability::Role(RoleType::PauserRolePaymaster),
            Self::DepositFor => Capability::Anyone,
            Self::RequestWithdraw | Self::CancelWithdraw | Self::Withdraw => {
                Capability::AppController
            }
            Self::ValidatePaymasterUserOp | Self::PostOp => Capability::EntryPoint,
            Self::RegisterApp | Self::UpdateApp | Self::SetSponsor | Self::RemoveSponsor => {
                Capability::Role(RoleType::AdminRoleAppRegistry)
            }
            Self::GrantKyc | Self::RevokeKyc => {
                Capability::Role(RoleType::AdminRoleIdentityRegistry)
            }
        }
    }

    /// Checks the presented credential against the capability table
    /// # Arguments
    /// * `signer` - The key that signed the instruction
    /// * `credential` - The credential the instruction's accounts provide
    /// # Returns
    /// * `Result<()>` - Ok if the credential satisfies the entry point, Err(Unauthorized) otherwise
    pub fn authorize(self, signer: &Pubkey, credential: Credential<'_>) -> Result<()> {
        let authorized = match (self.required_capability(), credential) {
            (Capability::Anyone, _) => true,
            (Capability::EntryPoint, Credential::EntryPoint { configured }) => {
                configured == *signer
            }
            (Capability::AppController, Credential::AppController { controller }) => {
                controller == *signer
            }
            (Capability::Role(role), Credential::Role(account)) => {
                account.role == role && account.address == *signer
            }
            (Capability::UpgradeAuthority, Credential::UpgradeAuthority) => true,
            _ => false,
        };

        require!(authorized, PaymasterError::Unauthorized);

        Ok(())
    }
}

/// What an instruction's accounts present as proof of a capability
#[derive(Clone, Copy)]
pub enum Credential<'a> {
    /// No credential beyond the signature itself
    Signer,
    /// The EntryPoint key currently configured
    EntryPoint { configured: Pubkey },
    /// The controller recorded for the app
    AppController { controller: Pubkey },
    /// A role account whose PDA address has already been checked
    Role(&'a Roles),
    /// The ProgramData upgrade authority, already checked by account constraints
    UpgradeAuthority,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ENTRY_POINTS: [PaymasterEntryPoint; 19] = [
        PaymasterEntryPoint::GrantRole,
        PaymasterEntryPoint::RevokeRole,
        PaymasterEntryPoint::InitializePaymaster,
        PaymasterEntryPoint::UpdatePaymasterConfig,
        PaymasterEntryPoint::PausePaymaster,
        PaymasterEntryPoint::ResumePaymaster,
        PaymasterEntryPoint::SetLimitOverride,
        PaymasterEntryPoint::DepositFor,
        PaymasterEntryPoint::RequestWithdraw,
        PaymasterEntryPoint::CancelWithdraw,
        PaymasterEntryPoint::Withdraw,
        PaymasterEntryPoint::ValidatePaymasterUserOp,
        PaymasterEntryPoint::PostOp,
        PaymasterEntryPoint::RegisterApp,
        PaymasterEntryPoint::UpdateApp,
        PaymasterEntryPoint::SetSponsor,
        PaymasterEntryPoint::RemoveSponsor,
        PaymasterEntryPoint::GrantKyc,
        PaymasterEntryPoint::RevokeKyc,
    ];

    #[test]
    fn test_entry_point_capability_is_exclusive_to_validation_and_settlement() {
        let gated: Vec<_> = ALL_ENTRY_POINTS
            .iter()
            .filter(|ep| ep.required_capability() == Capability::EntryPoint)
            .copied()
            .collect();

        assert_eq!(
            gated,
            vec![
                PaymasterEntryPoint::ValidatePaymasterUserOp,
                PaymasterEntryPoint::PostOp
            ]
        );
    }

    #[test]
    fn test_controller_capability_only_manages_withdrawals() {
        for ep in ALL_ENTRY_POINTS {
            if ep.required_capability() == Capability::AppController {
                assert!(matches!(
                    ep,
                    PaymasterEntryPoint::RequestWithdraw
                        | PaymasterEntryPoint::CancelWithdraw
                        | PaymasterEntryPoint::Withdraw
                ));
            }
        }
    }

    #[test]
    fn test_deposit_is_permissionless() {
        let anyone = Pubkey::new_unique();
        assert!(PaymasterEntryPoint::DepositFor
            .authorize(&anyone, Credential::Signer)
            .is_ok());
    }

    #[test]
    fn test_entry_point_must_match_configured_key() {
        let entry_point = Pubkey::new_unique();
        let bundler = Pubkey::new_unique();

        assert!(PaymasterEntryPoint::ValidatePaymasterUserOp
            .authorize(&entry_point, Credential::EntryPoint { configured: entry_point })
            .is_ok());

        let result = PaymasterEntryPoint::PostOp
            .authorize(&bundler, Credential::EntryPoint { configured: entry_point });
        assert_eq!(result.unwrap_err(), PaymasterError::Unauthorized.into());
    }

    #[test]
    fn test_controller_cannot_act_as_entry_point() {
        let controller = Pubkey::new_unique();

        let result = PaymasterEntryPoint::ValidatePaymasterUserOp
            .authorize(&controller, Credential::AppController { controller });
        assert_eq!(result.unwrap_err(), PaymasterError::Unauthorized.into());

        let result = PaymasterEntryPoint::Withdraw
            .authorize(&controller, Credential::EntryPoint { configured: controller });
        assert_eq!(result.unwrap_err(), PaymasterError::Unauthorized.into());
    }

    #[test]
    fn test_role_must_match_entry_point_and_holder() {
        let admin = Pubkey::new_unique();
        let pauser_role = Roles {
            address: admin,
            role: RoleType::PauserRolePaymaster,
            bump: 0,
        };
        let admin_role = Roles {
            address: admin,
            role: RoleType::AdminRolePaymaster,
            bump: 0,
        };

        assert!(PaymasterEntryPoint::PausePaymaster
            .authorize(&admin, Credential::Role(&pauser_role))
            .is_ok());
        assert!(PaymasterEntryPoint::SetLimitOverride
            .authorize(&admin, Credential::Role(&admin_role))
            .is_ok());

        // A pauser cannot resume or override limits
        assert!(PaymasterEntryPoint::ResumePaymaster
            .authorize(&admin, Credential::Role(&pauser_role))
            .is_err());

        // Someone else's role account does not count
        let other = Pubkey::new_unique();
        assert!(PaymasterEntryPoint::SetLimitOverride
            .authorize(&other, Credential::Role(&admin_role))
            .is_err());
    }

    #[test]
    fn test_registry_roles_are_separate() {
        let operator = Pubkey::new_unique();
        let app_registry_admin = Roles {
            address: operator,
            role: RoleType::AdminRoleAppRegistry,
            bump: 0,
        };

        assert!(PaymasterEntryPoint::SetSponsor
            .authorize(&operator, Credential::Role(&app_registry_admin))
            .is_ok());
        assert!(PaymasterEntryPoint::GrantKyc
            .authorize(&operator, Credential::Role(&app_registry_admin))
            .is_err());
    }

    #[test]
    fn test_role_seeds_are_unique() {
        let seeds = [
            RoleType::AdminRolePaymaster.seed(),
            RoleType::PauserRolePaymaster.seed(),
            RoleType::AdminRoleAppRegistry.seed(),
            RoleType::AdminRoleIdentityRegistry.seed(),
        ];
        for (i, a) in seeds.iter().enumerate() {
            for b in seeds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
