use anchor_lang::prelude::*;

use crate::state::{AppLimits, PostOpMode, RoleType};

/// Event emitted when a role is granted to a user
/// Fields:
/// - role: The role that was granted
/// - grantee: The public key of the user who was granted the role
/// - granter: The public key of the user who granted the role
#[event]
pub struct RoleGranted {
    pub role: RoleType,
    pub grantee: Pubkey,
    pub granter: Pubkey,
}

/// Event emitted when a role is revoked from a user
/// Fields:
/// - role: The role that was revoked
/// - grantee: The public key of the user who had the role revoked
/// - revoker: The public key of the user who revoked the role
#[event]
pub struct RoleRevoked {
    pub role: RoleType,
    pub grantee: Pubkey,
    pub revoker: Pubkey,
}

/// Event emitted when the paymaster configuration is created or updated
#[event]
pub struct PaymasterConfigSet {
    pub entry_point: Pubkey,
    pub withdrawal_delay_slots: u64,
    pub user_op_max_cost: u64,
    pub post_op_overhead: u64,
    pub authority: Pubkey,
}

/// Event emitted when the paymaster is paused or resumed
/// Fields:
/// - is_paused: Boolean indicating if validation is paused
/// - pauser: The address of the operator who performed the pause/unpause action
#[event]
pub struct PaymasterPaused {
    pub is_paused: bool,
    pub pauser: Pubkey,
}

/// Event emitted when lamports are deposited for an app
/// Fields:
/// - app: The sponsoring application
/// - funder: The account that provided the lamports
/// - amount: The amount deposited
/// - balance: The app balance after the deposit
#[event]
pub struct SponsorDeposited {
    pub app: Pubkey,
    pub funder: Pubkey,
    pub amount: u64,
    pub balance: u64,
}

/// Event emitted when an app controller requests a withdrawal
#[event]
pub struct WithdrawalRequested {
    pub app: Pubkey,
    pub controller: Pubkey,
    pub unlock_slot: u64,
    pub balance: u64,
}

/// Event emitted when a pending withdrawal request is cancelled
#[event]
pub struct WithdrawalCancelled {
    pub app: Pubkey,
    pub controller: Pubkey,
}

/// Event emitted when a withdrawal is finalized
/// Fields:
/// - app: The sponsoring application
/// - to: The account that received the lamports
/// - amount: The amount withdrawn
/// - balance: The app balance after the withdrawal
#[event]
pub struct WithdrawalFinalized {
    pub app: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub balance: u64,
}

/// Event emitted when a user operation passes paymaster validation
#[event]
pub struct UserOpSponsored {
    pub app: Pubkey,
    pub sender: Pubkey,
    pub op_hash: [u8; 32],
    pub max_cost: u64,
}

/// Event emitted when a user operation is settled and its gas is charged to the app
/// Fields:
/// - app: The sponsoring application
/// - op_hash: The settled operation hash
/// - mode: The outcome reported by the EntryPoint
/// - actual_gas_cost: The gas cost reported by the EntryPoint
/// - amount: The amount debited from the app balance
#[event]
pub struct UserOpCharged {
    pub app: Pubkey,
    pub op_hash: [u8; 32],
    pub mode: PostOpMode,
    pub actual_gas_cost: u64,
    pub amount: u64,
}

/// Event emitted when an admin overrides (or clears the override of) an app's limits
#[event]
pub struct LimitOverrideSet {
    pub app: Pubkey,
    pub limits: Option<AppLimits>,
    pub authority: Pubkey,
}

/// Event emitted when an app is registered or its metadata is updated
#[event]
pub struct AppMetadataSet {
    pub app: Pubkey,
    pub controller: Pubkey,
    pub limits: AppLimits,
    pub kyc_required: bool,
}

/// Event emitted when a contract is linked to a sponsoring app
#[event]
pub struct SponsorLinkSet {
    pub contract: Pubkey,
    pub app: Pubkey,
}

/// Event emitted when a contract's sponsor link is removed
#[event]
pub struct SponsorLinkRemoved {
    pub contract: Pubkey,
    pub removed_by: Pubkey,
}

/// Event emitted when an address is granted KYC clearance
#[event]
pub struct KycGranted {
    pub account: Pubkey,
    pub granted_by: Pubkey,
}

/// Event emitted when an address loses KYC clearance
#[event]
pub struct KycRevoked {
    pub account: Pubkey,
    pub revoked_by: Pubkey,
}
