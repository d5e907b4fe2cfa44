use anchor_lang::prelude::*;

/// CHAIN IDS (Solana genesis hashes)
/// Mainnet-beta genesis hash
#[cfg(any(feature = "mainnet", feature = "testnet"))]
pub const CHAIN_ID: Pubkey = pubkey!("5eykt4UsFv8P8NJdTREpY1vzqKqZKvdpKuc147dw2N9d");
/// Devnet genesis hash
#[cfg(feature = "devnet")]
pub const CHAIN_ID: Pubkey = pubkey!("EtWTRABZaYq6iMfeYKouRu166VU2xqa1wcaWoxPkrZBG");
/// Localnet genesis hash (uses devnet)
#[cfg(feature = "localnet")]
pub const CHAIN_ID: Pubkey = pubkey!("EtWTRABZaYq6iMfeYKouRu166VU2xqa1wcaWoxPkrZBG");
/// Default genesis hash (devnet)
#[cfg(not(any(
    feature = "mainnet",
    feature = "testnet",
    feature = "devnet",
    feature = "localnet"
)))]
pub const CHAIN_ID: Pubkey = pubkey!("EtWTRABZaYq6iMfeYKouRu166VU2xqa1wcaWoxPkrZBG");

// PDA SEEDS

/// Seed for the PaymasterConfig PDA
pub const PAYMASTER_CONFIG_SEED: &[u8] = b"paymaster_config";
/// Seed for SponsorAccount PDA (per-app deposit and limiter state)
pub const SPONSOR_ACCOUNT_SEED: &[u8] = b"sponsor";
/// Seed for CostLock PDA (one per in-flight user operation)
pub const COST_LOCK_SEED: &[u8] = b"cost_lock";
/// Seed for AppMetadata PDA
pub const APP_METADATA_SEED: &[u8] = b"app_metadata";
/// Seed for SponsorLink PDA
pub const SPONSOR_LINK_SEED: &[u8] = b"sponsor_link";
/// Seed for KycRecord PDA
pub const KYC_RECORD_SEED: &[u8] = b"kyc";

// PAYMASTER DEFAULTS

/// Current layout version of the PaymasterConfig account
pub const PAYMASTER_CONFIG_VERSION: u8 = 1;

/// Default number of slots between a withdrawal request and its finalization
/// ~1 hour at 400ms slots
pub const DEFAULT_WITHDRAWAL_DELAY_SLOTS: u64 = 9_000;

/// Upper bound accepted for `withdrawal_delay_slots` (~30 days at 400ms slots)
pub const MAX_WITHDRAWAL_DELAY_SLOTS: u64 = 6_480_000;

/// Default cap on the `max_cost` a single user operation may reserve (0.03 SOL)
pub const DEFAULT_USER_OP_MAX_COST: u64 = 30_000_000;

/// Validation data returned to the EntryPoint: no signature failure, no time range
pub const VALIDATION_DATA_NONE: u64 = 0;
