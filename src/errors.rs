use anchor_lang::prelude::*;

#[error_code]
pub enum PaymasterError {
    #[msg("Target contract is not sponsored by any application")]
    NotSponsored,
    #[msg("Sender does not hold a valid KYC record")]
    KYCRequired,
    #[msg("Application rate limit exceeded")]
    RateLimitExceeded,
    #[msg("Application gas limit exceeded")]
    GasLimitExceeded,
    #[msg("Insufficient sponsor balance")]
    InsufficientBalance,
    #[msg("Caller is not authorized for this entry point")]
    Unauthorized,
    #[msg("Withdrawal is still locked")]
    WithdrawalLocked,
    #[msg("No active cost lock for this operation")]
    NoActiveLock,
    #[msg("Invalid Amount")]
    InvalidAmount,
    #[msg("Invalid application limits")]
    InvalidLimits,
    #[msg("Math Overflow")]
    MathOverflow,
    #[msg("ProgramMismatch")]
    ProgramMismatch,
    #[msg("Invalid User")]
    InvalidUser,
    #[msg("A withdrawal request is already pending")]
    WithdrawalAlreadyRequested,
    #[msg("No withdrawal request is pending")]
    NoPendingWithdrawal,
    #[msg("Paymaster is paused")]
    PaymasterPaused,
    #[msg("User operation max cost exceeds the paymaster cap")]
    UserOpCostTooHigh,
    #[msg("paymaster_and_data does not reference this paymaster")]
    InvalidPaymasterData,
    #[msg("Operation hash does not match the user operation")]
    OpHashMismatch,
    #[msg("Operation has already been validated")]
    OperationAlreadyValidated,
    #[msg("Paymaster context could not be decoded")]
    InvalidPaymasterContext,
    #[msg("Actual gas cost exceeds the locked cost")]
    ActualCostExceedsLock,
    #[msg("Paymaster config version mismatch, migration required")]
    ConfigVersionMismatch,
    #[msg("Invalid withdrawal delay")]
    InvalidWithdrawalDelay,
    #[msg("Invalid EntryPoint address")]
    InvalidEntryPoint,
    #[msg("Time since window start has a negative value")]
    NegativeTimeSinceWindowStart,
}
