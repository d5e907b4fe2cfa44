use anchor_lang::prelude::*;
use anchor_lang::{system_program, Discriminator};

use crate::errors::PaymasterError;

/// Reads a record this program may or may not have created at a PDA.
/// An absent, closed, foreign or mistyped account fails with `missing`.
/// # Arguments
/// * `owner` - The current owner of the account.
/// * `data` - The account data.
/// * `missing` - The error reported when no such record exists.
/// # Returns
/// * `Result<T>` - The deserialized record.
pub fn decode_program_record<T: AccountDeserialize + Discriminator>(
    owner: &Pubkey,
    data: &[u8],
    missing: PaymasterError,
) -> Result<T> {
    if *owner != crate::ID || data.len() < 8 || data[..8] != *T::DISCRIMINATOR {
        return Err(missing.into());
    }

    T::try_deserialize(&mut &data[..]).map_err(|_| missing.into())
}

#[inline(always)]
pub fn load_program_record<T: AccountDeserialize + Discriminator>(
    account: &AccountInfo,
    missing: PaymasterError,
) -> Result<T> {
    let data = account.try_borrow_data()?;
    decode_program_record(account.owner, &data, missing)
}

/// Writes a record loaded with `load_program_record` back into its account
pub fn store_program_record<T: AccountSerialize>(account: &AccountInfo, record: &T) -> Result<()> {
    require_keys_eq!(*account.owner, crate::ID, PaymasterError::ProgramMismatch);

    let mut data = account.try_borrow_mut_data()?;
    record.try_serialize(&mut &mut data[..])?;

    Ok(())
}

/// Closes a program-owned account, sending its lamports to `recipient`
pub fn close_program_account(account: &AccountInfo, recipient: &AccountInfo) -> Result<()> {
    require_keys_eq!(*account.owner, crate::ID, PaymasterError::ProgramMismatch);

    **recipient.lamports.borrow_mut() = recipient
        .lamports()
        .checked_add(account.lamports())
        .ok_or(PaymasterError::MathOverflow)?;
    **account.lamports.borrow_mut() = 0;

    account.resize(0)?;
    account.assign(&system_program::ID);

    Ok(())
}

/// Moves lamports out of a program-owned account
pub fn transfer_program_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> Result<()> {
    let remaining = from
        .lamports()
        .checked_sub(amount)
        .ok_or(PaymasterError::InsufficientBalance)?;
    let credited = to
        .lamports()
        .checked_add(amount)
        .ok_or(PaymasterError::MathOverflow)?;

    **from.lamports.borrow_mut() = remaining;
    **to.lamports.borrow_mut() = credited;

    Ok(())
}
