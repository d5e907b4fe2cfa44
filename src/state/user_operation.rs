use anchor_lang::prelude::*;
use solana_keccak_hasher::{hash, hashv};

use crate::errors::PaymasterError;

/// A user operation as submitted to the EntryPoint.
/// Field order follows ERC-4337. Word-sized fields are carried in native widths.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UserOperation {
    pub sender: Pubkey,
    pub nonce: u128,
    pub init_code: Vec<u8>,
    pub call_data: Vec<u8>,
    pub call_gas_limit: u64,
    pub verification_gas_limit: u64,
    pub pre_verification_gas: u64,
    pub max_fee_per_gas: u64,
    pub max_priority_fee_per_gas: u64,
    pub paymaster_and_data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl UserOperation {
    const WORD: usize = 32;
    const PACKED_WORDS: usize = 10;

    /// Calculates the keccak256 hash identifying this operation.
    /// The signature is excluded so the hash is stable while the wallet signs it.
    /// # Arguments
    /// * `entry_point` - The EntryPoint the operation is submitted to.
    /// * `chain_id` - A 32-byte identifier for the chain.
    /// # Returns
    /// * `[u8; 32]` - The keccak256 hash of the operation.
    pub fn hash(&self, entry_point: &Pubkey, chain_id: &Pubkey) -> [u8; 32] {
        let inner = hash(&self.pack()).to_bytes();
        hashv(&[&inner[..], &entry_point.to_bytes()[..], &chain_id.to_bytes()[..]]).to_bytes()
    }

    /// Packs the operation into ten 32-byte big-endian words.
    /// Dynamic fields are replaced by their keccak256 hash.
    fn pack(&self) -> [u8; Self::WORD * Self::PACKED_WORDS] {
        let mut packed = [0u8; Self::WORD * Self::PACKED_WORDS];

        let words: [[u8; 32]; Self::PACKED_WORDS] = [
            self.sender.to_bytes(),
            Self::word(&self.nonce.to_be_bytes()),
            hash(&self.init_code).to_bytes(),
            hash(&self.call_data).to_bytes(),
            Self::word(&self.call_gas_limit.to_be_bytes()),
            Self::word(&self.verification_gas_limit.to_be_bytes()),
            Self::word(&self.pre_verification_gas.to_be_bytes()),
            Self::word(&self.max_fee_per_gas.to_be_bytes()),
            Self::word(&self.max_priority_fee_per_gas.to_be_bytes()),
            hash(&self.paymaster_and_data).to_bytes(),
        ];

        for (chunk, word) in packed.chunks_exact_mut(Self::WORD).zip(words.iter()) {
            chunk.copy_from_slice(word);
        }

        packed
    }

    /// Left-pads a big-endian integer to a 32-byte word
    fn word(be_bytes: &[u8]) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[Self::WORD - be_bytes.len()..].copy_from_slice(be_bytes);
        word
    }

    /// Checks that `paymaster_and_data` starts with the given paymaster program.
    /// Any bytes after the address are paymaster-specific data.
    pub fn verify_paymaster(&self, paymaster: &Pubkey) -> Result<()> {
        require!(
            self.paymaster_and_data.starts_with(&paymaster.to_bytes()),
            PaymasterError::InvalidPaymasterData
        );
        Ok(())
    }
}

/// Outcome of the user operation reported by the EntryPoint at settlement
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostOpMode {
    OpSucceeded,
    OpReverted,
    PostOpReverted,
}

/// Data handed from validation to settlement through the EntryPoint
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymasterContext {
    pub app: Pubkey,
    pub op_hash: [u8; 32],
    pub max_cost: u64,
}

impl PaymasterContext {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut context = Vec::with_capacity(32 + 32 + 8);
        self.serialize(&mut context)?;
        Ok(context)
    }

    pub fn decode(context: &[u8]) -> Result<Self> {
        Self::try_from_slice(context).map_err(|_| PaymasterError::InvalidPaymasterContext.into())
    }
}

/// Return value of `validate_paymaster_user_op`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PaymasterValidation {
    // Opaque context the EntryPoint passes back to `post_op`
    pub context: Vec<u8>,

    // Packed validation data, zero means valid with no time range
    pub validation_data: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_op() -> UserOperation {
        UserOperation {
            sender: Pubkey::new_unique(),
            nonce: 7,
            init_code: vec![],
            call_data: vec![0xde, 0xad, 0xbe, 0xef],
            call_gas_limit: 100_000,
            verification_gas_limit: 150_000,
            pre_verification_gas: 21_000,
            max_fee_per_gas: 10,
            max_priority_fee_per_gas: 1,
            paymaster_and_data: crate::ID.to_bytes().to_vec(),
            signature: vec![1; 65],
        }
    }

    #[test]
    fn test_hash_ignores_signature() {
        let op = create_test_op();
        let entry_point = Pubkey::new_unique();
        let chain_id = Pubkey::new_unique();

        let resigned = UserOperation {
            signature: vec![2; 65],
            ..op.clone()
        };
        assert_eq!(
            op.hash(&entry_point, &chain_id),
            resigned.hash(&entry_point, &chain_id)
        );
    }

    #[test]
    fn test_hash_binds_fields_entry_point_and_chain() {
        let op = create_test_op();
        let entry_point = Pubkey::new_unique();
        let chain_id = Pubkey::new_unique();
        let base = op.hash(&entry_point, &chain_id);

        let bumped_nonce = UserOperation {
            nonce: 8,
            ..op.clone()
        };
        assert_ne!(base, bumped_nonce.hash(&entry_point, &chain_id));

        let other_call = UserOperation {
            call_data: vec![0xde, 0xad],
            ..op.clone()
        };
        assert_ne!(base, other_call.hash(&entry_point, &chain_id));

        assert_ne!(base, op.hash(&Pubkey::new_unique(), &chain_id));
        assert_ne!(base, op.hash(&entry_point, &Pubkey::new_unique()));
    }

    #[test]
    fn test_pack_layout() {
        let op = create_test_op();
        let packed = op.pack();

        assert_eq!(packed[0..32], op.sender.to_bytes());
        assert_eq!(packed[63], 7);
        assert!(packed[32..63].iter().all(|b| *b == 0));
        assert_eq!(&packed[64..96], &hash(&[]).to_bytes());
        assert_eq!(&packed[152..160], &100_000u64.to_be_bytes());
    }

    #[test]
    fn test_verify_paymaster() {
        let op = create_test_op();
        assert!(op.verify_paymaster(&crate::ID).is_ok());

        let foreign = UserOperation {
            paymaster_and_data: Pubkey::new_unique().to_bytes().to_vec(),
            ..op.clone()
        };
        assert_eq!(
            foreign.verify_paymaster(&crate::ID).unwrap_err(),
            PaymasterError::InvalidPaymasterData.into()
        );

        let empty = UserOperation {
            paymaster_and_data: vec![],
            ..op.clone()
        };
        assert!(empty.verify_paymaster(&crate::ID).is_err());

        // A truncated address is not a prefix match
        let truncated = UserOperation {
            paymaster_and_data: crate::ID.to_bytes()[..31].to_vec(),
            ..op
        };
        assert!(truncated.verify_paymaster(&crate::ID).is_err());
    }

    #[test]
    fn test_verify_paymaster_with_paymaster_data() {
        let mut paymaster_and_data = crate::ID.to_bytes().to_vec();
        paymaster_and_data.extend_from_slice(&[0xaa; 16]);

        let op = UserOperation {
            paymaster_and_data,
            ..create_test_op()
        };
        assert!(op.verify_paymaster(&crate::ID).is_ok());

        // Paymaster data is covered by the operation hash
        let entry_point = Pubkey::new_unique();
        let chain_id = Pubkey::new_unique();
        let without_data = create_test_op();
        let with_data = UserOperation {
            sender: without_data.sender,
            ..op
        };
        assert_ne!(
            with_data.hash(&entry_point, &chain_id),
            without_data.hash(&entry_point, &chain_id)
        );
    }

    #[test]
    fn test_context_decode() {
        let context = PaymasterContext {
            app: Pubkey::new_unique(),
            op_hash: [9; 32],
            max_cost: 42,
        };
        let encoded = context.encode().unwrap();
        assert_eq!(encoded.len(), 72);
        assert_eq!(PaymasterContext::decode(&encoded).unwrap(), context);
    }

    #[test]
    fn test_truncated_context_rejected() {
        let context = PaymasterContext {
            app: Pubkey::new_unique(),
            op_hash: [9; 32],
            max_cost: 42,
        };
        let encoded = context.encode().unwrap();

        assert_eq!(
            PaymasterContext::decode(&encoded[..71]).unwrap_err(),
            PaymasterError::InvalidPaymasterContext.into()
        );
        assert!(PaymasterContext::decode(&[]).is_err());
    }
}
