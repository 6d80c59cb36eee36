// Copyright (c) 2024-2025 The PicoPot Developers

//! Ledger-facing types and the [LedgerClient] abstraction.
//!
//! The host signs locally; the ledger is only consulted for balance, fee
//! and recency information and to broadcast the finished transaction. RPC
//! details stay behind [LedgerClient] so the transfer flow in [crate::tx]
//! is testable without a network.

use async_trait::async_trait;

use crate::Error;

/// Recency anchor a transaction commits to
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockRef(pub [u8; 32]);

/// Unsigned transfer, fully determined before signing
#[derive(Clone, Debug, PartialEq)]
pub struct DraftTransaction {
    pub sender: [u8; 32],
    pub recipient: [u8; 32],
    pub lamports: u64,
    pub block_ref: BlockRef,
}

impl DraftTransaction {
    /// Canonical signing message: sender, recipient, little-endian
    /// amount, block reference
    pub fn message(&self) -> Vec<u8> {
        let mut msg = Vec::with_capacity(32 + 32 + 8 + 32);
        msg.extend_from_slice(&self.sender);
        msg.extend_from_slice(&self.recipient);
        msg.extend_from_slice(&self.lamports.to_le_bytes());
        msg.extend_from_slice(&self.block_ref.0);
        msg
    }
}

/// Draft plus its signature, ready to broadcast
#[derive(Clone, Debug, PartialEq)]
pub struct SignedTransaction {
    pub draft: DraftTransaction,
    pub signature: [u8; 64],
}

/// Ledger RPC operations needed by the transfer flow
#[async_trait]
pub trait LedgerClient {
    /// Spendable balance for an account, in lamports
    async fn get_balance(&self, account: &[u8; 32]) -> Result<u64, Error>;

    /// Latest block reference for transaction recency
    async fn latest_block_ref(&self) -> Result<BlockRef, Error>;

    /// Estimated fee for the draft, in lamports
    async fn estimate_fee(&self, draft: &DraftTransaction) -> Result<u64, Error>;

    /// Submit a signed transaction, returning the ledger's identifier
    async fn broadcast(&self, tx: &SignedTransaction) -> Result<String, Error>;
}

/// Decode a base58 account address to raw key bytes
pub fn decode_address(addr: &str) -> Result<[u8; 32], Error> {
    let bytes = bs58::decode(addr)
        .into_vec()
        .map_err(|_| Error::InvalidAddress)?;
    bytes.as_slice().try_into().map_err(|_| Error::InvalidAddress)
}

/// Encode raw key bytes as a base58 account address
pub fn encode_address(key: &[u8; 32]) -> String {
    bs58::encode(key).into_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address_round_trip() {
        let key: [u8; 32] = rand::random();
        let addr = encode_address(&key);
        assert_eq!(decode_address(&addr).unwrap(), key);
    }

    #[test]
    fn address_rejects_bad_input() {
        // Invalid alphabet
        assert!(matches!(
            decode_address("0OIl"),
            Err(Error::InvalidAddress)
        ));
        // Wrong decoded length
        assert!(matches!(decode_address("abc"), Err(Error::InvalidAddress)));
    }

    #[test]
    fn message_layout() {
        let draft = DraftTransaction {
            sender: [1u8; 32],
            recipient: [2u8; 32],
            lamports: 0x0102_0304_0506_0708,
            block_ref: BlockRef([3u8; 32]),
        };

        let msg = draft.message();
        assert_eq!(msg.len(), 104);
        assert_eq!(&msg[..32], &[1u8; 32]);
        assert_eq!(&msg[32..64], &[2u8; 32]);
        assert_eq!(&msg[64..72], &0x0102_0304_0506_0708u64.to_le_bytes());
        assert_eq!(&msg[72..], &[3u8; 32]);
    }
}
