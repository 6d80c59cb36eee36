// Copyright (c) 2024-2025 The PicoPot Developers

//! Transfer flow: estimate the fee, fit the amount to the balance, sign
//! with the device seed and broadcast.
//!
//! Fees are estimated against a nominal draft and padded by ten percent;
//! if estimation fails the flow falls back to a fixed fee rather than
//! aborting. When the balance cannot cover the requested amount plus the
//! padded fee but exceeds the fee alone, the amount is lowered to spend
//! the remainder and the caller is told via [AmountDecision::Adjusted].
//! A final integer guard re-checks the arithmetic before anything is
//! signed.

use log::{debug, warn};
use zeroize::Zeroize;

use picopot_core::crypto;

use crate::{
    handle::DeviceHandle,
    ledger::{DraftTransaction, LedgerClient, SignedTransaction},
    transport::Channel,
    Error,
};

/// Fee assumed when the ledger cannot provide an estimate
pub const FALLBACK_FEE_LAMPORTS: u64 = 10_000;

/// Nominal amount used for the fee-estimation draft
const FEE_PROBE_LAMPORTS: u64 = 10_000;

/// How the transfer amount was settled
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AmountDecision {
    /// The requested amount fit within the balance
    Requested(u64),
    /// The requested amount was lowered to fit balance minus fee
    Adjusted { requested: u64, adjusted: u64 },
}

impl AmountDecision {
    /// The amount actually transferred, in lamports
    pub fn lamports(&self) -> u64 {
        match self {
            AmountDecision::Requested(v) => *v,
            AmountDecision::Adjusted { adjusted, .. } => *adjusted,
        }
    }
}

/// Outcome of a completed transfer
#[derive(Clone, Debug, PartialEq)]
pub struct SendReceipt {
    /// Ledger-assigned transaction identifier
    pub transaction_id: String,
    /// Amount settlement, including any adjustment
    pub decision: AmountDecision,
    /// Padded fee the flow budgeted for, in lamports
    pub fee: u64,
}

/// Transfer builder binding a device handle to a ledger client
pub struct TransferBuilder<'a, C: Channel, L: LedgerClient> {
    device: &'a mut DeviceHandle<C>,
    ledger: &'a L,
}

impl<'a, C: Channel, L: LedgerClient> TransferBuilder<'a, C, L> {
    pub fn new(device: &'a mut DeviceHandle<C>, ledger: &'a L) -> Self {
        Self { device, ledger }
    }

    /// Execute a transfer of `lamports` to `recipient`.
    ///
    /// The seed leaves the device only for the duration of the signing
    /// call and is wiped immediately after.
    pub async fn send(
        &mut self,
        recipient: &str,
        lamports: u64,
        password: &str,
    ) -> Result<SendReceipt, Error> {
        let recipient = crate::ledger::decode_address(recipient)?;

        let sender = match self.device.public_key().await? {
            Some(k) => k,
            None => return Err(Error::NoWallet),
        };

        let balance = self.ledger.get_balance(&sender).await?;
        let block_ref = self.ledger.latest_block_ref().await?;

        // Estimate against a nominal draft; the fee does not depend on
        // the final amount
        let probe = DraftTransaction {
            sender,
            recipient,
            lamports: FEE_PROBE_LAMPORTS,
            block_ref,
        };
        let fee = match self.ledger.estimate_fee(&probe).await {
            Ok(f) => f,
            Err(e) => {
                warn!("fee estimation failed ({e}), using fallback");
                FALLBACK_FEE_LAMPORTS
            }
        };
        let fee = fee.saturating_add(fee / 10);

        debug!("balance: {balance}, padded fee: {fee}, requested: {lamports}");

        let decision = if balance >= lamports.saturating_add(fee) {
            AmountDecision::Requested(lamports)
        } else if balance > fee {
            AmountDecision::Adjusted {
                requested: lamports,
                adjusted: balance - fee,
            }
        } else {
            return Err(Error::InsufficientFunds {
                balance,
                required: lamports.saturating_add(fee),
            });
        };

        let amount = decision.lamports();

        // Guard the settled arithmetic before any secret is revealed
        if amount.saturating_add(fee) > balance {
            return Err(Error::InsufficientFunds {
                balance,
                required: amount.saturating_add(fee),
            });
        }

        let draft = DraftTransaction {
            sender,
            recipient,
            lamports: amount,
            block_ref,
        };
        let message = draft.message();

        let mut seed = self.device.reveal_seed(password).await?;
        let signature = crypto::sign(&seed.0, &message);
        seed.zeroize();

        let tx = SignedTransaction { draft, signature };
        let transaction_id = self.ledger.broadcast(&tx).await?;

        Ok(SendReceipt {
            transaction_id,
            decision,
            fee,
        })
    }
}
