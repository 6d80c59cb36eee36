// Copyright (c) 2024-2025 The PicoPot Developers

//! Shared fixtures: an in-process device loopback and a scriptable
//! ledger client

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use picopot::{
    ledger::{BlockRef, DraftTransaction, LedgerClient, SignedTransaction},
    transport::Channel,
    DeviceHandle, Error,
};
use picopot_core::{
    engine::{Engine, NullDriver},
    store::{MemBackend, SecretStore},
};

/// Channel running a device engine in-process, no pacing, no socket
pub struct LoopbackChannel {
    engine: Engine<MemBackend, NullDriver>,
    replies: VecDeque<String>,
}

impl Default for LoopbackChannel {
    fn default() -> Self {
        Self {
            engine: Engine::new(SecretStore::new(MemBackend::default()), NullDriver),
            replies: VecDeque::new(),
        }
    }
}

#[async_trait]
impl Channel for LoopbackChannel {
    async fn send_line(&mut self, line: &str) -> Result<(), Error> {
        let replies = &mut self.replies;
        self.engine.handle_line(line, &mut |r| {
            replies.push_back(r.encode());
        });
        Ok(())
    }

    async fn recv_line(&mut self) -> Result<String, Error> {
        self.replies.pop_front().ok_or(Error::RequestTimeout)
    }
}

/// Fresh handle over a loopback device
pub fn loopback() -> DeviceHandle<LoopbackChannel> {
    DeviceHandle::from(LoopbackChannel::default())
}

/// Scriptable ledger client capturing broadcast transactions
pub struct MockLedger {
    pub balance: u64,
    /// `None` makes fee estimation fail
    pub fee: Option<u64>,
    pub block_ref: BlockRef,
    pub broadcasts: Mutex<Vec<SignedTransaction>>,
}

impl MockLedger {
    pub fn new(balance: u64, fee: Option<u64>) -> Self {
        Self {
            balance,
            fee,
            block_ref: BlockRef([7u8; 32]),
            broadcasts: Mutex::new(vec![]),
        }
    }

    /// The single broadcast transaction, panicking if there is not
    /// exactly one
    pub fn only_broadcast(&self) -> SignedTransaction {
        let txs = self.broadcasts.lock().unwrap();
        assert_eq!(txs.len(), 1);
        txs[0].clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, _account: &[u8; 32]) -> Result<u64, Error> {
        Ok(self.balance)
    }

    async fn latest_block_ref(&self) -> Result<BlockRef, Error> {
        Ok(self.block_ref)
    }

    async fn estimate_fee(&self, _draft: &DraftTransaction) -> Result<u64, Error> {
        self.fee
            .ok_or_else(|| Error::Network("fee estimation unavailable".to_string()))
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<String, Error> {
        self.broadcasts.lock().unwrap().push(tx.clone());
        Ok(hex::encode(&tx.signature[..8]))
    }
}
