// Copyright (c) 2024-2025 The PicoPot Developers

//! PicoPot host API library (and CLI)
//!
//! Connects to a PicoPot device over a line [transport::Channel], wraps
//! the wire protocol in a typed [DeviceHandle], and builds, signs and
//! broadcasts transfers via [tx::TransferBuilder] against a
//! [ledger::LedgerClient].

/// Re-export transports for consumer use
pub mod transport;

/// Re-export `picopot-proto` for consumers
pub use picopot_proto as proto;

/// Re-export `picopot-core` for loopback setups and signing primitives
pub use picopot_core;

mod handle;
pub use handle::{DeviceHandle, WalletInfo};

mod error;
pub use error::Error;

pub mod ledger;

pub mod tx;

/// Generic device handle (abstract over transport types)
pub type GenericHandle = DeviceHandle<transport::GenericChannel>;

impl GenericHandle {
    /// Create a new generic device handle
    pub fn new(c: impl Into<transport::GenericChannel>) -> Self {
        Self::from(c.into())
    }
}
