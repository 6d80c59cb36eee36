// Copyright (c) 2024-2025 The PicoPot Developers

use tokio::time::error::Elapsed;

/// PicoPot host API error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Channel I/O error
    #[error("channel i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Request timeout
    #[error("timeout waiting for device response")]
    RequestTimeout,

    /// Device rejected the supplied password
    #[error("wrong password")]
    WrongPassword,

    /// Device holds no wallet
    #[error("no wallet on device")]
    NoWallet,

    /// Device already holds a wallet
    #[error("wallet already exists on device")]
    WalletExists,

    /// Password entries did not match
    #[error("password entries do not match")]
    PasswordMismatch,

    /// Device answered something the request does not admit
    #[error("unexpected device response: {0}")]
    UnexpectedResponse(String),

    /// Recipient address failed base58 / length checks
    #[error("invalid recipient address")]
    InvalidAddress,

    /// Ledger RPC failure
    #[error("ledger request failed: {0}")]
    Network(String),

    /// Balance cannot cover the transfer and fee
    #[error("insufficient funds (balance: {balance}, required: {required})")]
    InsufficientFunds { balance: u64, required: u64 },
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}
