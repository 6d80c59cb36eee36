// Copyright (c) 2024-2025 The PicoPot Developers

//! PicoPot device protocol / line command definitions
//!
//! The device speaks a newline-terminated ASCII protocol over a raw duplex
//! byte channel. A request is a single line, optionally carrying
//! colon-delimited arguments, and every request is answered by exactly one
//! terminal response line. `createwallet` additionally emits progress
//! marker lines (`gen_key`, `done_gen`) before its terminal line while the
//! device performs its deliberately slow key generation.
//!
//! ## Commands
//! ```text
//! ping                                -> pong
//! getname                             -> <name> | nowallet
//! getpublickey                        -> <64 hex chars> | nowallet
//! getprivatekey:<password>            -> <64 hex chars> | wrongpass | nowallet
//! createwallet:<name>:<pw>:<pw2>      -> gen_key .. done_gen .. created
//!                                        | walletexist | <mismatch text>
//! deletewallet:<password>             -> done | wrongpass | nowallet
//! stoptzl                             -> (none, device loop exits)
//! anything else                       -> unknown
//! ```
//!
//! Colons are the argument separator and therefore cannot appear inside
//! arguments; a password containing `:` is rejected at parse time rather
//! than silently truncated. This is a documented limitation of the wire
//! format, not something the parser papers over.

use core::str::FromStr;

use strum::{Display, EnumString};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Argument separator within a command line
pub const ARG_SEPARATOR: char = ':';

/// Response tokens as written on the wire, for host-side line matching
pub mod token {
    pub const PONG: &str = "pong";
    pub const GEN_KEY: &str = "gen_key";
    pub const DONE_GEN: &str = "done_gen";
    pub const CREATED: &str = "created";
    pub const WALLET_EXIST: &str = "walletexist";
    pub const PASSWORD_MISMATCH: &str = "different password please try again";
    pub const DONE: &str = "done";
    pub const WRONG_PASS: &str = "wrongpass";
    pub const NO_WALLET: &str = "nowallet";
    pub const UNKNOWN: &str = "unknown";
}

/// Protocol-level parse errors, reported on the wire as `unknown`
#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Command name not in the command table
    #[error("unrecognised command")]
    UnknownCommand,

    /// Wrong argument count for a recognised command
    #[error("malformed argument list")]
    BadArguments,
}

/// Command name tokens, used for parsing and host-side logging
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumString)]
pub enum CommandKind {
    #[strum(serialize = "ping")]
    Ping,
    #[strum(serialize = "getname")]
    GetName,
    #[strum(serialize = "getpublickey")]
    GetPublicKey,
    #[strum(serialize = "getprivatekey")]
    GetPrivateKey,
    #[strum(serialize = "createwallet")]
    CreateWallet,
    #[strum(serialize = "deletewallet")]
    DeleteWallet,
    #[strum(serialize = "stoptzl")]
    Stop,
}

/// Parsed device command.
///
/// Password-bearing variants are wiped on drop.
#[derive(Clone, PartialEq, Debug, Zeroize, ZeroizeOnDrop)]
pub enum Command {
    /// Liveness check
    Ping,
    /// Fetch wallet name
    GetName,
    /// Fetch the 32-byte public key (hex on the wire)
    GetPublicKey,
    /// Reveal the decrypted seed, gated on the wallet password
    GetPrivateKey { password: String },
    /// Create the wallet record (fails if one exists)
    CreateWallet {
        name: String,
        password: String,
        confirm: String,
    },
    /// Delete the wallet record, gated on the wallet password
    DeleteWallet { password: String },
    /// Terminate the device command loop
    Stop,
}

impl Command {
    /// Command name token for this command
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Ping => CommandKind::Ping,
            Command::GetName => CommandKind::GetName,
            Command::GetPublicKey => CommandKind::GetPublicKey,
            Command::GetPrivateKey { .. } => CommandKind::GetPrivateKey,
            Command::CreateWallet { .. } => CommandKind::CreateWallet,
            Command::DeleteWallet { .. } => CommandKind::DeleteWallet,
            Command::Stop => CommandKind::Stop,
        }
    }

    /// Parse a single request line.
    ///
    /// The line must already be stripped of its terminator; empty lines are
    /// a channel idle condition and should be skipped before parsing.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut parts = line.split(ARG_SEPARATOR);
        let name = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        let kind = CommandKind::from_str(name).map_err(|_| ProtocolError::UnknownCommand)?;

        let cmd = match (kind, args.as_slice()) {
            (CommandKind::Ping, []) => Command::Ping,
            (CommandKind::GetName, []) => Command::GetName,
            (CommandKind::GetPublicKey, []) => Command::GetPublicKey,
            (CommandKind::Stop, []) => Command::Stop,
            (CommandKind::GetPrivateKey, [password]) => Command::GetPrivateKey {
                password: (*password).to_string(),
            },
            (CommandKind::DeleteWallet, [password]) => Command::DeleteWallet {
                password: (*password).to_string(),
            },
            (CommandKind::CreateWallet, [name, password, confirm]) => Command::CreateWallet {
                name: (*name).to_string(),
                password: (*password).to_string(),
                confirm: (*confirm).to_string(),
            },
            _ => return Err(ProtocolError::BadArguments),
        };

        Ok(cmd)
    }

    /// Encode as a request line (without terminator)
    pub fn encode(&self) -> String {
        match self {
            Command::Ping | Command::GetName | Command::GetPublicKey | Command::Stop => {
                self.kind().to_string()
            }
            Command::GetPrivateKey { password } => {
                format!("{}{}{}", self.kind(), ARG_SEPARATOR, password)
            }
            Command::DeleteWallet { password } => {
                format!("{}{}{}", self.kind(), ARG_SEPARATOR, password)
            }
            Command::CreateWallet {
                name,
                password,
                confirm,
            } => format!(
                "{}{sep}{}{sep}{}{sep}{}",
                self.kind(),
                name,
                password,
                confirm,
                sep = ARG_SEPARATOR
            ),
        }
    }
}

/// Device response line.
///
/// Key-material-bearing variants are wiped on drop.
#[derive(Clone, PartialEq, Debug, Zeroize, ZeroizeOnDrop)]
pub enum Response {
    /// `ping` reply
    Pong,
    /// Wallet name
    Name(String),
    /// Canonical 32-byte public key, hex encoded on the wire
    PublicKey([u8; 32]),
    /// Decrypted 32-byte seed, hex encoded on the wire
    Seed([u8; 32]),
    /// Key generation started (progress marker, not terminal)
    KeygenStarted,
    /// Key generation finished (progress marker, not terminal)
    KeygenDone,
    /// Wallet record created
    Created,
    /// A wallet record already exists
    WalletExists,
    /// `createwallet` password entries differed
    PasswordMismatch,
    /// Wallet record deleted
    Done,
    /// Password check failed
    WrongPass,
    /// No wallet record present
    NoWallet,
    /// Unrecognised or malformed request
    Unknown,
}

impl Response {
    /// Encode as a response line (without terminator)
    pub fn encode(&self) -> String {
        match self {
            Response::Pong => token::PONG.to_string(),
            Response::Name(name) => name.clone(),
            Response::PublicKey(key) => hex::encode(key),
            Response::Seed(seed) => hex::encode(seed),
            Response::KeygenStarted => token::GEN_KEY.to_string(),
            Response::KeygenDone => token::DONE_GEN.to_string(),
            Response::Created => token::CREATED.to_string(),
            Response::WalletExists => token::WALLET_EXIST.to_string(),
            Response::PasswordMismatch => token::PASSWORD_MISMATCH.to_string(),
            Response::Done => token::DONE.to_string(),
            Response::WrongPass => token::WRONG_PASS.to_string(),
            Response::NoWallet => token::NO_WALLET.to_string(),
            Response::Unknown => token::UNKNOWN.to_string(),
        }
    }

    /// Whether this line completes a request (progress markers do not)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Response::KeygenStarted | Response::KeygenDone)
    }
}
