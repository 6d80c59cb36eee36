// Copyright (c) 2024-2025 The PicoPot Developers

//! Handle for connected PicoPot devices
//!
//! This provides typed methods over the line protocol and is generic
//! over [Channel] implementations

use std::time::Duration;

use log::debug;

use picopot_core::crypto::Seed;
use picopot_proto::{token, Command};

use crate::{transport::Channel, Error};

/// Typed handle for a connected PicoPot device.
///
/// Reply interpretation is contextual: the handle knows what it asked, so
/// each method maps the reply words its request admits and rejects
/// anything else as [Error::UnexpectedResponse]. Timeouts are advisory;
/// key generation gets its own much longer allowance because the device
/// paces that work deliberately.
pub struct DeviceHandle<C: Channel> {
    channel: C,
    /// Timeout for ordinary request/response pairs
    request_timeout_s: usize,
    /// Timeout for each line of the key generation exchange
    keygen_timeout_s: usize,
}

/// Create a [DeviceHandle] wrapper from a type implementing [Channel]
impl<C: Channel> From<C> for DeviceHandle<C> {
    fn from(channel: C) -> Self {
        Self {
            channel,
            request_timeout_s: 2,
            keygen_timeout_s: 90,
        }
    }
}

/// Wallet summary as reported by a device
#[derive(Clone, Debug, PartialEq)]
pub struct WalletInfo {
    pub name: String,
    pub public_key: [u8; 32],
    /// Base58 form of the public key
    pub address: String,
}

impl<C: Channel> DeviceHandle<C> {
    /// Helper to fetch the request timeout
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s as u64)
    }

    /// Helper to fetch the per-line key generation timeout
    fn keygen_timeout(&self) -> Duration {
        Duration::from_secs(self.keygen_timeout_s as u64)
    }

    /// Send one command and await a single reply line
    async fn request(&mut self, cmd: &Command, timeout: Duration) -> Result<String, Error> {
        let line = cmd.encode();
        debug!("request: {}", cmd.kind());

        self.channel.send_line(&line).await?;
        let reply = tokio::time::timeout(timeout, self.channel.recv_line()).await??;

        debug!("reply: {reply}");
        Ok(reply)
    }

    /// Liveness check
    pub async fn ping(&mut self) -> Result<(), Error> {
        let reply = self.request(&Command::Ping, self.request_timeout()).await?;
        match reply.as_str() {
            token::PONG => Ok(()),
            _ => Err(Error::UnexpectedResponse(reply)),
        }
    }

    /// Fetch the wallet name, `None` if the device holds no wallet
    pub async fn wallet_name(&mut self) -> Result<Option<String>, Error> {
        let reply = self
            .request(&Command::GetName, self.request_timeout())
            .await?;
        match reply.as_str() {
            token::NO_WALLET => Ok(None),
            _ => Ok(Some(reply)),
        }
    }

    /// Fetch the wallet public key, `None` if the device holds no wallet
    pub async fn public_key(&mut self) -> Result<Option<[u8; 32]>, Error> {
        let reply = self
            .request(&Command::GetPublicKey, self.request_timeout())
            .await?;
        if reply == token::NO_WALLET {
            return Ok(None);
        }

        let mut key = [0u8; 32];
        hex::decode_to_slice(&reply, &mut key).map_err(|_| Error::UnexpectedResponse(reply))?;
        Ok(Some(key))
    }

    /// Fetch the wallet address (base58 public key), `None` if absent
    pub async fn address(&mut self) -> Result<Option<String>, Error> {
        Ok(self
            .public_key()
            .await?
            .map(|k| bs58::encode(k).into_string()))
    }

    /// Fetch name, public key and address together, `None` if absent
    pub async fn wallet_info(&mut self) -> Result<Option<WalletInfo>, Error> {
        let name = match self.wallet_name().await? {
            Some(n) => n,
            None => return Ok(None),
        };
        let public_key = match self.public_key().await? {
            Some(k) => k,
            None => return Ok(None),
        };

        Ok(Some(WalletInfo {
            name,
            address: bs58::encode(public_key).into_string(),
            public_key,
        }))
    }

    /// Reveal the seed for signing, gated on the wallet password
    pub async fn reveal_seed(&mut self, password: &str) -> Result<Seed, Error> {
        let cmd = Command::GetPrivateKey {
            password: password.to_string(),
        };
        let reply = self.request(&cmd, self.request_timeout()).await?;

        match reply.as_str() {
            token::WRONG_PASS => return Err(Error::WrongPassword),
            token::NO_WALLET => return Err(Error::NoWallet),
            _ => (),
        }

        let mut seed = [0u8; 32];
        hex::decode_to_slice(&reply, &mut seed).map_err(|_| Error::UnexpectedResponse(reply))?;
        Ok(Seed(seed))
    }

    /// Create a wallet on the device.
    ///
    /// Key generation is slow and paced; this waits through the progress
    /// markers until a terminal reply arrives.
    pub async fn create_wallet(
        &mut self,
        name: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), Error> {
        let cmd = Command::CreateWallet {
            name: name.to_string(),
            password: password.to_string(),
            confirm: confirm.to_string(),
        };

        self.channel.send_line(&cmd.encode()).await?;

        loop {
            let reply =
                tokio::time::timeout(self.keygen_timeout(), self.channel.recv_line()).await??;
            debug!("reply: {reply}");

            match reply.as_str() {
                // Progress markers, keep waiting
                token::GEN_KEY | token::DONE_GEN => continue,
                token::CREATED => return Ok(()),
                token::WALLET_EXIST => return Err(Error::WalletExists),
                token::PASSWORD_MISMATCH => return Err(Error::PasswordMismatch),
                _ => return Err(Error::UnexpectedResponse(reply)),
            }
        }
    }

    /// Delete the wallet on the device, gated on the wallet password
    pub async fn delete_wallet(&mut self, password: &str) -> Result<(), Error> {
        let cmd = Command::DeleteWallet {
            password: password.to_string(),
        };
        let reply = self.request(&cmd, self.request_timeout()).await?;

        match reply.as_str() {
            token::DONE => Ok(()),
            token::WRONG_PASS => Err(Error::WrongPassword),
            token::NO_WALLET => Err(Error::NoWallet),
            _ => Err(Error::UnexpectedResponse(reply)),
        }
    }

    /// Stop the device command loop. No reply is expected.
    pub async fn stop(&mut self) -> Result<(), Error> {
        self.channel.send_line(&Command::Stop.encode()).await
    }
}
