// Copyright (c) 2024-2025 The PicoPot Developers

//! Password-gated storage for the single wallet record.
//!
//! Exactly one record exists at a time. The record is a JSON key-value
//! document whose field names are wire-compatible with the original
//! `wallet.dat` layout; absence is a literal `None` sentinel so that a
//! valid document and "no wallet" are always distinguishable. Writes go
//! through [`Backend::write`] as whole-document replacements, never
//! partial truncation.
//!
//! The SHA-256 password digest serves as both the authentication check
//! value and the XOR encryption key, with no salt or per-wallet nonce.
//! That reuse is a preserved property of the stored format (existing
//! records must keep decrypting); deriving independent keys would break
//! compatibility and is intentionally not done here.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::crypto::{xor::xor_stream, Seed};

/// Literal document marking wallet absence
pub const ABSENT_SENTINEL: &str = "None";

/// Storage-layer failures (distinct from auth / state outcomes)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend read or write failed
    #[error("storage backend i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not a valid wallet record
    #[error("wallet record corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Stored field is not valid hex of the expected length
    #[error("wallet record field malformed")]
    Malformed,
}

/// Storage backend owning the persisted document
pub trait Backend {
    /// Read the current document, `None` if nothing was ever written
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replace the document as a whole
    fn write(&mut self, doc: &str) -> Result<(), StoreError>;
}

/// File-backed document storage, replacing atomically via rename
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Backend for FileBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, doc: &str) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(doc.as_bytes())?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory backend for tests and the loopback channel
#[derive(Default)]
pub struct MemBackend {
    doc: Option<String>,
}

impl Backend for MemBackend {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.doc.clone())
    }

    fn write(&mut self, doc: &str) -> Result<(), StoreError> {
        self.doc = Some(doc.to_string());
        Ok(())
    }
}

/// Persisted wallet record, hex-encoded fields.
///
/// Field names match the original on-disk document.
#[derive(Clone, Serialize, Deserialize)]
struct WalletRecord {
    name: String,
    passhash: String,
    privatekey: String,
    publickey: String,
}

/// Outcome of a create attempt
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
    PasswordMismatch,
}

/// Outcome of a delete attempt
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum DeleteOutcome {
    Deleted,
    WrongPassword,
    NoWallet,
}

/// Outcome of a reveal attempt
#[derive(Clone, PartialEq, Debug)]
pub enum RevealOutcome {
    Revealed(Seed),
    WrongPassword,
    NoWallet,
}

/// The single-record secret store, owning its storage backend
pub struct SecretStore<B: Backend> {
    backend: B,
}

impl<B: Backend> SecretStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn load(&self) -> Result<Option<WalletRecord>, StoreError> {
        let doc = match self.backend.read()? {
            Some(doc) => doc,
            None => return Ok(None),
        };

        let doc = doc.trim();
        if doc.is_empty() || doc == ABSENT_SENTINEL {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(doc)?))
    }

    /// Create the wallet record with a freshly generated seed.
    ///
    /// Rejects if a record exists or the password entries differ. The seed
    /// is encrypted under the password digest and only its ciphertext is
    /// persisted.
    pub fn create(
        &mut self,
        name: &str,
        password: &str,
        confirm: &str,
        rng: &mut impl CryptoRngCore,
    ) -> Result<CreateOutcome, StoreError> {
        if self.load()?.is_some() {
            return Ok(CreateOutcome::AlreadyExists);
        }
        if password != confirm {
            return Ok(CreateOutcome::PasswordMismatch);
        }

        let seed = Seed::random(rng);
        let public = seed.public_key();

        let mut key = password_hash(password);
        let encrypted = xor_stream(&seed.0, &key);

        let record = WalletRecord {
            name: name.to_string(),
            passhash: hex::encode(key),
            privatekey: hex::encode(&encrypted),
            publickey: hex::encode(public),
        };
        key.zeroize();

        self.backend.write(&serde_json::to_string(&record)?)?;

        Ok(CreateOutcome::Created)
    }

    /// Delete the wallet record, rewriting the whole file to the sentinel
    pub fn delete(&mut self, password: &str) -> Result<DeleteOutcome, StoreError> {
        let record = match self.load()? {
            Some(r) => r,
            None => return Ok(DeleteOutcome::NoWallet),
        };

        if hex::encode(password_hash(password)) != record.passhash {
            return Ok(DeleteOutcome::WrongPassword);
        }

        self.backend.write(ABSENT_SENTINEL)?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Decrypt and return the seed; the cipher is involutive so decryption
    /// is the same XOR pass as encryption
    pub fn reveal_seed(&self, password: &str) -> Result<RevealOutcome, StoreError> {
        let record = match self.load()? {
            Some(r) => r,
            None => return Ok(RevealOutcome::NoWallet),
        };

        let mut key = password_hash(password);
        if hex::encode(key) != record.passhash {
            key.zeroize();
            return Ok(RevealOutcome::WrongPassword);
        }

        let encrypted = hex::decode(&record.privatekey).map_err(|_| StoreError::Malformed)?;
        let mut decrypted = xor_stream(&encrypted, &key);
        key.zeroize();

        let seed_bytes: [u8; 32] = decrypted
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Malformed)?;
        decrypted.zeroize();

        Ok(RevealOutcome::Revealed(Seed(seed_bytes)))
    }

    /// Whether a wallet record is present
    pub fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.load()?.is_some())
    }

    /// Wallet name, `None` if absent
    pub fn name(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.map(|r| r.name))
    }

    /// Canonical public key, `None` if absent
    pub fn public_key(&self) -> Result<Option<[u8; 32]>, StoreError> {
        let record = match self.load()? {
            Some(r) => r,
            None => return Ok(None),
        };

        let mut key = [0u8; 32];
        hex::decode_to_slice(&record.publickey, &mut key).map_err(|_| StoreError::Malformed)?;
        Ok(Some(key))
    }
}

/// Secondary 32-byte password hash (check value and XOR key)
fn password_hash(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}
