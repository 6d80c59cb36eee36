// Copyright (c) 2024-2025 The PicoPot Developers

//! The [Engine] dispatches parsed [Command]s against the [SecretStore]
//! and emits [Response] lines.
//!
//! Processing is single-threaded and synchronous: one command in, exactly
//! one terminal response out (plus key-generation progress markers), and no
//! input can ever crash the loop. Platform concerns (pacing, randomness)
//! sit behind the [Driver] trait and the rng type parameter so the engine
//! itself stays hardware-independent.

use std::io::{self, BufRead, Write};

use log::{debug, error};
use rand_core::{CryptoRngCore, OsRng};

use picopot_proto::{Command, Response};

use crate::store::{
    Backend, CreateOutcome, DeleteOutcome, RevealOutcome, SecretStore, StoreError,
};

/// Paced key-generation steps during `createwallet`
pub const KEYGEN_STEPS: u32 = 10;

/// Per-step pacing delay. The slow, paced generation gives a slow channel
/// or device room to breathe; hosts must treat the gap between the
/// progress marker and the terminal line as normal.
pub const KEYGEN_STEP_MS: u32 = 6_000;

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// Pause for (up to) the requested number of milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Driver> Driver for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

/// Driver without pacing, for tests and loopback channels
#[derive(Copy, Clone, Default, Debug)]
pub struct NullDriver;

impl Driver for NullDriver {
    fn delay_ms(&mut self, _ms: u32) {}
}

/// Loop control returned from command dispatch
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Flow {
    /// Keep reading commands
    Continue,
    /// `stoptzl` received, terminate the loop
    Exit,
}

/// Device command engine, generic over storage backend, platform driver
/// and rng
pub struct Engine<B: Backend, DRV: Driver, RNG: CryptoRngCore = OsRng> {
    store: SecretStore<B>,
    drv: DRV,
    rng: RNG,
}

impl<B: Backend, DRV: Driver> Engine<B, DRV> {
    /// Create an engine with the provided store and driver, using the
    /// default [OsRng]
    pub fn new(store: SecretStore<B>, drv: DRV) -> Self {
        Self::new_with_rng(store, drv, OsRng)
    }
}

impl<B: Backend, DRV: Driver, RNG: CryptoRngCore> Engine<B, DRV, RNG> {
    /// Create an engine with the provided store, driver and rng
    pub fn new_with_rng(store: SecretStore<B>, drv: DRV, rng: RNG) -> Self {
        Self { store, drv, rng }
    }

    /// Parse and dispatch a single request line.
    ///
    /// Empty lines are a channel idle condition and produce no response;
    /// malformed or unrecognised lines answer `unknown`.
    pub fn handle_line(&mut self, line: &str, emit: &mut dyn FnMut(&Response)) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }

        match Command::parse(line) {
            Ok(cmd) => self.update(&cmd, emit),
            Err(e) => {
                debug!("rejecting request: {e}");
                emit(&Response::Unknown);
                Flow::Continue
            }
        }
    }

    /// Dispatch one command, emitting its response line(s)
    pub fn update(&mut self, cmd: &Command, emit: &mut dyn FnMut(&Response)) -> Flow {
        debug!("command: {}", cmd.kind());

        match cmd {
            Command::Ping => emit(&Response::Pong),

            Command::GetName => match check(self.store.name(), emit) {
                Some(Some(name)) => emit(&Response::Name(name)),
                Some(None) => emit(&Response::NoWallet),
                None => (),
            },

            Command::GetPublicKey => match check(self.store.public_key(), emit) {
                Some(Some(key)) => emit(&Response::PublicKey(key)),
                Some(None) => emit(&Response::NoWallet),
                None => (),
            },

            Command::GetPrivateKey { password } => {
                match check(self.store.reveal_seed(password), emit) {
                    Some(RevealOutcome::Revealed(seed)) => emit(&Response::Seed(seed.0)),
                    Some(RevealOutcome::WrongPassword) => emit(&Response::WrongPass),
                    Some(RevealOutcome::NoWallet) => emit(&Response::NoWallet),
                    None => (),
                }
            }

            Command::CreateWallet {
                name,
                password,
                confirm,
            } => self.create_wallet(name, password, confirm, emit),

            Command::DeleteWallet { password } => match check(self.store.delete(password), emit) {
                Some(DeleteOutcome::Deleted) => emit(&Response::Done),
                Some(DeleteOutcome::WrongPassword) => emit(&Response::WrongPass),
                Some(DeleteOutcome::NoWallet) => emit(&Response::NoWallet),
                None => (),
            },

            // No response line; the loop just stops
            Command::Stop => return Flow::Exit,
        }

        Flow::Continue
    }

    /// `createwallet`: fast rejections answer immediately, otherwise the
    /// progress marker goes out before the paced slow work so the host
    /// knows generation has started
    fn create_wallet(
        &mut self,
        name: &str,
        password: &str,
        confirm: &str,
        emit: &mut dyn FnMut(&Response),
    ) {
        match check(self.store.exists(), emit) {
            Some(true) => {
                emit(&Response::WalletExists);
                return;
            }
            Some(false) => (),
            None => return,
        }
        if password != confirm {
            emit(&Response::PasswordMismatch);
            return;
        }

        emit(&Response::KeygenStarted);

        for _ in 0..KEYGEN_STEPS {
            self.drv.delay_ms(KEYGEN_STEP_MS);
        }

        match check(self.store.create(name, password, confirm, &mut self.rng), emit) {
            Some(CreateOutcome::Created) => {
                emit(&Response::KeygenDone);
                emit(&Response::Created);
            }
            Some(CreateOutcome::AlreadyExists) => emit(&Response::WalletExists),
            Some(CreateOutcome::PasswordMismatch) => emit(&Response::PasswordMismatch),
            None => (),
        }
    }

    /// Serve the blocking command loop over a line channel.
    ///
    /// Read timeouts are treated as an idle poll (partial input is kept).
    /// Returns [Flow::Exit] on `stoptzl`, [Flow::Continue] if the peer
    /// closed first.
    pub fn serve<R: BufRead, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
    ) -> io::Result<Flow> {
        let mut line = String::new();

        loop {
            match reader.read_line(&mut line) {
                // Peer closed the channel
                Ok(0) => return Ok(Flow::Continue),
                Ok(_) => (),
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e),
            }

            let mut io_err = None;
            let flow = self.handle_line(&line, &mut |rsp| {
                if io_err.is_some() {
                    return;
                }
                let r = writeln!(writer, "{}", rsp.encode()).and_then(|_| writer.flush());
                if let Err(e) = r {
                    io_err = Some(e);
                }
            });
            line.clear();

            if let Some(e) = io_err {
                return Err(e);
            }
            if flow == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
    }
}

/// Storage failures have no wire word of their own; log and answer
/// `unknown`, keeping the loop alive
fn check<T>(res: Result<T, StoreError>, emit: &mut dyn FnMut(&Response)) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            error!("store failure: {e}");
            emit(&Response::Unknown);
            None
        }
    }
}
