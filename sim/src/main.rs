// Copyright (c) 2024-2025 The PicoPot Developers

//! PicoPot device simulator
//!
//! Runs the device engine over a TCP listener so the host library and
//! CLI can be exercised without hardware. One session is served at a
//! time, matching the single-channel device.

use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::{debug, info, LevelFilter};

use picopot_core::engine::{Driver, Engine, Flow, KEYGEN_STEP_MS};
use picopot_core::store::{FileBackend, SecretStore};

/// PicoPot device simulator
#[derive(Clone, Debug, PartialEq, Parser)]
struct Options {
    /// Listen address
    #[clap(long, default_value = "127.0.0.1:1234", env = "PICOPOT_SIM_ADDR")]
    bind: String,

    /// Wallet storage file
    #[clap(long, default_value = "wallet.dat", env = "PICOPOT_SIM_WALLET")]
    wallet_file: PathBuf,

    /// Key generation pacing per step in milliseconds (device default
    /// when unset, 0 disables pacing for tests)
    #[clap(long, env = "PICOPOT_SIM_STEP_MS")]
    keygen_step_ms: Option<u32>,

    /// Log level
    #[clap(long, default_value = "debug")]
    log_level: LevelFilter,
}

/// Driver pacing with thread sleeps, optionally rescaled
struct SimDriver {
    step_ms: Option<u32>,
}

impl Driver for SimDriver {
    fn delay_ms(&mut self, ms: u32) {
        let ms = self.step_ms.unwrap_or(ms);
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    if let Some(ms) = args.keygen_step_ms {
        debug!("keygen pacing override: {ms}ms/step (device: {KEYGEN_STEP_MS}ms)");
    }

    let store = SecretStore::new(FileBackend::new(&args.wallet_file));
    let driver = SimDriver {
        step_ms: args.keygen_step_ms,
    };
    let mut engine = Engine::new(store, driver);

    let listener = TcpListener::bind(&args.bind)?;
    info!(
        "Simulator listening on {} (wallet: {})",
        args.bind,
        args.wallet_file.display()
    );

    // One session at a time; a closed session hands back to accept,
    // stoptzl shuts the simulator down
    loop {
        let (stream, peer) = listener.accept()?;
        info!("Session from {peer}");

        match serve_session(&mut engine, stream)? {
            Flow::Continue => info!("Session closed"),
            Flow::Exit => {
                info!("Stop requested, shutting down");
                return Ok(());
            }
        }
    }
}

fn serve_session<DRV: Driver>(
    engine: &mut Engine<FileBackend, DRV>,
    stream: TcpStream,
) -> anyhow::Result<Flow> {
    // Poll interval for the blocking read loop
    stream.set_read_timeout(Some(Duration::from_millis(200)))?;

    let mut reader = std::io::BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    Ok(engine.serve(&mut reader, &mut writer)?)
}
