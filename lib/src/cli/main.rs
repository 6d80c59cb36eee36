// Copyright (c) 2024-2025 The PicoPot Developers

//! Command line utility for interacting with a PicoPot device

use clap::Parser;
use log::{debug, info, LevelFilter};

use picopot::{
    transport::{GenericChannel, TcpChannel},
    GenericHandle,
};

/// PicoPot command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Device address (simulator or TCP bridge)
    #[clap(long, default_value = "127.0.0.1:1234")]
    addr: String,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// Check device liveness
    Ping,

    /// Fetch wallet name, public key and address
    Info,

    /// Create a wallet on the device (slow, key generation is paced)
    Create {
        /// Wallet name
        #[clap(long)]
        name: String,

        /// Wallet password
        #[clap(long)]
        password: String,

        /// Password confirmation (defaults to the password)
        #[clap(long)]
        confirm: Option<String>,
    },

    /// Delete the wallet on the device
    Delete {
        /// Wallet password
        #[clap(long)]
        password: String,
    },

    /// Reveal the wallet seed (prints secret material to stdout)
    Reveal {
        /// Wallet password
        #[clap(long)]
        password: String,

        /// Acknowledge that the seed will be printed
        #[clap(long)]
        i_know_what_i_am_doing: bool,
    },

    /// Stop the device command loop
    Stop,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    debug!("Connecting to device at {}", args.addr);

    let channel = TcpChannel::connect(&args.addr).await?;
    let mut device = GenericHandle::new(GenericChannel::from(channel));

    match args.cmd {
        Actions::Ping => {
            device.ping().await?;
            info!("Device is alive");
        }
        Actions::Info => match device.wallet_info().await? {
            Some(w) => {
                info!("Wallet:     {}", w.name);
                info!("Public key: {}", hex::encode(w.public_key));
                info!("Address:    {}", w.address);
            }
            None => info!("No wallet on device"),
        },
        Actions::Create {
            name,
            password,
            confirm,
        } => {
            info!("Creating wallet (this takes a while)...");
            let confirm = confirm.unwrap_or_else(|| password.clone());
            device.create_wallet(&name, &password, &confirm).await?;
            info!("Wallet created");
        }
        Actions::Delete { password } => {
            device.delete_wallet(&password).await?;
            info!("Wallet deleted");
        }
        Actions::Reveal {
            password,
            i_know_what_i_am_doing,
        } => {
            if !i_know_what_i_am_doing {
                return Err(anyhow::anyhow!(
                    "refusing to print the seed without --i-know-what-i-am-doing"
                ));
            }
            let seed = device.reveal_seed(&password).await?;
            println!("{}", hex::encode(seed.0));
        }
        Actions::Stop => {
            device.stop().await?;
            info!("Stop requested");
        }
    }

    Ok(())
}
