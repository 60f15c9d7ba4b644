//!
//! Command-line driver for secret-provisioner
//!
//! Reads one lifecycle event (the orchestrator's JSON envelope) from a
//! file, runs the handler against the selected gateway and store, and
//! prints the terminal response. If the event carries a ResponseURL the
//! response is also dispatched there, exactly as in service operation.
//!
//! # Syntax:
//!
//! ```text
//!  $ provision [-v] [--gateway awskms|hashivault] \
//!              [--store memory|file|hashivault] [--store-root DIR] EVENT_FILE
//! ```
//!
//! Gateway configuration comes from the environment: VAULT_ADDR and
//! VAULT_TOKEN for hashivault, the standard AWS variable chain for awskms.
//!

use clap::Parser;
mod options;
use options::{GatewayKind, Main, StoreKind};
use secret_provisioner::{
    event::LifecycleRequest,
    gateway::EncryptionGateway,
    handler::LifecycleHandler,
    store::{FileStore, MemoryStore, SecretStore},
};
use secret_provisioner_awskms::KmsGateway;
use secret_provisioner_hashivault::{VaultGateway, VaultStore};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tokio::fs;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, ThisError)]
pub(crate) enum Error {
    #[error("{0}")]
    IOError(std::io::Error),

    #[error("{0}")]
    LibError(#[from] secret_provisioner::error::Error),

    #[error("Invalid event file - {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(e)
    }
}

async fn run() -> Result<(), Error> {
    let args = Main::parse();
    init_logging(args.verbose);

    let raw = fs::read(&args.event_file).await?;
    let event: LifecycleRequest = serde_json::from_slice(&raw)?;

    let gateway: Arc<dyn EncryptionGateway> = match args.gateway {
        GatewayKind::Hashivault => Arc::new(VaultGateway::from_env()?),
        GatewayKind::Awskms => Arc::new(KmsGateway::from_env().await),
    };
    let store: Arc<dyn SecretStore> = match args.store {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::File => Arc::new(FileStore::new(&args.store_root)),
        StoreKind::Hashivault => Arc::new(VaultStore::from_env()?),
    };

    let handler = LifecycleHandler::new(gateway, store);
    let response = handler.handle(&event).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// One-time subscriber setup. RUST_LOG overrides the verbosity flags.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
