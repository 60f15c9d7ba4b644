use clap::{Parser, ValueEnum};

#[derive(Parser, Clone, Debug)]
#[command(name = "provision", version)]
// derive version from Cargo.toml
pub struct Main {
    /// Verbose mode (-v, -vv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Encryption service performing the field encryption
    #[arg(short, long, value_enum, default_value_t = GatewayKind::Awskms)]
    pub gateway: GatewayKind,

    /// Store persisting password pools
    #[arg(short, long, value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    /// Root directory for the file store
    #[arg(long, default_value = ".provisioner-store", env = "PROVISIONER_STORE_ROOT")]
    pub store_root: String,

    /// Lifecycle event file (JSON)
    #[arg(value_name = "EVENT_FILE")]
    pub event_file: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GatewayKind {
    /// Hashicorp Vault transit engine (VAULT_ADDR / VAULT_TOKEN)
    Hashivault,
    /// AWS KMS via the ambient credential chain
    Awskms,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StoreKind {
    /// In-process only; pools do not survive the run
    Memory,
    /// One file per pool under --store-root
    File,
    /// Hashicorp Vault KV v2 engine
    Hashivault,
}
