//! packetmap - inspect versioned protocol registries
//!
//! Resolves wire IDs and identifiers across client versions using the
//! bundled (or configured) mapping data.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use packetmap_config::ProtocolConfig;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "packetmap")]
#[command(about = "Inspect versioned protocol registries")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to packetmap.conf when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Client version, e.g. 1.20.5 (defaults to the configured one)
    #[arg(long = "client", global = true)]
    client: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List supported client versions
    Versions,
    /// List registries and their sizes
    Registries,
    /// Wire ID to identifier
    Resolve { registry: String, id: i32 },
    /// Identifier to wire ID
    Lookup { registry: String, identifier: String },
    /// Every entry present at the client version
    Dump { registry: String },
    /// Unpack a packed block position (decimal or 0x hex)
    DecodePosition {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Decode a hex entity metadata list
    DecodeMetadata { hex: String },
    /// Decode a hex book edit payload
    DecodeBook { hex: String },
}

fn setup_tracing(config: &ProtocolConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ProtocolConfig::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ProtocolConfig::load_default()?,
    };
    setup_tracing(&config);
    config.display();

    let version = config.version_or_default(cli.client.as_deref())?;
    debug!("Client version {}", version);

    let lines = match cli.command {
        Command::Versions => commands::versions(),
        Command::DecodePosition { value } => {
            vec![commands::decode_position(commands::parse_long(&value)?, version)]
        }
        Command::DecodeBook { hex } => commands::decode_book(&hex, version)?,
        command => {
            let catalog = packetmap_types::init_with(&config).context("Failed to load registries")?;
            match command {
                Command::Registries => commands::registries(catalog),
                Command::Resolve { registry, id } => {
                    vec![commands::resolve(catalog, &registry, id, version)?]
                }
                Command::Lookup { registry, identifier } => {
                    commands::lookup(catalog, &registry, &identifier, version)?
                }
                Command::Dump { registry } => commands::dump(catalog, &registry, version)?,
                Command::DecodeMetadata { hex } => commands::decode_metadata(catalog, &hex, version)?,
                Command::Versions | Command::DecodePosition { .. } | Command::DecodeBook { .. } => {
                    Vec::new()
                }
            }
        }
    };

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
