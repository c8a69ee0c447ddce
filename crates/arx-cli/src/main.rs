//! Arx CLI - seal, open and hash files with the Arx primitive suite.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod io;
mod theme;

use commands::{CipherKind, config, hash, keygen, open, seal, xor};

/// Arx - ARX-family authenticated encryption and hashing
#[derive(Parser)]
#[command(name = "arx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra configuration file, merged over ~/.arx/config.toml
    #[arg(long, global = true, env = "ARX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a 256-bit key (hex)
    Keygen {
        /// Write the key to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Replace an existing key file without asking
        #[arg(long)]
        force: bool,
    },

    /// Encrypt and authenticate a file under a random nonce
    Seal {
        /// Key file (defaults to keys.key_file)
        #[arg(short, long)]
        key: Option<PathBuf>,
        /// Associated data, authenticated but not encrypted
        #[arg(long)]
        aad: Option<String>,
        /// Authenticated cipher
        #[arg(long, value_enum, default_value_t)]
        cipher: CipherKind,
        /// Input file, or - for stdin
        input: PathBuf,
        /// Output file, or - for stdout
        output: PathBuf,
    },

    /// Verify and decrypt a sealed file
    Open {
        /// Key file (defaults to keys.key_file)
        #[arg(short, long)]
        key: Option<PathBuf>,
        /// Associated data given when sealing
        #[arg(long)]
        aad: Option<String>,
        /// Authenticated cipher
        #[arg(long, value_enum, default_value_t)]
        cipher: CipherKind,
        /// Sealed file, or - for stdin
        input: PathBuf,
        /// Output file, or - for stdout
        output: PathBuf,
    },

    /// Apply the raw XSalsa20 keystream (no authentication)
    Xor {
        /// Key file (defaults to keys.key_file)
        #[arg(short, long)]
        key: Option<PathBuf>,
        /// 24-byte nonce as hex
        #[arg(long)]
        nonce: String,
        /// Input file, or - for stdin
        input: PathBuf,
        /// Output file, or - for stdout
        output: PathBuf,
    },

    /// BLAKE2b digest, or keyed MAC with --key
    Hash {
        /// Digest length in bytes (1-64, defaults to hash.length)
        #[arg(short, long)]
        len: Option<usize>,
        /// Key file for MAC mode
        #[arg(short, long)]
        key: Option<PathBuf>,
        /// File to hash (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// View and check configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Validate the current configuration
    Validate,
    /// Show config file paths being checked
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let explicit = cli.config.as_deref();

    // Config errors surface from the command that needs the config.
    let loaded = arx_config::Config::load(explicit);
    let mut log_config = match &loaded {
        Ok(resolved) => config_bridge::to_log_config(&resolved.config),
        Err(_) => arx_telemetry::LogConfig::default(),
    };
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = arx_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    if let Ok(resolved) = &loaded {
        config_bridge::report_sources(resolved);
    }

    match cli.command {
        Commands::Keygen { out, force } => keygen::generate_key(out.as_deref(), force),
        Commands::Seal {
            key,
            aad,
            cipher,
            input,
            output,
        } => seal::run_seal(
            &loaded?.config,
            key.as_deref(),
            cipher,
            aad.as_deref(),
            &input,
            &output,
        ),
        Commands::Open {
            key,
            aad,
            cipher,
            input,
            output,
        } => open::run_open(
            &loaded?.config,
            key.as_deref(),
            cipher,
            aad.as_deref(),
            &input,
            &output,
        ),
        Commands::Xor {
            key,
            nonce,
            input,
            output,
        } => xor::run_xor(&loaded?.config, key.as_deref(), &nonce, &input, &output),
        Commands::Hash { len, key, file } => {
            hash::run_hash(&loaded?.config, len, key.as_deref(), file.as_deref())
        },
        Commands::Config { command } => handle_config(command, explicit),
    }
}

fn handle_config(command: ConfigCommands, explicit: Option<&std::path::Path>) -> Result<()> {
    match command {
        ConfigCommands::Show { format } => config::show(explicit, &format),
        ConfigCommands::Validate => config::validate(explicit),
        ConfigCommands::Paths => config::paths(explicit),
    }
}
