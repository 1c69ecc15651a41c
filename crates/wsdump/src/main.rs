//! The `wsdump` inspection tool.
//!
//! Reads the receive side of a WebSocket connection captured to a file (the
//! raw bytes after the HTTP upgrade) and prints one line per reassembled
//! message:
//!
//! - `wsdump decode <file>` - tab-separated `index opcode len preview`
//!
//! Options:
//! - `--json` - One JSON object per message
//! - `--config` - TOML reader config (continuation limit, size limits)
//! - `--preview` - Payload bytes shown per message
//! - `--log-level` - Log filter when `RUST_LOG` is unset

mod dump;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wsframe::{Connection, ReaderConfig};

use dump::{dump, DumpOptions, Outcome};

#[derive(Parser)]
#[command(name = "wsdump", version, about = "Decode a captured WebSocket receive stream")]
struct Cli {
    /// Log level (trace, debug, info, warn, error) when RUST_LOG is unset
    #[arg(long = "log-level", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every message in a capture file
    Decode {
        /// Raw bytes received after the opening handshake
        file: PathBuf,

        /// Reader config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output one JSON object per line instead of tab-separated text
        #[arg(long)]
        json: bool,

        /// Payload bytes shown per message
        #[arg(long, default_value = "64")]
        preview: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Decode {
            file,
            config,
            json,
            preview,
        } => {
            let opts = DumpOptions { json, preview };
            if let Err(e) = decode(&file, config.as_deref(), &opts) {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Open the capture, apply the config, and dump it to stdout.
fn decode(file: &Path, config: Option<&Path>, opts: &DumpOptions) -> Result<(), String> {
    let config = match config {
        Some(path) => ReaderConfig::from_file(path)?,
        None => ReaderConfig::default(),
    };
    debug!(?config, "reader config");

    let capture =
        File::open(file).map_err(|e| format!("Failed to open {}: {}", file.display(), e))?;
    let mut conn = Connection::with_config(BufReader::new(capture), config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match dump(&mut conn, &mut out, opts)? {
        Outcome::Eof { messages } => debug!(messages, "capture fully decoded"),
        Outcome::Closed { messages, close } => {
            let trailing = conn
                .get_mut()
                .fill_buf()
                .map(|rest| !rest.is_empty())
                .unwrap_or(false);
            if trailing {
                warn!(messages, code = close.code, "bytes after close frame were not decoded");
            }
        }
    }
    Ok(())
}
