#![forbid(unsafe_code)]
//! Chain loop for ferrochain: reads one payload per line from stdin, mines a
//! block for each, and prints the finalized header. End of input ends the run.

use clap::Parser;
use ferrochain::chain::{ChainBuilder, MinedBlock};
use ferrochain::config::load_config;
use ferrochain::crypto::{hash_from_hex, hash_to_hex};
use ferrochain::error::ChainError;
use ferrochain::ledger::{FileLedger, HeaderSink};
use serde::Serialize;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ferrochain", about = "Mine a proof-of-work header chain from stdin payloads")]
struct Args {
    /// Path to the configuration file (defaults to ./ferrochain.toml).
    #[arg(long)]
    config: Option<String>,

    /// Mining target as 64 hex chars; overrides the config file.
    #[arg(long)]
    target: Option<String>,

    /// Worker threads for the nonce search; overrides the config file.
    #[arg(long)]
    threads: Option<usize>,

    /// Append finalized headers to this binary ledger file.
    #[arg(long)]
    ledger: Option<String>,

    /// Print finalized blocks as JSON instead of plain fields.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct BlockOutput {
    height: u64,
    previous: String,
    contents: String,
    contents_length: u32,
    timestamp: u32,
    nonce: u32,
    hash: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let mut mining = config.mining_config()?;
    if let Some(target) = &args.target {
        mining.target = hash_from_hex(target)?;
    }
    if let Some(threads) = args.threads {
        mining.threads = threads;
    }

    let ledger_path = args.ledger.or_else(|| config.ledger.path.clone());
    let mut ledger = match &ledger_path {
        Some(path) => Some(FileLedger::open(Path::new(path))?),
        None => None,
    };

    let mut chain =
        ChainBuilder::new(mining).with_max_payload_bytes(config.input.max_payload_bytes);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        info!("creating block {}: {}", chain.height(), line);

        // The payload is the line without its trailing newline.
        let mined = match chain.append(line.as_bytes()) {
            Ok(mined) => mined,
            Err(err @ ChainError::InputError(_)) => {
                warn!("rejected payload: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(ledger) = ledger.as_mut() {
            if let Err(err) = ledger.append(&mined.header) {
                // The in-memory tip is still valid; keep mining.
                warn!("failed to persist header: {}", err);
            }
        }

        if args.json {
            print_json(chain.height() - 1, &mined)?;
        } else {
            print_block(&mined);
        }
    }

    info!("input exhausted after {} blocks", chain.height());
    Ok(())
}

fn print_block(mined: &MinedBlock) {
    println!("previous: {}", hash_to_hex(&mined.header.previous_hash));
    println!("contents: {}", hash_to_hex(&mined.header.contents_hash));
    println!("timestamp: {}", mined.header.timestamp);
    println!("nonce: {}", mined.header.nonce);
    println!("hash: {}", hash_to_hex(&mined.hash));
    println!();
}

fn print_json(height: u64, mined: &MinedBlock) -> Result<(), Box<dyn std::error::Error>> {
    let output = BlockOutput {
        height,
        previous: hash_to_hex(&mined.header.previous_hash),
        contents: hash_to_hex(&mined.header.contents_hash),
        contents_length: mined.header.contents_length,
        timestamp: mined.header.timestamp,
        nonce: mined.header.nonce,
        hash: hash_to_hex(&mined.hash),
    };
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
