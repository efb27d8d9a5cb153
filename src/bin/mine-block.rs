#![forbid(unsafe_code)]
//! Mine a single block from a command-line payload and report the result
//! with timing. Useful for trying out target difficulties.

use ferrochain::chain::ChainBuilder;
use ferrochain::config::load_config;
use ferrochain::crypto::hash_to_hex;
use ferrochain::ledger::{FileLedger, HeaderSink};
use std::env;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <payload> [ledger-file]", args[0]);
        return Ok(());
    }
    let payload = args[1].as_bytes();

    let config = load_config(None)?;
    let mining = config.mining_config()?;
    let target_hex = hash_to_hex(&mining.target);

    let mut chain =
        ChainBuilder::new(mining).with_max_payload_bytes(config.input.max_payload_bytes);

    let start = Instant::now();
    let mined = chain.append(payload)?;
    let elapsed = start.elapsed();

    println!("target:    {}", target_hex);
    println!("previous:  {}", hash_to_hex(&mined.header.previous_hash));
    println!("contents:  {}", hash_to_hex(&mined.header.contents_hash));
    println!("length:    {}", mined.header.contents_length);
    println!("timestamp: {}", mined.header.timestamp);
    println!("nonce:     {}", mined.header.nonce);
    println!("hash:      {}", hash_to_hex(&mined.hash));
    println!(
        "mined in {:.3}s ({} nonce attempts this round)",
        elapsed.as_secs_f64(),
        u64::from(mined.header.nonce) + 1
    );

    if let Some(path) = args.get(2) {
        let mut ledger = FileLedger::open(Path::new(path))?;
        ledger.append(&mined.header)?;
        println!("appended header to {}", path);
    }

    Ok(())
}
