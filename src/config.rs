//! Configuration management for ferrochain

use crate::chain::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::crypto::hash_from_hex;
use crate::error::{ChainError, Result};
use crate::miner::MiningConfig;
use serde::Deserialize;
use std::fs;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "ferrochain.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub miner: MinerSection,
    #[serde(default)]
    pub input: InputSection,
    #[serde(default)]
    pub ledger: LedgerSection,
}

#[derive(Debug, Deserialize)]
pub struct MinerSection {
    /// Mining target as 64 hex chars, optionally `0x`-prefixed. Smaller
    /// values make mining harder.
    #[serde(default = "default_target")]
    pub target: String,
    /// Worker threads for the nonce search.
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for MinerSection {
    fn default() -> Self {
        Self {
            target: default_target(),
            threads: default_threads(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputSection {
    /// Payloads larger than this are rejected, never truncated.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct LedgerSection {
    /// When set, finalized headers are appended to this binary log.
    #[serde(default)]
    pub path: Option<String>,
}

/// Default target: byte 2 = 0x0f, everything else zero. Loose enough that a
/// block mines in well under one nonce round on ordinary hardware.
/// Too hard? Try byte 2 = 0xff. Too easy? Try 0x01.
fn default_target() -> String {
    "00000f0000000000000000000000000000000000000000000000000000000000".to_string()
}

fn default_threads() -> usize {
    1
}

fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

impl Config {
    /// Parse and validate the mining parameters.
    pub fn mining_config(&self) -> Result<MiningConfig> {
        let target = hash_from_hex(&self.miner.target)
            .map_err(|e| ChainError::ConfigError(format!("miner.target: {}", e)))?;
        Ok(MiningConfig::new(target).with_threads(self.miner.threads))
    }
}

/// Load configuration from `path`, or from [`CONFIG_FILE`] when absent.
/// A missing default file yields the built-in defaults; an explicitly
/// requested file must exist.
pub fn load_config(path: Option<&str>) -> Result<Config> {
    let config_str = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            ChainError::ConfigError(format!("Failed to read config {}: {}", path, e))
        })?,
        None => fs::read_to_string(CONFIG_FILE).unwrap_or_default(),
    };

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| ChainError::ConfigError(format!("Failed to parse config: {}", e)))?;

    // Validate critical values
    if config.miner.threads == 0 {
        return Err(ChainError::ConfigError(
            "miner.threads must be at least 1".to_string(),
        ));
    }
    if config.input.max_payload_bytes == 0 {
        return Err(ChainError::ConfigError(
            "input.max_payload_bytes must be at least 1".to_string(),
        ));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.miner.threads, 1);
        assert_eq!(config.input.max_payload_bytes, DEFAULT_MAX_PAYLOAD_BYTES);
        assert!(config.ledger.path.is_none());

        let mining = config.mining_config().unwrap();
        assert_eq!(mining.target[2], 0x0f);
        assert_eq!(mining.target[0], 0x00);
        assert_eq!(mining.target[31], 0x00);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [miner]
            target = "0x00ff000000000000000000000000000000000000000000000000000000000000"
            threads = 4

            [input]
            max_payload_bytes = 128

            [ledger]
            path = "headers.bin"
            "#,
        )
        .unwrap();

        let mining = config.mining_config().unwrap();
        assert_eq!(mining.target[1], 0xff);
        assert_eq!(mining.threads, 4);
        assert_eq!(config.input.max_payload_bytes, 128);
        assert_eq!(config.ledger.path.as_deref(), Some("headers.bin"));
    }

    #[test]
    fn test_invalid_target_rejected() {
        let config: Config = toml::from_str("[miner]\ntarget = \"abcd\"\n").unwrap();
        let result = config.mining_config();
        assert!(matches!(result, Err(ChainError::ConfigError(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ferrochain.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[miner]\nthreads = 2").unwrap();

        let config = load_config(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.miner.threads, 2);
    }

    #[test]
    fn test_load_config_missing_explicit_file() {
        let result = load_config(Some("/nonexistent/ferrochain.toml"));
        assert!(matches!(result, Err(ChainError::ConfigError(_))));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ferrochain.toml");
        fs::write(&path, "[miner]\nthreads = 0\n").unwrap();

        let result = load_config(Some(path.to_str().unwrap()));
        assert!(matches!(result, Err(ChainError::ConfigError(_))));
    }
}
