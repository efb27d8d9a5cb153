//! Append-only persistence for finalized headers.
//!
//! Records are the raw fixed-size header encoding, written in mined order
//! with no separators; being fixed-length makes them self-delimiting.

use crate::error::{ChainError, Result};
use crate::header::{BlockHeader, HEADER_SIZE};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Abstraction for sinks that receive finalized headers. A sink failure is
/// recoverable: the caller's in-memory tip stays valid.
pub trait HeaderSink: Send {
    fn append(&mut self, header: &BlockHeader) -> Result<()>;
}

/// File-backed ledger of raw 76-byte header records.
pub struct FileLedger {
    file: File,
}

impl FileLedger {
    /// Open (or create) a ledger file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                ChainError::IoError(format!("Failed to open ledger {}: {}", path.display(), e))
            })?;
        Ok(FileLedger { file })
    }

    /// Decode every record in a ledger file, in mined order.
    ///
    /// A trailing partial record means the log was corrupted or truncated
    /// mid-write; it is reported rather than silently dropped.
    pub fn read_headers(path: &Path) -> Result<Vec<BlockHeader>> {
        let bytes = std::fs::read(path).map_err(|e| {
            ChainError::IoError(format!("Failed to read ledger {}: {}", path.display(), e))
        })?;

        if bytes.len() % HEADER_SIZE != 0 {
            return Err(ChainError::IoError(format!(
                "Ledger {} is {} bytes, not a multiple of the {}-byte record size",
                path.display(),
                bytes.len(),
                HEADER_SIZE
            )));
        }

        Ok(bytes
            .chunks_exact(HEADER_SIZE)
            .map(|chunk| {
                let mut record = [0u8; HEADER_SIZE];
                record.copy_from_slice(chunk);
                BlockHeader::decode(&record)
            })
            .collect())
    }
}

impl HeaderSink for FileLedger {
    fn append(&mut self, header: &BlockHeader) -> Result<()> {
        self.file
            .write_all(&header.encode())
            .map_err(|e| ChainError::IoError(format!("Failed to append header: {}", e)))?;
        self.file
            .flush()
            .map_err(|e| ChainError::IoError(format!("Failed to flush ledger: {}", e)))?;
        Ok(())
    }
}

/// In-memory sink useful for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    pub headers: Vec<BlockHeader>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HeaderSink for MemoryLedger {
    fn append(&mut self, header: &BlockHeader) -> Result<()> {
        self.headers.push(*header);
        Ok(())
    }
}
