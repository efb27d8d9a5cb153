//! Ferrochain - a minimal proof-of-work header chain
//!
//! A sequence of fixed-layout block headers, each cryptographically bound to
//! its predecessor and to arbitrary payload data. Admitting a new block
//! requires finding a timestamp/nonce pair whose header digest falls below a
//! configurable 32-byte target.
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Chain
//! - [`header`] - Block header data model and byte-exact encoding
//! - [`chain`] - Chain orchestration, one block at a time
//!
//! ## Consensus & Mining
//! - [`miner`] - Proof-of-work nonce search with cancellation
//!
//! ## Cryptography
//! - [`crypto`] - SHA-256 digests and target comparison
//!
//! ## State Management
//! - [`ledger`] - Append-only binary header log
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Chain
// ============================================================================
pub mod chain;
pub mod header;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// State Management
// ============================================================================
pub mod ledger;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
