//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Registry (resolved signer keys, RPC url, gas policy)
//!     → signers.rs (local keys or node-managed accounts)
//!     → client.rs (RPC connection with timeouts)
//!     → transaction.rs (gas pricing, receipt and confirmation wait)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from resolved registry secrets
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Errors are surfaced, never retried

pub mod client;
pub mod signers;
pub mod transaction;
pub mod types;

pub use client::NetworkClient;
pub use signers::{LocalSigners, NodeSigners, SignerProvider};
pub use types::{BlockchainError, BlockchainResult, ChainId, Confirmation};
