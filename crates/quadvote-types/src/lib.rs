//! quadvote Types - Core type definitions for the quadvote governance ledger.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - Addresses (32-byte identities and derived record addresses, Bech32m encoded)
//! - Hashes (32-byte blake3 digests, the input to address derivation)

pub mod address;
pub mod hash;
pub mod error;

#[cfg(any(feature = "serde", feature = "borsh"))]
mod serialization;

pub use address::Address;
pub use hash::Hash;
pub use error::TypesError;
