// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Cryptographic primitives.
//!
//! Only content hashing is needed: bets are identified by the hash of their
//! contents, which makes them usable as set and map keys.

pub mod hash;

pub use self::hash::{Hash, hash};

/// A type that can be converted into a canonical byte string to be hashed.
///
/// This is deliberately separate from any serialization format. Two values
/// with equal `bytes_to_hash` output are considered the same object.
pub trait Hashable {
    /// Returns the exact byte string to be hashed.
    fn bytes_to_hash(&self) -> Vec<u8>;

    /// Hashes the canonical byte string of this value.
    fn content_hash(&self) -> Hash {
        hash(&self.bytes_to_hash())
    }
}
