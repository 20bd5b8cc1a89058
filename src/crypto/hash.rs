// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Cryptographic hash function.
//!
//! This module abstracts the specific cryptographic hash function used
//! throughout the library. Currently, SHA-256 is used.

use sha2::{Digest, Sha256};

/// Regular 256-bit hash.
pub type Hash = [u8; 32];

/// Hashes the given data using SHA-256.
#[must_use]
pub fn hash(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
