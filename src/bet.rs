// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bets, the messages of the binary consensus protocol.
//!
//! A bet is a validator's claim of an estimate together with the bets it was
//! produced from (its justification). Bets are content-addressed: the
//! [`BetHash`] is derived from all fields, and equality, ordering and hashing
//! of [`Bet`] only look at it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;

use serde::{Serialize, Serializer};

use crate::crypto::{Hash, Hashable};
use crate::{Estimate, ValidatorId};

/// Content hash identifying a [`Bet`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BetHash(Hash);

impl BetHash {
    /// Returns the raw hash bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Returns an abbreviated hex representation, for logging.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for BetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for BetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BetHash({})", self.short())
    }
}

impl Serialize for BetHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// A single bet (message) by a validator.
#[derive(Clone, Debug, Serialize)]
pub struct Bet {
    estimate: Estimate,
    sender: ValidatorId,
    sequence: u64,
    justification: Vec<BetHash>,
    hash: BetHash,
}

impl Bet {
    /// Creates a new bet.
    ///
    /// The justification is stored sorted and without duplicates, so the
    /// resulting hash does not depend on the order it is given in.
    #[must_use]
    pub fn new(
        estimate: Estimate,
        sender: ValidatorId,
        sequence: u64,
        mut justification: Vec<BetHash>,
    ) -> Self {
        justification.sort_unstable();
        justification.dedup();
        let mut bet = Self {
            estimate,
            sender,
            sequence,
            justification,
            hash: BetHash([0; 32]),
        };
        bet.hash = BetHash(bet.content_hash());
        bet
    }

    /// Creates a bet without justification, as made at the start of a protocol run.
    #[must_use]
    pub fn initial(estimate: Estimate, sender: ValidatorId) -> Self {
        Self::new(estimate, sender, 0, Vec::new())
    }

    #[must_use]
    pub const fn estimate(&self) -> Estimate {
        self.estimate
    }

    #[must_use]
    pub const fn sender(&self) -> ValidatorId {
        self.sender
    }

    /// Gives the position of this bet in its sender's sequence of bets.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn justification(&self) -> &[BetHash] {
        &self.justification
    }

    #[must_use]
    pub const fn hash(&self) -> BetHash {
        self.hash
    }
}

impl Hashable for Bet {
    fn bytes_to_hash(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 8 + 8 + 32 * self.justification.len());
        bytes.push(self.estimate.as_byte());
        bytes.extend_from_slice(&self.sender.to_le_bytes());
        bytes.extend_from_slice(&self.sequence.to_le_bytes());
        for h in &self.justification {
            bytes.extend_from_slice(h.as_bytes());
        }
        bytes
    }
}

impl PartialEq for Bet {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Bet {}

impl std::hash::Hash for Bet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.hash, state);
    }
}

impl PartialOrd for Bet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash.cmp(&other.hash)
    }
}
