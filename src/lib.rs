// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ideal-network adversary for binary CBC Casper.
//!
//! Research tool that searches for safety counterexamples: given a snapshot of
//! latest messages, it decides whether an adversary controlling message
//! delivery can convince a weight majority of validators of the estimate
//! opposite to the one a victim currently sees as safe.

#![deny(rustdoc::broken_intra_doc_links)]

pub mod adversary;
pub mod bet;
pub mod crypto;
pub mod logging;
pub mod model;
pub mod network;
pub mod snapshot;
#[cfg(test)]
pub mod test_utils;
pub mod validator;
pub mod view;

use std::fmt;

use derive_more::{Add, From, Into, Sub, Sum};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

pub use self::adversary::{Adversary, AttackOutcome, Operation};
pub use self::bet::{Bet, BetHash};
pub use self::model::{LatestMessageModel, StubbornModel, ValidatorModel};
pub use self::network::Network;
pub use self::snapshot::{Snapshot, SnapshotError};
pub use self::validator::{Validator, ValidatorSet, ValidatorSetError};
pub use self::view::View;

/// Weight sums are considered equal if they differ by less than this.
///
/// Absorbs floating-point drift when summing many fractional weights.
pub const WEIGHT_TOLERANCE: f64 = 0.01;
const_assert!(WEIGHT_TOLERANCE > 0.0 && WEIGHT_TOLERANCE < 1.0);

/// Validator ID number type.
pub type ValidatorId = u64;

/// Validator voting weight.
///
/// Non-negative real number. Finiteness and sign are checked when building
/// a [`ValidatorSet`], not here.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    Sum,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Weight(f64);

impl Weight {
    pub const ZERO: Self = Self(0.0);

    /// Returns the raw weight value.
    #[must_use]
    pub const fn inner(self) -> f64 {
        self.0
    }

    /// Checks whether the two weights agree within [`WEIGHT_TOLERANCE`].
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.0 - other.0).abs() < WEIGHT_TOLERANCE
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Errors when interpreting a raw value as an [`Estimate`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    #[error("estimate must be 0 or 1, got {0}")]
    OutOfRange(u64),
}

/// Binary consensus value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum Estimate {
    Zero,
    One,
}

impl Estimate {
    /// Returns the other estimate.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }

    /// Returns the estimate as a single byte, as used for hashing.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl TryFrom<u64> for Estimate {
    type Error = EstimateError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            other => Err(EstimateError::OutOfRange(other)),
        }
    }
}

impl From<Estimate> for u64 {
    fn from(estimate: Estimate) -> Self {
        u64::from(estimate.as_byte())
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte())
    }
}
