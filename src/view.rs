// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Views, sets of bets known to some observer.
//!
//! Besides the bets themselves, a [`View`] maintains the latest bet of each
//! sender it knows about. Recency is decided by sequence number, with the bet
//! hash as tie-breaker so the index only depends on the set of bets, not on
//! the order they were added in.

use std::collections::BTreeMap;

use crate::bet::{Bet, BetHash};
use crate::validator::ValidatorSet;
use crate::{Estimate, ValidatorId, Weight};

/// Set of bets with a derived latest-bet-per-sender index.
#[derive(Clone, Debug, Default)]
pub struct View {
    bets: BTreeMap<BetHash, Bet>,
    latest: BTreeMap<ValidatorId, BetHash>,
}

impl View {
    /// Creates an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given bet to the view.
    ///
    /// Returns `true` if the bet was not already part of the view.
    pub fn add_bet(&mut self, bet: Bet) -> bool {
        let hash = bet.hash();
        if self.bets.contains_key(&hash) {
            return false;
        }
        let key = (bet.sequence(), hash);
        let newer = match self.latest.get(&bet.sender()) {
            Some(current) => key > (self.bets[current].sequence(), *current),
            None => true,
        };
        if newer {
            self.latest.insert(bet.sender(), hash);
        }
        self.bets.insert(hash, bet);
        true
    }

    /// Adds all given bets to the view.
    pub fn add_bets(&mut self, bets: impl IntoIterator<Item = Bet>) {
        for bet in bets {
            self.add_bet(bet);
        }
    }

    #[must_use]
    pub fn contains(&self, hash: &BetHash) -> bool {
        self.bets.contains_key(hash)
    }

    #[must_use]
    pub fn get(&self, hash: &BetHash) -> Option<&Bet> {
        self.bets.get(hash)
    }

    /// Gives the latest bet of the given sender, if any is known.
    #[must_use]
    pub fn latest_bet(&self, sender: ValidatorId) -> Option<&Bet> {
        self.latest.get(&sender).map(|h| &self.bets[h])
    }

    /// Iterates over the latest bet of every known sender, in sender order.
    pub fn latest_bets(&self) -> impl Iterator<Item = &Bet> {
        self.latest.values().map(|h| &self.bets[h])
    }

    /// Iterates over all bets in the view, in hash order.
    pub fn bets(&self) -> impl Iterator<Item = &Bet> {
        self.bets.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Computes the weighted majority estimate over all latest bets.
    ///
    /// Only senders in `validators` count. If both estimates carry exactly
    /// the same weight, `tie` is returned.
    #[must_use]
    pub fn estimate(&self, validators: &ValidatorSet, tie: Estimate) -> Estimate {
        let (mut zero, mut one) = (Weight::ZERO, Weight::ZERO);
        for bet in self.latest_bets() {
            let weight = validators.weight(bet.sender());
            match bet.estimate() {
                Estimate::Zero => zero = zero + weight,
                Estimate::One => one = one + weight,
            }
        }
        if one > zero {
            Estimate::One
        } else if zero > one {
            Estimate::Zero
        } else {
            tie
        }
    }
}

impl FromIterator<Bet> for View {
    fn from_iter<I: IntoIterator<Item = Bet>>(iter: I) -> Self {
        let mut view = Self::new();
        view.add_bets(iter);
        view
    }
}
