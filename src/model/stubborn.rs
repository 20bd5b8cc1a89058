// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use super::ValidatorModel;
use crate::bet::{Bet, BetHash};
use crate::validator::Validator;
use crate::Estimate;

/// Validator that never makes a new bet.
///
/// Revealed bets are accepted but ignored. It only counts as voting with the
/// adversary if its latest bet already is on the target estimate.
#[derive(Clone, Debug)]
pub struct StubbornModel {
    validator: Validator,
    latest_bet: Bet,
    target: Estimate,
    revealed: BTreeSet<BetHash>,
}

impl StubbornModel {
    #[must_use]
    pub fn new(validator: Validator, latest_bet: Bet, target: Estimate) -> Self {
        Self {
            validator,
            latest_bet,
            target,
            revealed: BTreeSet::new(),
        }
    }

    /// Gives the number of distinct bets revealed to this validator.
    #[must_use]
    pub fn revealed(&self) -> usize {
        self.revealed.len()
    }
}

impl ValidatorModel for StubbornModel {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn target(&self) -> Estimate {
        self.target
    }

    fn attempt_flip(&mut self) -> Option<Bet> {
        (self.latest_bet.estimate() == self.target).then(|| self.latest_bet.clone())
    }

    fn reveal(&mut self, bet: &Bet) {
        self.revealed.insert(bet.hash());
    }
}
