// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Validator model following the CBC Casper latest-message estimator.

use std::sync::Arc;

use log::trace;

use super::ValidatorModel;
use crate::bet::Bet;
use crate::validator::{Validator, ValidatorSet};
use crate::view::View;
use crate::Estimate;

/// Validator that re-bets on the weighted majority of latest bets it sees.
///
/// On a tie the validator sticks with the estimate of its current latest bet.
#[derive(Clone, Debug)]
pub struct LatestMessageModel {
    validator: Validator,
    latest_bet: Bet,
    view: View,
    target: Estimate,
    validators: Arc<ValidatorSet>,
}

impl LatestMessageModel {
    /// Creates a new model from a snapshot of the validator's knowledge.
    ///
    /// # Panics
    ///
    /// Panics if `latest_bet` was not sent by `validator`.
    pub fn new(
        validator: Validator,
        latest_bet: Bet,
        viewables: impl IntoIterator<Item = Bet>,
        target: Estimate,
        validators: Arc<ValidatorSet>,
    ) -> Self {
        assert_eq!(
            latest_bet.sender(),
            validator.id,
            "latest bet must be sent by the modelled validator"
        );
        let mut view: View = viewables.into_iter().collect();
        view.add_bet(latest_bet.clone());
        Self {
            validator,
            latest_bet,
            view,
            target,
            validators,
        }
    }

    /// Gives the current latest bet of this validator.
    #[must_use]
    pub fn latest_bet(&self) -> &Bet {
        &self.latest_bet
    }

    /// Gives all bets currently viewable to this validator.
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }
}

impl ValidatorModel for LatestMessageModel {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn target(&self) -> Estimate {
        self.target
    }

    fn attempt_flip(&mut self) -> Option<Bet> {
        if self.latest_bet.estimate() == self.target {
            return Some(self.latest_bet.clone());
        }
        let estimate = self
            .view
            .estimate(&self.validators, self.latest_bet.estimate());
        if estimate != self.target {
            return None;
        }

        let justification = self.view.latest_bets().map(Bet::hash).collect();
        let bet = Bet::new(
            estimate,
            self.validator.id,
            self.latest_bet.sequence() + 1,
            justification,
        );
        trace!(
            "validator {} re-bets {} as {}",
            self.validator.id,
            estimate,
            bet.hash().short()
        );
        self.view.add_bet(bet.clone());
        self.latest_bet = bet.clone();
        Some(bet)
    }

    fn reveal(&mut self, bet: &Bet) {
        if !self.view.contains(&bet.hash()) {
            self.view.add_bet(bet.clone());
        }
    }
}
