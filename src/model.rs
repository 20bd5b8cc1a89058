// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Models of individual validators, as simulated by the adversary.
//!
//! The [`ValidatorModel`] trait is the only interface the [`Adversary`] uses
//! to talk to validators. It captures one validator's local knowledge and
//! answers whether, given everything it can see, it would now bet on the
//! adversary's target estimate.
//!
//! This module provides two implementations:
//! - [`LatestMessageModel`] follows the CBC Casper estimator, re-betting on the
//!   weighted majority of the latest bets it sees.
//! - [`StubbornModel`] never re-bets, which models validators that are crashed
//!   or otherwise out of the adversary's reach.
//!
//! [`Adversary`]: crate::adversary::Adversary

mod latest_message;
mod stubborn;

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

pub use self::latest_message::LatestMessageModel;
pub use self::stubborn::StubbornModel;
use crate::bet::Bet;
use crate::validator::{Validator, ValidatorSet};
use crate::Estimate;

/// Abstraction of a single simulated validator.
#[cfg_attr(test, automock)]
pub trait ValidatorModel {
    /// Gives the validator this model simulates.
    fn validator(&self) -> &Validator;

    /// Gives the estimate the adversary tries to move this validator to.
    fn target(&self) -> Estimate;

    /// Tries to make a new latest bet from the currently viewable bets.
    ///
    /// Returns `Some(bet)` iff the resulting latest bet is on the target
    /// estimate. If the current latest bet is already on target, it is
    /// returned again.
    ///
    /// Implementors must be deterministic given the set of revealed bets.
    /// They may only update their own state.
    fn attempt_flip(&mut self) -> Option<Bet>;

    /// Makes the given bet viewable to this validator.
    ///
    /// Revealing the same bet multiple times must have the same effect as
    /// revealing it once.
    fn reveal(&mut self, bet: &Bet);
}

/// Selects which [`ValidatorModel`] implementation simulates a validator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Simulate with [`LatestMessageModel`].
    #[default]
    LatestMessage,
    /// Simulate with [`StubbornModel`].
    Stubborn,
}

impl Behavior {
    /// Builds a boxed model of this kind from the given snapshot data.
    pub fn build(
        self,
        validator: Validator,
        latest_bet: Bet,
        viewables: impl IntoIterator<Item = Bet>,
        target: Estimate,
        validators: &Arc<ValidatorSet>,
    ) -> Box<dyn ValidatorModel> {
        match self {
            Self::LatestMessage => Box::new(LatestMessageModel::new(
                validator,
                latest_bet,
                viewables,
                target,
                Arc::clone(validators),
            )),
            Self::Stubborn => Box::new(StubbornModel::new(validator, latest_bet, target)),
        }
    }
}
