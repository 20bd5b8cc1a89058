// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulated in-memory network of latest-message validators.
//!
//! Used to produce realistic [`Snapshot`]s for the adversary. Every validator
//! has its own [`View`], and a global view collects every bet ever made.
//! Bets can only be propagated from the global view, so there is no way to
//! deliver a bet that was never made.
//!
//! Randomness is confined to this module. The adversary itself is fully
//! deterministic given a snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::trace;
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use crate::bet::{Bet, BetHash};
use crate::snapshot::Snapshot;
use crate::validator::ValidatorSet;
use crate::view::View;
use crate::{Estimate, ValidatorId};

/// Errors when driving the simulated network.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("validator {0} is not part of the network")]
    UnknownValidator(ValidatorId),
    #[error("bet {0} is not part of the global view")]
    UnknownBet(BetHash),
}

/// In-memory network with full knowledge of every validator's view.
#[derive(Clone, Debug)]
pub struct Network {
    validators: Arc<ValidatorSet>,
    views: BTreeMap<ValidatorId, View>,
    global_view: View,
}

impl Network {
    /// Creates a network where nobody has made a bet yet.
    #[must_use]
    pub fn new(validators: ValidatorSet) -> Self {
        let views = validators.ids().map(|id| (id, View::new())).collect();
        Self {
            validators: Arc::new(validators),
            views,
            global_view: View::new(),
        }
    }

    #[must_use]
    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Gives the view containing every bet made so far.
    #[must_use]
    pub fn global_view(&self) -> &View {
        &self.global_view
    }

    /// Gives the view of the given validator.
    #[must_use]
    pub fn view(&self, id: ValidatorId) -> Option<&View> {
        self.views.get(&id)
    }

    /// Adds an initial bet on `estimate` for the given validator.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownValidator`] if `id` is not in the network.
    pub fn add_initial_bet(
        &mut self,
        id: ValidatorId,
        estimate: Estimate,
    ) -> Result<Bet, NetworkError> {
        let view = self
            .views
            .get_mut(&id)
            .ok_or(NetworkError::UnknownValidator(id))?;
        let bet = Bet::initial(estimate, id);
        view.add_bet(bet.clone());
        self.global_view.add_bet(bet.clone());
        Ok(bet)
    }

    /// Lets the given validator make a new bet from its current view.
    ///
    /// The new bet is on the weighted majority of the latest bets in the view,
    /// keeping the validator's previous estimate on ties, and is justified by
    /// all of those latest bets.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownValidator`] if `id` is not in the network.
    pub fn make_message(&mut self, id: ValidatorId) -> Result<Bet, NetworkError> {
        let view = self
            .views
            .get_mut(&id)
            .ok_or(NetworkError::UnknownValidator(id))?;
        let own = view.latest_bet(id);
        let tie = own.map_or(Estimate::Zero, Bet::estimate);
        let sequence = own.map_or(0, |b| b.sequence() + 1);
        let estimate = view.estimate(&self.validators, tie);
        let justification = view.latest_bets().map(Bet::hash).collect();
        let bet = Bet::new(estimate, id, sequence, justification);
        trace!("validator {id} made bet {} on {estimate}", bet.hash().short());
        view.add_bet(bet.clone());
        self.global_view.add_bet(bet.clone());
        Ok(bet)
    }

    /// Delivers a bet from the global view to the given validator.
    ///
    /// # Errors
    ///
    /// Fails if the bet was never made or the validator is unknown.
    pub fn propagate(&mut self, bet: BetHash, to: ValidatorId) -> Result<(), NetworkError> {
        let bet = self
            .global_view
            .get(&bet)
            .ok_or(NetworkError::UnknownBet(bet))?
            .clone();
        let view = self
            .views
            .get_mut(&to)
            .ok_or(NetworkError::UnknownValidator(to))?;
        view.add_bet(bet);
        Ok(())
    }

    /// Makes every validator place an initial bet on a uniformly random estimate.
    pub fn random_initialization(&mut self, rng: &mut impl Rng) {
        let ids: Vec<_> = self.validators.ids().collect();
        for id in ids {
            let estimate = if rng.random_bool(0.5) {
                Estimate::One
            } else {
                Estimate::Zero
            };
            self.add_initial_bet(id, estimate).expect("ids come from the validator set");
        }
    }

    /// Runs one round of gossip followed by one round of betting.
    ///
    /// Each validator's latest bet is delivered to `fanout` random other
    /// validators, then every validator makes a new bet.
    pub fn random_round(&mut self, rng: &mut impl Rng, fanout: usize) {
        let ids: Vec<_> = self.validators.ids().collect();
        for &from in &ids {
            let Some(latest) = self.views[&from].latest_bet(from).map(Bet::hash) else {
                continue;
            };
            let others: Vec<_> = ids.iter().copied().filter(|id| *id != from).collect();
            for &to in others.choose_multiple(rng, fanout) {
                self.propagate(latest, to).expect("latest bets are part of the global view");
            }
        }
        for id in ids {
            self.make_message(id).expect("ids come from the validator set");
        }
    }

    /// Captures the current state as adversary input.
    ///
    /// Each validator's latest bet is its own latest bet, its viewable bets
    /// are all bets in its view. Validators that never made a bet are given
    /// an initial bet on the victim estimate.
    #[must_use]
    pub fn snapshot(&self, victim_estimate: Estimate) -> Snapshot {
        let mut latest_bets = BTreeMap::new();
        let mut viewables = BTreeMap::new();
        for (&id, view) in &self.views {
            let latest = view
                .latest_bet(id)
                .cloned()
                .unwrap_or_else(|| Bet::initial(victim_estimate, id));
            latest_bets.insert(id, latest);
            viewables.insert(id, view.bets().cloned().collect());
        }
        Snapshot {
            victim_estimate,
            validators: (*self.validators).clone(),
            latest_bets,
            viewables,
            behaviors: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn propagate_only_known_bets() {
        let mut network = Network::new(ValidatorSet::with_equal_weights(3));
        let bet = network.add_initial_bet(0, Estimate::One).unwrap();
        network.propagate(bet.hash(), 1).unwrap();
        assert_eq!(network.view(1).unwrap().latest_bet(0), Some(&bet));

        let foreign = Bet::initial(Estimate::Zero, 2);
        assert_eq!(
            network.propagate(foreign.hash(), 1),
            Err(NetworkError::UnknownBet(foreign.hash()))
        );
        assert_eq!(
            network.propagate(bet.hash(), 9),
            Err(NetworkError::UnknownValidator(9))
        );
    }

    #[test]
    fn make_message_follows_majority() {
        let mut network = Network::new(ValidatorSet::with_equal_weights(3));
        let b0 = network.add_initial_bet(0, Estimate::Zero).unwrap();
        let b1 = network.add_initial_bet(1, Estimate::One).unwrap();
        let b2 = network.add_initial_bet(2, Estimate::One).unwrap();
        network.propagate(b1.hash(), 0).unwrap();
        network.propagate(b2.hash(), 0).unwrap();

        let bet = network.make_message(0).unwrap();
        assert_eq!(bet.estimate(), Estimate::One);
        assert_eq!(bet.sequence(), 1);
        assert!(bet.justification().contains(&b0.hash()));
        assert_eq!(network.global_view().len(), 4);
    }

    #[test]
    fn random_runs_are_reproducible() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut network = Network::new(ValidatorSet::with_equal_weights(7));
            network.random_initialization(&mut rng);
            for _ in 0..3 {
                network.random_round(&mut rng, 2);
            }
            network
                .global_view()
                .bets()
                .map(Bet::hash)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_eq!(run(42).len(), 7 * 4);
    }

    #[test]
    fn snapshot_covers_all_validators() {
        let mut network = Network::new(ValidatorSet::with_equal_weights(4));
        network.add_initial_bet(0, Estimate::One).unwrap();
        let snapshot = network.snapshot(Estimate::Zero);
        assert_eq!(snapshot.latest_bets.len(), 4);
        assert_eq!(snapshot.latest_bets[&0].estimate(), Estimate::One);
        assert_eq!(snapshot.latest_bets[&3].estimate(), Estimate::Zero);
        assert!(snapshot.viewables[&3].is_empty());
        assert!(snapshot.into_adversary().is_ok());
    }
}
