// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ideal-network adversary.
//!
//! The adversary controls message delivery completely. Starting from a
//! snapshot of latest bets, it tries to convince a weight majority of
//! validators to bet on the estimate opposite to the victim's estimate.
//!
//! Validators are partitioned into those voting with the attacker and those
//! voting against it. Bets on the target estimate are shown to everyone still
//! voting against, and validators are re-queried in rounds until either the
//! target estimate outweighs the victim estimate or a round makes no progress.
//! Validators only ever move from the against set to the with set, so the
//! attack terminates after at most one progress round per validator.
//!
//! Any inconsistency in the answers of the [`ValidatorModel`]s is a bug in the
//! model and causes a panic, since the resulting counterexample could not be
//! trusted anyway.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use log::{debug, info, trace};
use serde::Serialize;

use crate::bet::{Bet, BetHash};
use crate::model::{Behavior, ValidatorModel};
use crate::snapshot::SnapshotError;
use crate::validator::ValidatorSet;
use crate::{Estimate, ValidatorId, Weight};

/// Kind of action recorded in the operations log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// A new bet on the target estimate was made for a validator that was
    /// voting against the attacker.
    AddedBet,
}

impl OperationKind {
    /// Human-readable tag of this kind of operation.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::AddedBet => "added valid bet for a validator voting against the attacker",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Single entry of the adversary's operations log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub kind: OperationKind,
    /// Validator on whose behalf the bet was made.
    pub validator: ValidatorId,
    pub bet: BetHash,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (validator {}, bet {})", self.kind, self.validator, self.bet)
    }
}

/// Result of [`Adversary::ideal_network_attack`].
///
/// For a failed attack, log and view show how far the adversary got. They are
/// not a counterexample.
#[derive(Clone, Debug, Serialize)]
pub struct AttackOutcome {
    pub succeeded: bool,
    pub operations_log: Vec<Operation>,
    pub attack_view: BTreeSet<Bet>,
    /// Number of fixpoint rounds in which at least one validator flipped.
    pub rounds: usize,
    pub weight_of_victim_estimate: Weight,
    pub weight_of_target_estimate: Weight,
}

/// Single-use ideal-network attack on a victim estimate.
pub struct Adversary {
    victim_estimate: Estimate,
    target_estimate: Estimate,
    validators: Arc<ValidatorSet>,
    models: BTreeMap<ValidatorId, Box<dyn ValidatorModel>>,

    voting_with_attacker: BTreeSet<ValidatorId>,
    voting_against_attacker: BTreeSet<ValidatorId>,
    weight_of_victim_estimate: Weight,
    weight_of_target_estimate: Weight,

    attack_view: BTreeSet<Bet>,
    operations_log: Vec<Operation>,
    rounds: usize,
    used: bool,
}

impl Adversary {
    /// Creates an adversary simulating every validator with a [`LatestMessageModel`].
    ///
    /// Validators without an entry in `viewables` see only their own latest bet.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if `latest_bets` and `viewables` do not
    /// match `validators`.
    ///
    /// # Panics
    ///
    /// Panics if the initial classification of validators violates an invariant.
    ///
    /// [`LatestMessageModel`]: crate::model::LatestMessageModel
    pub fn new(
        victim_estimate: Estimate,
        latest_bets: &BTreeMap<ValidatorId, Bet>,
        viewables: &BTreeMap<ValidatorId, Vec<Bet>>,
        validators: ValidatorSet,
    ) -> Result<Self, SnapshotError> {
        Self::with_behaviors(
            victim_estimate,
            latest_bets,
            viewables,
            validators,
            &BTreeMap::new(),
        )
    }

    /// Creates an adversary with per-validator model [`Behavior`]s.
    ///
    /// Validators missing from `behaviors` use [`Behavior::default`].
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if any of the maps mention validators not
    /// in `validators`, or a validator has no latest bet (or one sent by
    /// somebody else).
    pub fn with_behaviors(
        victim_estimate: Estimate,
        latest_bets: &BTreeMap<ValidatorId, Bet>,
        viewables: &BTreeMap<ValidatorId, Vec<Bet>>,
        validators: ValidatorSet,
        behaviors: &BTreeMap<ValidatorId, Behavior>,
    ) -> Result<Self, SnapshotError> {
        let unknown = latest_bets
            .keys()
            .chain(viewables.keys())
            .chain(behaviors.keys())
            .find(|id| !validators.contains(**id));
        if let Some(id) = unknown {
            return Err(SnapshotError::UnknownValidator(*id));
        }

        let target = victim_estimate.complement();
        let validators = Arc::new(validators);
        let mut models = Vec::with_capacity(validators.len());
        for validator in validators.iter() {
            let latest = latest_bets
                .get(&validator.id)
                .ok_or(SnapshotError::MissingLatestBet(validator.id))?;
            if latest.sender() != validator.id {
                return Err(SnapshotError::SenderMismatch {
                    validator: validator.id,
                    sender: latest.sender(),
                });
            }
            let seen = viewables.get(&validator.id).cloned().unwrap_or_default();
            let behavior = behaviors.get(&validator.id).copied().unwrap_or_default();
            models.push(behavior.build(*validator, latest.clone(), seen, target, &validators));
        }
        Ok(Self::from_models(victim_estimate, validators, models))
    }

    /// Creates an adversary from arbitrary validator models.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] unless there is exactly one model per validator.
    pub fn with_models(
        victim_estimate: Estimate,
        validators: ValidatorSet,
        models: Vec<Box<dyn ValidatorModel>>,
    ) -> Result<Self, SnapshotError> {
        let mut seen = BTreeSet::new();
        for model in &models {
            let id = model.validator().id;
            if !validators.contains(id) {
                return Err(SnapshotError::UnknownValidator(id));
            }
            if !seen.insert(id) {
                return Err(SnapshotError::DuplicateModel(id));
            }
        }
        if let Some(id) = validators.ids().find(|id| !seen.contains(id)) {
            return Err(SnapshotError::MissingModel(id));
        }
        Ok(Self::from_models(victim_estimate, Arc::new(validators), models))
    }

    fn from_models(
        victim_estimate: Estimate,
        validators: Arc<ValidatorSet>,
        models: Vec<Box<dyn ValidatorModel>>,
    ) -> Self {
        let target_estimate = victim_estimate.complement();
        let mut models: BTreeMap<_, _> = models
            .into_iter()
            .map(|m| (m.validator().id, m))
            .collect();

        // validators already on target (or drifting there on their own)
        let mut voting_with_attacker = BTreeSet::new();
        let mut voting_against_attacker = BTreeSet::new();
        for (id, model) in &mut models {
            assert_eq!(model.target(), target_estimate, "model of validator {id} has wrong target");
            match model.attempt_flip() {
                Some(bet) => {
                    assert_eq!(
                        bet.estimate(),
                        target_estimate,
                        "validator {id} voting with attacker must bet on target"
                    );
                    voting_with_attacker.insert(*id);
                }
                None => {
                    voting_against_attacker.insert(*id);
                }
            }
        }

        let mut adversary = Self {
            victim_estimate,
            target_estimate,
            validators,
            models,
            voting_with_attacker,
            voting_against_attacker,
            weight_of_victim_estimate: Weight::ZERO,
            weight_of_target_estimate: Weight::ZERO,
            attack_view: BTreeSet::new(),
            operations_log: Vec::new(),
            rounds: 0,
            used: false,
        };
        adversary.recompute_weights();
        adversary.assert_invariants();
        debug!(
            "adversary targeting {}: {} validators ({}) with, {} ({}) against",
            target_estimate,
            adversary.voting_with_attacker.len(),
            adversary.weight_of_target_estimate,
            adversary.voting_against_attacker.len(),
            adversary.weight_of_victim_estimate,
        );
        adversary
    }

    /// Checks whether the target estimate has strictly more weight than the victim estimate.
    #[must_use]
    pub fn is_attack_complete(&self) -> bool {
        self.weight_of_target_estimate > self.weight_of_victim_estimate
    }

    /// Runs the ideal-network attack.
    ///
    /// Stops as soon as the target estimate outweighs the victim estimate,
    /// without flipping any further validators.
    ///
    /// # Panics
    ///
    /// - Panics if called more than once on the same adversary.
    /// - Panics if a validator model gives inconsistent answers.
    pub fn ideal_network_attack(&mut self) -> AttackOutcome {
        assert!(!self.used, "adversary is single-use");
        self.used = true;

        if self.is_attack_complete() {
            info!("attack complete without any crafted bets");
            return self.outcome(true);
        }

        self.prime();

        loop {
            // validators flipped during this round are not queried again
            let pending: Vec<_> = self.voting_against_attacker.iter().copied().collect();
            let mut flipped = Vec::new();
            for id in pending {
                let Some(bet) = self.model_mut(id).attempt_flip() else {
                    continue;
                };
                assert_eq!(
                    bet.estimate(),
                    self.target_estimate,
                    "validator {id} flipped to wrong estimate"
                );

                self.move_to_attacker(id);
                flipped.push(id);
                debug!(
                    "validator {id} flipped with bet {}, weight {} vs {}",
                    bet.hash().short(),
                    self.weight_of_target_estimate,
                    self.weight_of_victim_estimate,
                );
                self.operations_log.push(Operation {
                    kind: OperationKind::AddedBet,
                    validator: id,
                    bet: bet.hash(),
                });
                self.attack_view.insert(bet.clone());

                if self.is_attack_complete() {
                    self.rounds += 1;
                    info!(
                        "attack succeeded after {} rounds with {} crafted bets",
                        self.rounds,
                        self.attack_view.len()
                    );
                    return self.outcome(true);
                }

                // relay within the same round
                self.show_to_opposing(&bet);
            }

            self.assert_invariants();
            if flipped.is_empty() {
                break;
            }
            self.rounds += 1;
            assert!(
                self.rounds <= self.validators.len(),
                "fixpoint did not terminate within {} rounds",
                self.validators.len()
            );
            assert!(
                !self.is_attack_complete(),
                "expected attack to be ongoing after round {}",
                self.rounds
            );
            debug!("round {} flipped validators {flipped:?}", self.rounds);
        }

        info!(
            "attack failed after {} rounds, {} validators ({}) remain against",
            self.rounds,
            self.voting_against_attacker.len(),
            self.weight_of_victim_estimate,
        );
        self.outcome(false)
    }

    /// Shows all bets of validators voting with the attacker to everyone else.
    fn prime(&mut self) {
        let with: Vec<_> = self.voting_with_attacker.iter().copied().collect();
        for id in with {
            let bet = self.model_mut(id).attempt_flip();
            let bet = match bet {
                Some(bet) if bet.estimate() == self.target_estimate => bet,
                _ => panic!("validator {id} is voting with attacker but not betting on target"),
            };
            trace!("priming with bet {} of validator {id}", bet.hash().short());
            self.show_to_opposing(&bet);
        }
    }

    fn show_to_opposing(&mut self, bet: &Bet) {
        for id in &self.voting_against_attacker {
            if let Some(model) = self.models.get_mut(id) {
                model.reveal(bet);
            }
        }
    }

    fn move_to_attacker(&mut self, id: ValidatorId) {
        let removed = self.voting_against_attacker.remove(&id);
        let inserted = self.voting_with_attacker.insert(id);
        assert!(removed && inserted, "validator {id} moved twice");
        self.recompute_weights();
    }

    /// Derives both partition weights from current membership.
    fn recompute_weights(&mut self) {
        self.weight_of_victim_estimate = self.validators.weight_of(&self.voting_against_attacker);
        self.weight_of_target_estimate = self.validators.weight_of(&self.voting_with_attacker);
    }

    fn assert_invariants(&self) {
        assert_eq!(
            self.voting_with_attacker.len() + self.voting_against_attacker.len(),
            self.validators.len(),
            "partition must cover all validators"
        );
        assert!(
            self.voting_with_attacker
                .is_disjoint(&self.voting_against_attacker),
            "partition must be disjoint"
        );
        let total = self.weight_of_victim_estimate + self.weight_of_target_estimate;
        assert!(
            total.approx_eq(self.validators.total_weight()),
            "partition weight {total} does not match total weight {}",
            self.validators.total_weight()
        );
    }

    fn model_mut(&mut self, id: ValidatorId) -> &mut Box<dyn ValidatorModel> {
        self.models
            .get_mut(&id)
            .expect("every validator has a model")
    }

    fn outcome(&self, succeeded: bool) -> AttackOutcome {
        AttackOutcome {
            succeeded,
            operations_log: self.operations_log.clone(),
            attack_view: self.attack_view.clone(),
            rounds: self.rounds,
            weight_of_victim_estimate: self.weight_of_victim_estimate,
            weight_of_target_estimate: self.weight_of_target_estimate,
        }
    }

    #[must_use]
    pub const fn victim_estimate(&self) -> Estimate {
        self.victim_estimate
    }

    #[must_use]
    pub const fn target_estimate(&self) -> Estimate {
        self.target_estimate
    }

    #[must_use]
    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    #[must_use]
    pub const fn voting_with_attacker(&self) -> &BTreeSet<ValidatorId> {
        &self.voting_with_attacker
    }

    #[must_use]
    pub const fn voting_against_attacker(&self) -> &BTreeSet<ValidatorId> {
        &self.voting_against_attacker
    }

    #[must_use]
    pub const fn weight_of_victim_estimate(&self) -> Weight {
        self.weight_of_victim_estimate
    }

    #[must_use]
    pub const fn weight_of_target_estimate(&self) -> Weight {
        self.weight_of_target_estimate
    }

    /// Gives the bets crafted so far.
    #[must_use]
    pub const fn attack_view(&self) -> &BTreeSet<Bet> {
        &self.attack_view
    }

    #[must_use]
    pub fn operations_log(&self) -> &[Operation] {
        &self.operations_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockValidatorModel;
    use crate::test_utils::{mock_model, snapshot_with_estimates};
    use crate::validator::Validator;

    #[test]
    fn five_validators_early_exit() {
        let validators = ValidatorSet::new(vec![
            Validator::new(0, 1.0),
            Validator::new(1, 1.0),
            Validator::new(2, 1.0),
            Validator::new(3, 1.0),
            Validator::new(4, 2.5),
        ])
        .unwrap();
        let flip_bet_2 = Bet::new(Estimate::One, 2, 1, Vec::new());
        let flip_bet_3 = Bet::new(Estimate::One, 3, 1, Vec::new());
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 0))], 2),
            mock_model(1, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 1))], 2),
            mock_model(2, 1.0, Estimate::One, &[None, Some(flip_bet_2.clone())], 2),
            mock_model(3, 1.0, Estimate::One, &[None, Some(flip_bet_3.clone())], 2),
            // never queried after construction
            mock_model(4, 2.5, Estimate::One, &[None], 1),
        ];
        let mut adversary = Adversary::with_models(Estimate::Zero, validators, models).unwrap();
        assert_eq!(adversary.target_estimate(), Estimate::One);
        assert_eq!(adversary.weight_of_target_estimate(), Weight::from(2.0));
        assert_eq!(adversary.weight_of_victim_estimate(), Weight::from(4.5));
        assert!(!adversary.is_attack_complete());

        let outcome = adversary.ideal_network_attack();
        assert!(outcome.succeeded);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(
            outcome.attack_view,
            BTreeSet::from([flip_bet_2.clone(), flip_bet_3.clone()])
        );
        assert_eq!(outcome.operations_log.len(), 2);
        assert_eq!(outcome.operations_log[0].validator, 2);
        assert_eq!(outcome.operations_log[0].bet, flip_bet_2.hash());
        assert_eq!(outcome.operations_log[1].bet, flip_bet_3.hash());
        assert_eq!(outcome.weight_of_target_estimate, Weight::from(4.0));
        assert_eq!(outcome.weight_of_victim_estimate, Weight::from(2.5));
        assert_eq!(adversary.voting_against_attacker(), &BTreeSet::from([4]));
    }

    #[test]
    fn equal_weights_stop_after_first_sufficient_flip() {
        let validators = ValidatorSet::with_equal_weights(5);
        let flip_bet = Bet::new(Estimate::One, 2, 1, Vec::new());
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 0))], 2),
            mock_model(1, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 1))], 2),
            mock_model(2, 1.0, Estimate::One, &[None, Some(flip_bet.clone())], 2),
            mock_model(3, 1.0, Estimate::One, &[None], 1),
            mock_model(4, 1.0, Estimate::One, &[None], 1),
        ];
        let mut adversary = Adversary::with_models(Estimate::Zero, validators, models).unwrap();
        let outcome = adversary.ideal_network_attack();
        assert!(outcome.succeeded);
        assert_eq!(outcome.attack_view, BTreeSet::from([flip_bet]));
        assert_eq!(outcome.weight_of_target_estimate, Weight::from(3.0));
        assert_eq!(outcome.weight_of_victim_estimate, Weight::from(2.0));
    }

    #[test]
    fn no_progress_fails() {
        let validators = ValidatorSet::with_equal_weights(5);
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 0))], 2),
            mock_model(1, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 1))], 2),
            mock_model(2, 1.0, Estimate::One, &[None], 2),
            mock_model(3, 1.0, Estimate::One, &[None], 2),
            mock_model(4, 1.0, Estimate::One, &[None], 2),
        ];
        let mut adversary = Adversary::with_models(Estimate::Zero, validators, models).unwrap();
        let outcome = adversary.ideal_network_attack();
        assert!(!outcome.succeeded);
        assert!(outcome.attack_view.is_empty());
        assert!(outcome.operations_log.is_empty());
        assert_eq!(outcome.rounds, 0);
        assert_eq!(adversary.voting_with_attacker().len(), 2);
    }

    #[test]
    fn fast_path() {
        let validators = ValidatorSet::with_equal_weights(3);
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::Zero, &[Some(Bet::initial(Estimate::Zero, 0))], 1),
            mock_model(1, 1.0, Estimate::Zero, &[Some(Bet::initial(Estimate::Zero, 1))], 1),
            mock_model(2, 1.0, Estimate::Zero, &[None], 1),
        ];
        let mut adversary = Adversary::with_models(Estimate::One, validators, models).unwrap();
        assert!(adversary.is_attack_complete());
        let outcome = adversary.ideal_network_attack();
        assert!(outcome.succeeded);
        assert!(outcome.attack_view.is_empty());
        assert_eq!(outcome.rounds, 0);
    }

    #[test]
    fn tie_is_not_success() {
        let validators = ValidatorSet::with_equal_weights(2);
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 0))], 2),
            mock_model(1, 1.0, Estimate::One, &[None], 2),
        ];
        let mut adversary = Adversary::with_models(Estimate::Zero, validators, models).unwrap();
        assert!(!adversary.is_attack_complete());
        assert!(!adversary.ideal_network_attack().succeeded);
    }

    #[test]
    fn primed_bets_reach_opposing_validators() {
        let validators = ValidatorSet::with_equal_weights(3);
        let primed = Bet::initial(Estimate::One, 0);
        let mut opposing = MockValidatorModel::new();
        opposing
            .expect_validator()
            .return_const(Validator::new(1, 1.0));
        opposing.expect_target().return_const(Estimate::One);
        opposing
            .expect_attempt_flip()
            .times(2)
            .return_const(None::<Bet>);
        let expected = primed.clone();
        opposing
            .expect_reveal()
            .withf(move |bet| bet == &expected)
            .times(1)
            .return_const(());
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::One, &[Some(primed)], 2),
            Box::new(opposing),
            mock_model(2, 1.0, Estimate::One, &[None], 2),
        ];
        let mut adversary = Adversary::with_models(Estimate::Zero, validators, models).unwrap();
        assert!(!adversary.ideal_network_attack().succeeded);
    }

    #[test]
    #[should_panic(expected = "must bet on target")]
    fn inconsistent_model_is_fatal() {
        let validators = ValidatorSet::with_equal_weights(1);
        let models: Vec<Box<dyn ValidatorModel>> =
            vec![mock_model(0, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::Zero, 0))], 1)];
        let _ = Adversary::with_models(Estimate::Zero, validators, models);
    }

    #[test]
    #[should_panic(expected = "voting with attacker but not betting on target")]
    fn priming_requires_target_bet() {
        let validators = ValidatorSet::with_equal_weights(3);
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            // on target when classified, silent when primed
            mock_model(0, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 0)), None], 2),
            mock_model(1, 1.0, Estimate::One, &[None], 1),
            mock_model(2, 1.0, Estimate::One, &[None], 1),
        ];
        let mut adversary = Adversary::with_models(Estimate::Zero, validators, models).unwrap();
        let _ = adversary.ideal_network_attack();
    }

    #[test]
    #[should_panic(expected = "flipped to wrong estimate")]
    fn flip_must_be_on_target() {
        let validators = ValidatorSet::with_equal_weights(3);
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::One, &[Some(Bet::initial(Estimate::One, 0))], 2),
            mock_model(
                1,
                1.0,
                Estimate::One,
                &[None, Some(Bet::new(Estimate::Zero, 1, 1, Vec::new()))],
                2,
            ),
            mock_model(2, 1.0, Estimate::One, &[None], 1),
        ];
        let mut adversary = Adversary::with_models(Estimate::Zero, validators, models).unwrap();
        let _ = adversary.ideal_network_attack();
    }

    #[test]
    #[should_panic(expected = "single-use")]
    fn single_use() {
        let (validators, latest, viewables) =
            snapshot_with_estimates(&[Estimate::Zero, Estimate::Zero, Estimate::One]);
        let mut adversary =
            Adversary::new(Estimate::Zero, &latest, &viewables, validators).unwrap();
        let _ = adversary.ideal_network_attack();
        let _ = adversary.ideal_network_attack();
    }

    #[test]
    fn model_set_must_match_validators() {
        let validators = ValidatorSet::with_equal_weights(2);
        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::One, &[], 0),
            mock_model(0, 1.0, Estimate::One, &[], 0),
        ];
        let res = Adversary::with_models(Estimate::Zero, validators.clone(), models);
        assert!(matches!(res, Err(SnapshotError::DuplicateModel(0))));

        let models: Vec<Box<dyn ValidatorModel>> = vec![mock_model(0, 1.0, Estimate::One, &[], 0)];
        let res = Adversary::with_models(Estimate::Zero, validators.clone(), models);
        assert!(matches!(res, Err(SnapshotError::MissingModel(1))));

        let models: Vec<Box<dyn ValidatorModel>> = vec![
            mock_model(0, 1.0, Estimate::One, &[], 0),
            mock_model(1, 1.0, Estimate::One, &[], 0),
            mock_model(7, 1.0, Estimate::One, &[], 0),
        ];
        let res = Adversary::with_models(Estimate::Zero, validators, models);
        assert!(matches!(res, Err(SnapshotError::UnknownValidator(7))));
    }

    #[test]
    fn snapshot_must_match_validators() {
        let (validators, mut latest, viewables) =
            snapshot_with_estimates(&[Estimate::Zero, Estimate::One]);
        latest.remove(&1);
        let res = Adversary::new(Estimate::Zero, &latest, &viewables, validators.clone());
        assert!(matches!(res, Err(SnapshotError::MissingLatestBet(1))));

        latest.insert(1, Bet::initial(Estimate::One, 0));
        let res = Adversary::new(Estimate::Zero, &latest, &viewables, validators.clone());
        assert!(matches!(
            res,
            Err(SnapshotError::SenderMismatch {
                validator: 1,
                sender: 0
            })
        ));

        latest.insert(1, Bet::initial(Estimate::One, 1));
        latest.insert(5, Bet::initial(Estimate::One, 5));
        let res = Adversary::new(Estimate::Zero, &latest, &viewables, validators);
        assert!(matches!(res, Err(SnapshotError::UnknownValidator(5))));
    }

    #[test]
    fn fractional_weights_reconcile() {
        let validators = ValidatorSet::new(
            (0..10).map(|id| Validator::new(id, 0.1)).collect(),
        )
        .unwrap();
        let mut latest = BTreeMap::new();
        for id in 0..10 {
            let estimate = if id < 4 { Estimate::One } else { Estimate::Zero };
            latest.insert(id, Bet::initial(estimate, id));
        }
        let mut adversary =
            Adversary::new(Estimate::Zero, &latest, &BTreeMap::new(), validators).unwrap();
        let outcome = adversary.ideal_network_attack();
        assert!(outcome.succeeded);
        let total = outcome.weight_of_target_estimate + outcome.weight_of_victim_estimate;
        assert!(total.approx_eq(Weight::from(1.0)));
        assert!(outcome.weight_of_target_estimate > outcome.weight_of_victim_estimate);
    }
}
