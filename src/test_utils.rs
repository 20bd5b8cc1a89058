// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Utility types and functions for tests.

use std::collections::BTreeMap;

use crate::bet::Bet;
use crate::model::{MockValidatorModel, ValidatorModel};
use crate::validator::{Validator, ValidatorSet};
use crate::{Estimate, ValidatorId};

/// Creates a mocked [`ValidatorModel`] with scripted answers.
///
/// The `n`-th call to `attempt_flip` returns `answers[n]`, repeating the last
/// answer once the script runs out. Expects exactly `calls` such calls.
/// Reveals are accepted any number of times.
pub fn mock_model(
    id: ValidatorId,
    weight: f64,
    target: Estimate,
    answers: &[Option<Bet>],
    calls: usize,
) -> Box<dyn ValidatorModel> {
    let mut model = MockValidatorModel::new();
    model
        .expect_validator()
        .return_const(Validator::new(id, weight));
    model.expect_target().return_const(target);
    let answers = answers.to_vec();
    let mut call = 0;
    model
        .expect_attempt_flip()
        .times(calls)
        .returning(move || {
            let answer = answers[call.min(answers.len() - 1)].clone();
            call += 1;
            answer
        });
    model.expect_reveal().return_const(());
    Box::new(model)
}

/// Creates equal-weight validators with one initial bet each.
///
/// Validator `i` bets on `estimates[i]` and sees nothing else.
pub fn snapshot_with_estimates(
    estimates: &[Estimate],
) -> (
    ValidatorSet,
    BTreeMap<ValidatorId, Bet>,
    BTreeMap<ValidatorId, Vec<Bet>>,
) {
    let validators = ValidatorSet::with_equal_weights(estimates.len() as u64);
    let latest = estimates
        .iter()
        .zip(validators.ids())
        .map(|(e, id)| (id, Bet::initial(*e, id)))
        .collect();
    let viewables = validators.ids().map(|id| (id, Vec::new())).collect();
    (validators, latest, viewables)
}
