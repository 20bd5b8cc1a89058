// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Validators and validator sets.
//!
//! Validators are immutable for the duration of an attack. The set keeps its
//! members ordered by [`ValidatorId`], which fixes iteration order for
//! everything built on top of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ValidatorId, Weight};

/// Errors that can occur when building a [`ValidatorSet`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidatorSetError {
    #[error("validator {0} appears more than once")]
    DuplicateValidator(ValidatorId),
    #[error("validator {0} has invalid weight {1}")]
    InvalidWeight(ValidatorId, f64),
}

/// Validator identity and voting weight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub id: ValidatorId,
    pub weight: Weight,
}

impl Validator {
    /// Creates a new validator with the given ID and weight.
    pub fn new(id: ValidatorId, weight: impl Into<Weight>) -> Self {
        Self {
            id,
            weight: weight.into(),
        }
    }
}

/// Set of validators, ordered by ID.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    /// Creates a new set from the given validators.
    ///
    /// # Errors
    ///
    /// - [`ValidatorSetError::DuplicateValidator`] if two validators share an ID.
    /// - [`ValidatorSetError::InvalidWeight`] if a weight is negative or not finite.
    pub fn new(mut validators: Vec<Validator>) -> Result<Self, ValidatorSetError> {
        for v in &validators {
            let w = v.weight.inner();
            if !w.is_finite() || w < 0.0 {
                return Err(ValidatorSetError::InvalidWeight(v.id, w));
            }
        }
        validators.sort_by_key(|v| v.id);
        if let Some(dup) = validators.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(ValidatorSetError::DuplicateValidator(dup[0].id));
        }
        Ok(Self { validators })
    }

    /// Creates `count` validators with IDs `0..count`, each with weight 1.
    #[must_use]
    pub fn with_equal_weights(count: u64) -> Self {
        let validators = (0..count).map(|id| Validator::new(id, 1.0)).collect();
        Self { validators }
    }

    /// Gives the validator with the given ID, if it is a member.
    #[must_use]
    pub fn get(&self, id: ValidatorId) -> Option<&Validator> {
        self.validators
            .binary_search_by_key(&id, |v| v.id)
            .ok()
            .map(|i| &self.validators[i])
    }

    /// Checks whether a validator with the given ID is a member.
    #[must_use]
    pub fn contains(&self, id: ValidatorId) -> bool {
        self.get(id).is_some()
    }

    /// Gives the weight of the given validator, zero for non-members.
    #[must_use]
    pub fn weight(&self, id: ValidatorId) -> Weight {
        self.get(id).map_or(Weight::ZERO, |v| v.weight)
    }

    /// Gives the total weight over all validators.
    #[must_use]
    pub fn total_weight(&self) -> Weight {
        self.validators.iter().map(|v| v.weight).sum()
    }

    /// Gives the summed weight of the given validators.
    ///
    /// Unknown IDs contribute nothing.
    pub fn weight_of<'a>(&self, ids: impl IntoIterator<Item = &'a ValidatorId>) -> Weight {
        ids.into_iter().map(|id| self.weight(*id)).sum()
    }

    /// Iterates over all validators in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }

    /// Iterates over all validator IDs in order.
    pub fn ids(&self) -> impl Iterator<Item = ValidatorId> + '_ {
        self.validators.iter().map(|v| v.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl<'de> Deserialize<'de> for ValidatorSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let validators = Vec::<Validator>::deserialize(deserializer)?;
        Self::new(validators).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a ValidatorSet {
    type Item = &'a Validator;
    type IntoIter = std::slice::Iter<'a, Validator>;

    fn into_iter(self) -> Self::IntoIter {
        self.validators.iter()
    }
}
