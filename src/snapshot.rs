// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Attack inputs and scenario files.
//!
//! A [`Snapshot`] holds everything needed to construct an [`Adversary`]:
//! the victim estimate, validators, their latest bets and viewable bets.
//! Snapshots either come from a simulated [`Network`] or from a
//! [`ScenarioFile`] in TOML or JSON format, where bets are given labels and
//! refer to each other by label.
//!
//! ```toml
//! victim_estimate = 0
//!
//! [[validators]]
//! id = 0
//! weight = 1.0
//! latest = "a"
//! viewables = ["b"]
//!
//! [[validators]]
//! id = 1
//! weight = 1.0
//! latest = "b"
//! behavior = "stubborn"
//!
//! [bets.a]
//! sender = 0
//! estimate = 1
//!
//! [bets.b]
//! sender = 1
//! estimate = 0
//! ```
//!
//! [`Network`]: crate::network::Network

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adversary::Adversary;
use crate::bet::Bet;
use crate::model::Behavior;
use crate::validator::{Validator, ValidatorSet, ValidatorSetError};
use crate::{Estimate, ValidatorId, Weight};

/// Errors in attack inputs.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("validator {0} is not part of the validator set")]
    UnknownValidator(ValidatorId),
    #[error("validator {0} has no latest bet")]
    MissingLatestBet(ValidatorId),
    #[error("latest bet of validator {validator} was sent by validator {sender}")]
    SenderMismatch {
        validator: ValidatorId,
        sender: ValidatorId,
    },
    #[error("no model given for validator {0}")]
    MissingModel(ValidatorId),
    #[error("more than one model given for validator {0}")]
    DuplicateModel(ValidatorId),
    #[error("bet label `{0}` is not defined")]
    UnknownBet(String),
    #[error("justification of bet `{0}` is cyclic")]
    CyclicJustification(String),
    #[error("unsupported scenario file format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Validators(#[from] ValidatorSetError),
    #[error("failed to read scenario file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML scenario")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON scenario")]
    Json(#[from] serde_json::Error),
}

/// Inputs for a single attack.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub victim_estimate: Estimate,
    pub validators: ValidatorSet,
    pub latest_bets: BTreeMap<ValidatorId, Bet>,
    pub viewables: BTreeMap<ValidatorId, Vec<Bet>>,
    pub behaviors: BTreeMap<ValidatorId, Behavior>,
}

impl Snapshot {
    /// Builds the adversary for this snapshot.
    ///
    /// # Errors
    ///
    /// See [`Adversary::with_behaviors`].
    pub fn into_adversary(self) -> Result<Adversary, SnapshotError> {
        Adversary::with_behaviors(
            self.victim_estimate,
            &self.latest_bets,
            &self.viewables,
            self.validators,
            &self.behaviors,
        )
    }
}

/// Validator entry of a [`ScenarioFile`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub id: ValidatorId,
    pub weight: Weight,
    /// Label of the validator's latest bet.
    pub latest: String,
    /// Labels of bets viewable to the validator.
    #[serde(default)]
    pub viewables: Vec<String>,
    #[serde(default)]
    pub behavior: Behavior,
}

/// Bet entry of a [`ScenarioFile`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BetEntry {
    pub sender: ValidatorId,
    pub estimate: Estimate,
    #[serde(default)]
    pub sequence: u64,
    /// Labels of the bets this bet was produced from.
    #[serde(default)]
    pub justification: Vec<String>,
}

/// Human-writable description of a [`Snapshot`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub victim_estimate: Estimate,
    pub validators: Vec<ValidatorEntry>,
    #[serde(default)]
    pub bets: BTreeMap<String, BetEntry>,
}

impl ScenarioFile {
    /// Parses a scenario in TOML format.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Toml`] if the input is malformed.
    pub fn from_toml_str(s: &str) -> Result<Self, SnapshotError> {
        Ok(toml::from_str(s)?)
    }

    /// Parses a scenario in JSON format.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if the input is malformed.
    pub fn from_json_str(s: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a scenario file, picking the format by file extension.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or has neither a `.toml`
    /// nor a `.json` extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let format = path.extension().and_then(|e| e.to_str());
        match format {
            Some("toml") => Self::from_toml_str(&fs::read_to_string(path)?),
            Some("json") => Self::from_json_str(&fs::read_to_string(path)?),
            _ => Err(SnapshotError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Resolves bet labels into hashed bets.
    ///
    /// # Errors
    ///
    /// Fails on undefined or cyclic labels and on invalid validator sets.
    pub fn resolve(&self) -> Result<Snapshot, SnapshotError> {
        let validators = ValidatorSet::new(
            self.validators
                .iter()
                .map(|v| Validator::new(v.id, v.weight))
                .collect(),
        )?;

        let mut resolver = BetResolver {
            entries: &self.bets,
            resolved: BTreeMap::new(),
            in_progress: BTreeSet::new(),
        };
        let mut latest_bets = BTreeMap::new();
        let mut viewables = BTreeMap::new();
        let mut behaviors = BTreeMap::new();
        for entry in &self.validators {
            latest_bets.insert(entry.id, resolver.resolve(&entry.latest)?);
            let seen = entry
                .viewables
                .iter()
                .map(|label| resolver.resolve(label))
                .collect::<Result<Vec<_>, _>>()?;
            viewables.insert(entry.id, seen);
            behaviors.insert(entry.id, entry.behavior);
        }

        Ok(Snapshot {
            victim_estimate: self.victim_estimate,
            validators,
            latest_bets,
            viewables,
            behaviors,
        })
    }
}

struct BetResolver<'a> {
    entries: &'a BTreeMap<String, BetEntry>,
    resolved: BTreeMap<String, Bet>,
    in_progress: BTreeSet<String>,
}

impl BetResolver<'_> {
    fn resolve(&mut self, label: &str) -> Result<Bet, SnapshotError> {
        if let Some(bet) = self.resolved.get(label) {
            return Ok(bet.clone());
        }
        let entries = self.entries;
        let entry = entries
            .get(label)
            .ok_or_else(|| SnapshotError::UnknownBet(label.to_owned()))?;
        if !self.in_progress.insert(label.to_owned()) {
            return Err(SnapshotError::CyclicJustification(label.to_owned()));
        }
        let justification = entry
            .justification
            .iter()
            .map(|l| self.resolve(l).map(|b| b.hash()))
            .collect::<Result<Vec<_>, _>>()?;
        self.in_progress.remove(label);

        let bet = Bet::new(entry.estimate, entry.sender, entry.sequence, justification);
        self.resolved.insert(label.to_owned(), bet.clone());
        Ok(bet)
    }
}
