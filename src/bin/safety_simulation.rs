// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Monte-Carlo estimate of how often the ideal-network adversary succeeds.
//!
//! For each validator count, many random networks (random weights, random
//! initial estimates, random gossip) are simulated. Each is attacked on the
//! estimate its global view currently favors. Results are written as CSV,
//! one line per validator count.
//!
//! For parallelization, [`rayon`] is used.

use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use casper_adversary::{Estimate, Network, Validator, ValidatorSet, logging};
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::Context;
use log::{debug, info};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Validator counts to evaluate if none are given.
const DEFAULT_VALIDATOR_COUNTS: [u64; 5] = [4, 7, 10, 16, 25];

/// Safety simulation for the ideal-network adversary.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Validator counts to simulate.
    #[arg(long, value_delimiter = ',')]
    validators: Vec<u64>,
    /// Number of random networks per validator count.
    #[arg(long, default_value_t = 10_000, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: u64,
    /// Gossip rounds before each attack.
    #[arg(long, default_value_t = 4)]
    rounds: usize,
    /// Number of validators each bet is gossiped to per round.
    #[arg(long, default_value_t = 2)]
    fanout: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Output CSV file.
    #[arg(long, default_value = "data/output/simulations/safety/ideal_network.csv")]
    output: PathBuf,
}

/// Aggregated results for one validator count.
#[derive(Debug, Default)]
struct SimulationResult {
    attacks: AtomicUsize,
    successes: AtomicUsize,
    crafted_bets: AtomicUsize,
    rounds: AtomicUsize,
}

fn main() -> Result<()> {
    // enable fancy `color_eyre` error messages
    color_eyre::install()?;
    logging::enable_logforth();

    let args = Args::parse();
    let counts = if args.validators.is_empty() {
        DEFAULT_VALIDATOR_COUNTS.to_vec()
    } else {
        args.validators.clone()
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&args.output)
        .wrap_err_with(|| format!("can not create {}", args.output.display()))?;
    let mut csv_file = csv::Writer::from_writer(file);
    csv_file.write_record([
        "validators",
        "iterations",
        "success_rate",
        "avg_crafted_bets",
        "avg_rounds",
    ])?;

    for num_validators in counts {
        let result = simulate(&args, num_validators);
        let attacks = result.attacks.load(Ordering::Relaxed);
        let successes = result.successes.load(Ordering::Relaxed);
        let success_rate = successes as f64 / attacks as f64;
        let avg_bets = result.crafted_bets.load(Ordering::Relaxed) as f64 / successes.max(1) as f64;
        let avg_rounds = result.rounds.load(Ordering::Relaxed) as f64 / attacks as f64;
        info!(
            "{num_validators} validators: {:.1}% attacks succeeded",
            success_rate * 100.0
        );
        csv_file.write_record(&[
            num_validators.to_string(),
            attacks.to_string(),
            success_rate.to_string(),
            avg_bets.to_string(),
            avg_rounds.to_string(),
        ])?;
        csv_file.flush()?;
    }
    Ok(())
}

fn simulate(args: &Args, num_validators: u64) -> SimulationResult {
    debug!("simulating {} networks of {num_validators} validators", args.iterations);
    let result = SimulationResult::default();
    (0..args.iterations).into_par_iter().for_each(|i| {
        let seed = args.seed ^ (num_validators << 32) ^ i;
        let mut rng = StdRng::seed_from_u64(seed);
        let validators = (0..num_validators)
            .map(|id| Validator::new(id, rng.random_range(0.5..2.0)))
            .collect();
        let validators = ValidatorSet::new(validators).expect("generated validators are valid");

        let mut network = Network::new(validators);
        network.random_initialization(&mut rng);
        for _ in 0..args.rounds {
            network.random_round(&mut rng, args.fanout);
        }
        let victim = network
            .global_view()
            .estimate(network.validators(), Estimate::Zero);
        let mut adversary = network
            .snapshot(victim)
            .into_adversary()
            .expect("network snapshots are consistent");
        let outcome = adversary.ideal_network_attack();

        result.attacks.fetch_add(1, Ordering::Relaxed);
        result.rounds.fetch_add(outcome.rounds, Ordering::Relaxed);
        if outcome.succeeded {
            result.successes.fetch_add(1, Ordering::Relaxed);
            result
                .crafted_bets
                .fetch_add(outcome.attack_view.len(), Ordering::Relaxed);
        }
    });
    result
}
