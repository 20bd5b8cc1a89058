// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runs a single ideal-network attack and prints the outcome as JSON.
//!
//! The attacked snapshot either comes from a scenario file or from a randomly
//! simulated network.

use std::fs;
use std::path::PathBuf;

use casper_adversary::snapshot::ScenarioFile;
use casper_adversary::{Estimate, Network, Snapshot, ValidatorSet, logging};
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{Context, bail};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Ideal-network adversary for binary CBC Casper.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file (`.toml` or `.json`) describing the snapshot to attack.
    #[arg(long, conflicts_with = "random")]
    scenario: Option<PathBuf>,
    /// Attack a random network with this many equal-weight validators instead.
    #[arg(long)]
    random: Option<u64>,
    /// Seed for the random network.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of gossip rounds to run on the random network.
    #[arg(long, default_value_t = 3)]
    rounds: usize,
    /// Number of validators each bet is gossiped to per round.
    #[arg(long, default_value_t = 2)]
    fanout: usize,
    /// Victim estimate for the random network, defaults to the global majority.
    #[arg(long)]
    victim: Option<u64>,
    /// Write the outcome to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // enable fancy `color_eyre` error messages
    color_eyre::install()?;
    logging::enable_logforth();

    let args = Args::parse();
    let snapshot = match (&args.scenario, args.random) {
        (Some(path), _) => ScenarioFile::from_file(path)
            .wrap_err_with(|| format!("can not load scenario {}", path.display()))?
            .resolve()
            .context("invalid scenario")?,
        (None, Some(num_validators)) => random_snapshot(&args, num_validators)?,
        (None, None) => bail!("either --scenario or --random is required"),
    };

    let mut adversary = snapshot.into_adversary().context("invalid snapshot")?;
    let outcome = adversary.ideal_network_attack();
    for op in &outcome.operations_log {
        info!("{op}");
    }
    info!(
        "attack on {} {}: {} vs {}",
        adversary.victim_estimate(),
        if outcome.succeeded { "succeeded" } else { "failed" },
        outcome.weight_of_target_estimate,
        outcome.weight_of_victim_estimate,
    );

    let json = serde_json::to_string_pretty(&outcome)?;
    match args.output {
        Some(path) => fs::write(&path, json)
            .wrap_err_with(|| format!("can not write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn random_snapshot(args: &Args, num_validators: u64) -> Result<Snapshot> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut network = Network::new(ValidatorSet::with_equal_weights(num_validators));
    network.random_initialization(&mut rng);
    for _ in 0..args.rounds {
        network.random_round(&mut rng, args.fanout);
    }
    let victim = match args.victim {
        Some(v) => Estimate::try_from(v)?,
        None => {
            let global = network.global_view();
            global.estimate(network.validators(), Estimate::Zero)
        }
    };
    Ok(network.snapshot(victim))
}
