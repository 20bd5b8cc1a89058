// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging setup for the binaries.
//!
//! The library itself only emits records through the [`log`] facade.

use logforth::color::LevelColor;
use logforth::filter::EnvFilter;
use logforth::{Layout, append};

/// Default filter, used if `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "casper_adversary=info,warn";

#[derive(Clone, Copy, Debug)]
struct MinimalLogforthLayout;

impl Layout for MinimalLogforthLayout {
    fn format(
        &self,
        record: &log::Record,
        _: &[Box<dyn logforth::Diagnostic>],
    ) -> anyhow::Result<Vec<u8>> {
        let colors = LevelColor::default();
        let level = colors.colorize_record_level(false, record.level());
        let message = record.args();
        Ok(format!("{level:>5} {message}").into_bytes())
    }
}

/// Logs to stderr with a minimal colored layout.
///
/// The filter is taken from `RUST_LOG`, falling back to library records at
/// info level and everything else at warn level.
pub fn enable_logforth() {
    let filter = EnvFilter::from_default_env_or(DEFAULT_FILTER);
    let stderr = append::Stderr::default().with_layout(MinimalLogforthLayout);
    logforth::builder()
        .dispatch(|d| d.filter(filter).append(stderr))
        .apply();
}
