// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod dashboard;
pub mod expenses;
pub mod export;
pub mod investments;
pub mod loans;
pub mod reconcile;
pub mod settings;
pub mod sips;

use anyhow::Result;
use chrono::NaiveDate;
use clap::ArgMatches;
use tracing::warn;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::metrics::SkippedEntity;
use crate::report::Report;
use crate::utils::{parse_date, pretty_table};

/// What every command runs against. `today` is read once, at startup.
pub struct Ctx {
    pub api: ApiClient,
    pub settings: Settings,
    pub today: NaiveDate,
}

/// `--as-of` if given, otherwise today.
pub fn as_of(sub: &ArgMatches, today: NaiveDate) -> Result<NaiveDate> {
    match sub.get_one::<String>("as-of") {
        Some(raw) => parse_date(raw),
        None => Ok(today),
    }
}

/// Overwrite `target` with the flag's value when the flag was given.
pub fn overlay(target: &mut String, sub: &ArgMatches, flag: &str) {
    if let Some(v) = sub.get_one::<String>(flag) {
        *target = v.clone();
    }
}

pub fn warn_skipped(skipped: &[SkippedEntity]) {
    for s in skipped {
        warn!(index = s.index, label = %s.label, "skipped: {}", s.error);
    }
}

pub fn print_report(report: &Report, settings: &Settings) {
    println!(
        "{}",
        pretty_table(report.columns, report.render(&settings.currency))
    );
}
