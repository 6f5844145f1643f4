// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use clap::ArgMatches;

use crate::config::{config_path, Settings};

pub fn handle(settings: &Settings, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => print!("{}", settings.to_toml()?),
        Some(("path", _)) => println!("{}", config_path()?.display()),
        _ => {}
    }
    Ok(())
}
