// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Local;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fintrack::api::ApiClient;
use fintrack::commands::{self, Ctx};
use fintrack::{cli, config::Settings};

fn init_tracing(verbose: bool) {
    let default = if verbose { "fintrack=debug" } else { "fintrack=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    init_tracing(matches.get_flag("verbose"));

    let settings = Settings::load(matches.get_one::<String>("api-url").map(String::as_str))?;
    debug!(api = %settings.api_base_url, "settings loaded");

    if let Some(("config", sub)) = matches.subcommand() {
        return commands::settings::handle(&settings, sub);
    }

    let ctx = Ctx {
        api: ApiClient::new(&settings)?,
        today: Local::now().date_naive(),
        settings,
    };

    match matches.subcommand() {
        Some(("expense", sub)) => commands::expenses::handle(&ctx, sub)?,
        Some(("investment", sub)) => commands::investments::handle(&ctx, sub)?,
        Some(("loan", sub)) => commands::loans::handle(&ctx, sub)?,
        Some(("sip", sub)) => commands::sips::handle(&ctx, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&ctx, sub)?,
        Some(("reconcile", sub)) => commands::reconcile::handle(&ctx, sub)?,
        Some(("export", sub)) => commands::export::handle(&ctx, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
