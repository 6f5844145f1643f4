// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use clap::ArgMatches;
use serde_json::json;
use tracing::info;

use crate::commands::dashboard::{build_local, month_range};
use crate::commands::{as_of, warn_skipped, Ctx};
use crate::format::fmt_money;
use crate::metrics::InstallmentBasis;
use crate::summary::{Dashboard, Reconcile, RECONCILE_TOLERANCE};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let range = month_range(sub, ctx)?;
    let basis = InstallmentBasis::AsOf(as_of(sub, ctx.today)?);

    let s = ctx.api.fetch_all_summaries(range)?;
    let server = Dashboard::assemble(s.expenses, s.investments, s.sips, s.loans);
    let (local, skipped) = build_local(ctx, range, basis)?;
    warn_skipped(&skipped);

    let diffs = local.reconcile(&server);
    info!(count = diffs.len(), "reconciled server summaries");

    let payload = json!({ "discrepancies": diffs, "skipped": skipped });
    if maybe_print_json(sub.get_flag("json"), &payload)? {
        return Ok(());
    }

    if diffs.is_empty() {
        println!(
            "Server and local figures agree within {}",
            RECONCILE_TOLERANCE
        );
        return Ok(());
    }
    let style = &ctx.settings.currency;
    let rows = diffs
        .iter()
        .map(|d| {
            vec![
                d.field.clone(),
                fmt_money(d.local, style),
                fmt_money(d.server, style),
                fmt_money(d.difference(), style),
                d.known_cause().map_or("", |_| "expected").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Field", "Local", "Server", "Difference", ""], rows)
    );
    let mut causes: Vec<&str> = diffs.iter().filter_map(|d| d.known_cause()).collect();
    causes.sort();
    causes.dedup();
    for cause in causes {
        println!("note: {}", cause);
    }
    Ok(())
}
