// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde_json::json;

use crate::commands::{overlay, print_report, warn_skipped, Ctx};
use crate::forms::InvestmentForm;
use crate::metrics::derive_investments;
use crate::models::Investment;
use crate::report::{investment_report, TotalsSource};
use crate::utils::maybe_print_json;

pub fn handle(ctx: &Ctx, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("update", sub)) => update(ctx, sub)?,
        Some(("delete", sub)) => delete(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn apply_args(sub: &ArgMatches, mut form: InvestmentForm) -> InvestmentForm {
    overlay(&mut form.name, sub, "name");
    overlay(&mut form.symbol, sub, "symbol");
    overlay(&mut form.r#type, sub, "type");
    overlay(&mut form.quantity, sub, "quantity");
    overlay(&mut form.purchase_price, sub, "purchase-price");
    overlay(&mut form.current_price, sub, "current-price");
    overlay(&mut form.purchase_date, sub, "purchase-date");
    form
}

fn add(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let inv = apply_args(sub, InvestmentForm::default()).parse()?;
    let saved = ctx.api.create(&inv)?;
    println!(
        "Added investment #{} {} ({}) x{}",
        saved.id.unwrap_or_default(),
        saved.name,
        saved.symbol,
        saved.quantity.normalize()
    );
    Ok(())
}

fn update(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    let stored: Investment = ctx.api.get(id)?;
    let mut inv = apply_args(sub, InvestmentForm::from(&stored)).parse()?;
    inv.id = Some(id);
    inv.last_updated = stored.last_updated;
    ctx.api.update(id, &inv)?;
    println!("Updated investment #{}", id);
    Ok(())
}

fn delete(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    ctx.api.delete::<Investment>(id)?;
    println!("Deleted investment #{}", id);
    Ok(())
}

fn list(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let investments: Vec<Investment> = ctx.api.list()?;
    let derived = derive_investments(&investments);
    warn_skipped(&derived.skipped);

    let payload = json!({ "investments": derived.views, "skipped": derived.skipped });
    if maybe_print_json(sub.get_flag("json"), &payload)? {
        return Ok(());
    }
    print_report(
        &investment_report(&derived.views, TotalsSource::Recomputed),
        &ctx.settings,
    );
    Ok(())
}
