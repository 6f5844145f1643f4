// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde_json::json;

use crate::commands::{as_of, overlay, print_report, warn_skipped, Ctx};
use crate::forms::SipForm;
use crate::metrics::{derive_sips, InstallmentBasis};
use crate::models::Sip;
use crate::report::{sip_report, TotalsSource};
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

pub fn apply_args(sub: &ArgMatches, mut form: SipForm) -> SipForm {
    overlay(&mut form.name, sub, "name");
    overlay(&mut form.scheme_code, sub, "scheme-code");
    overlay(&mut form.monthly_amount, sub, "monthly-amount");
    overlay(&mut form.start_date, sub, "start-date");
    overlay(&mut form.duration_months, sub, "duration");
    overlay(&mut form.current_nav, sub, "nav");
    overlay(&mut form.total_units, sub, "units");
    form
}

fn add(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let sip = apply_args(sub, SipForm::default()).parse()?;
    let saved = ctx.api.create(&sip)?;
    println!(
        "Added SIP #{} {} ({} months from {})",
        saved.id.unwrap_or_default(),
        saved.name,
        saved.duration_months,
        saved.start_date
    );
    Ok(())
}

fn update(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    let stored: Sip = ctx.api.get(id)?;
    let mut sip = apply_args(sub, SipForm::from(&stored)).parse()?;
    sip.id = Some(id);
    sip.last_updated = stored.last_updated;
    sip.last_investment_date = stored.last_investment_date;
    ctx.api.update(id, &sip)?;
    println!("Updated SIP #{}", id);
    Ok(())
}

fn delete(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    ctx.api.delete::<Sip>(id)?;
    println!("Deleted SIP #{}", id);
    Ok(())
}

fn list(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let basis = InstallmentBasis::AsOf(as_of(sub, ctx.today)?);
    let sips: Vec<Sip> = ctx.api.list()?;
    let derived = derive_sips(&sips, basis);
    warn_skipped(&derived.skipped);

    let payload = json!({ "sips": derived.views, "skipped": derived.skipped });
    if maybe_print_json(sub.get_flag("json"), &payload)? {
        return Ok(());
    }
    print_report(&sip_report(&derived.views, TotalsSource::Recomputed), &ctx.settings);
    Ok(())
}
