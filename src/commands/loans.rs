// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde_json::json;

use crate::commands::{overlay, print_report, warn_skipped, Ctx};
use crate::format::fmt_money;
use crate::forms::LoanForm;
use crate::metrics::{derive_loan, derive_loans};
use crate::models::Loan;
use crate::report::{loan_report, TotalsSource};
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

pub fn apply_args(sub: &ArgMatches, mut form: LoanForm) -> LoanForm {
    overlay(&mut form.name, sub, "name");
    overlay(&mut form.principal_amount, sub, "principal");
    overlay(&mut form.interest_rate, sub, "rate");
    overlay(&mut form.interest_type, sub, "interest-type");
    overlay(&mut form.compounding_frequency, sub, "frequency");
    overlay(&mut form.start_date, sub, "start-date");
    overlay(&mut form.tenure_months, sub, "tenure");
    overlay(&mut form.current_balance, sub, "balance");
    form
}

fn add(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let loan = apply_args(sub, LoanForm::default()).parse()?;
    // Reject loans whose schedule cannot be computed before they reach the server.
    let view = derive_loan(&loan)?;
    let saved = ctx.api.create(&loan)?;
    println!(
        "Added loan #{} {}: EMI {} for {} months, ends {}",
        saved.id.unwrap_or_default(),
        saved.name,
        fmt_money(view.emi_amount, &ctx.settings.currency),
        saved.tenure_months,
        view.end_date
    );
    Ok(())
}

fn update(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    let stored: Loan = ctx.api.get(id)?;
    let mut loan = apply_args(sub, LoanForm::from(&stored)).parse()?;
    loan.id = Some(id);
    loan.last_updated = stored.last_updated;
    derive_loan(&loan)?;
    ctx.api.update(id, &loan)?;
    println!("Updated loan #{}", id);
    Ok(())
}

fn delete(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    ctx.api.delete::<Loan>(id)?;
    println!("Deleted loan #{}", id);
    Ok(())
}

fn list(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let loans: Vec<Loan> = ctx.api.list()?;
    let derived = derive_loans(&loans);
    warn_skipped(&derived.skipped);

    let payload = json!({ "loans": derived.views, "skipped": derived.skipped });
    if maybe_print_json(sub.get_flag("json"), &payload)? {
        return Ok(());
    }
    print_report(&loan_report(&derived.views, TotalsSource::Recomputed), &ctx.settings);
    Ok(())
}
