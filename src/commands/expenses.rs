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
use crate::forms::ExpenseForm;
use crate::models::{DateRange, Expense};
use crate::report::{expense_report, TotalsSource};
use crate::summary::{average_monthly, expense_summary, monthly_totals, valid_expenses};
use crate::utils::{maybe_print_json, parse_month, parse_range, pretty_table};

pub fn handle(ctx: &Ctx, m: &ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("update", sub)) => update(ctx, sub)?,
        Some(("delete", sub)) => delete(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("monthly", sub)) => monthly(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

/// Flags given on the command line replace the matching form fields.
pub fn apply_args(sub: &ArgMatches, mut form: ExpenseForm) -> ExpenseForm {
    overlay(&mut form.description, sub, "description");
    overlay(&mut form.amount, sub, "amount");
    overlay(&mut form.date, sub, "date");
    overlay(&mut form.category, sub, "category");
    overlay(&mut form.payment_method, sub, "payment-method");
    form
}

/// `--month` wins; otherwise `--from`/`--to`, either of which may be open.
pub fn list_range(sub: &ArgMatches) -> Result<DateRange> {
    if let Some(month) = sub.get_one::<String>("month") {
        return Ok(DateRange::month_of(parse_month(month)?));
    }
    parse_range(sub.get_one::<String>("from"), sub.get_one::<String>("to"))
}

fn add(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let expense = apply_args(sub, ExpenseForm::default()).parse()?;
    let saved = ctx.api.create(&expense)?;
    println!(
        "Recorded expense #{} {} on {} ({})",
        saved.id.unwrap_or_default(),
        fmt_money(saved.amount, &ctx.settings.currency),
        saved.date,
        saved.category
    );
    Ok(())
}

fn update(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    let stored: Expense = ctx.api.get(id)?;
    let mut expense = apply_args(sub, ExpenseForm::from(&stored)).parse()?;
    expense.id = Some(id);
    ctx.api.update(id, &expense)?;
    println!("Updated expense #{}", id);
    Ok(())
}

fn delete(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    ctx.api.delete::<Expense>(id)?;
    println!("Deleted expense #{}", id);
    Ok(())
}

fn list(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let range = list_range(sub)?;
    let fetched = ctx.api.expenses_in_range(range)?;
    let kept = valid_expenses(&fetched, range);
    warn_skipped(&kept.skipped);
    let expenses = kept.summary;
    let summary = expense_summary(&expenses, range).summary;

    let payload = json!({ "expenses": expenses, "summary": summary });
    if maybe_print_json(sub.get_flag("json"), &payload)? {
        return Ok(());
    }

    print_report(&expense_report(&expenses, TotalsSource::Recomputed), &ctx.settings);
    if !summary.expenses_by_category.is_empty() {
        let rows = summary
            .expenses_by_category
            .iter()
            .map(|(cat, amt)| vec![cat.to_string(), fmt_money(amt, &ctx.settings.currency)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }
    Ok(())
}

/// Month buckets within `--from`/`--to`, optionally for one category.
fn monthly(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let range = parse_range(sub.get_one::<String>("from"), sub.get_one::<String>("to"))?;
    let category = sub.get_one::<String>("category").map(String::as_str);
    let fetched = match category {
        Some(c) => ctx.api.expenses_by_category(c)?,
        None => ctx.api.expenses_in_range(range)?,
    };
    let months = monthly_totals(&fetched, range);
    warn_skipped(&months.skipped);

    let average = if sub.get_flag("server-average") {
        ctx.api.average_monthly(category)?
    } else {
        let in_range: Vec<Expense> = fetched
            .into_iter()
            .filter(|e| range.contains(e.date))
            .collect();
        average_monthly(&in_range, category).summary
    };

    let payload = json!({ "months": months.summary, "averageMonthly": average });
    if maybe_print_json(sub.get_flag("json"), &payload)? {
        return Ok(());
    }

    let style = &ctx.settings.currency;
    let mut rows: Vec<Vec<String>> = months
        .summary
        .iter()
        .map(|m| vec![m.month.clone(), fmt_money(m.total, style)])
        .collect();
    rows.push(vec!["AVERAGE".to_string(), fmt_money(average, style)]);
    println!("{}", pretty_table(&["Month", "Spent"], rows));
    Ok(())
}
