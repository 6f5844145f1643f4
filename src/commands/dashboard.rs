// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use clap::ArgMatches;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use crate::commands::{as_of, warn_skipped, Ctx};
use crate::format::{fmt_compact, fmt_money, fmt_percent, CurrencyStyle};
use crate::metrics::{InstallmentBasis, SkippedEntity};
use crate::models::{DateRange, Percentage};
use crate::summary::{local_dashboard, Dashboard};
use crate::utils::{maybe_print_json, parse_month, pretty_table};

pub fn handle(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let range = month_range(sub, ctx)?;
    let basis = InstallmentBasis::AsOf(as_of(sub, ctx.today)?);
    let (dashboard, skipped) = if sub.get_flag("local") {
        info!("recomputing dashboard from raw records");
        build_local(ctx, range, basis)?
    } else {
        let s = ctx.api.fetch_all_summaries(range)?;
        (
            Dashboard::assemble(s.expenses, s.investments, s.sips, s.loans),
            Vec::new(),
        )
    };
    warn_skipped(&skipped);

    let payload = json!({ "dashboard": dashboard, "skipped": skipped });
    if maybe_print_json(sub.get_flag("json"), &payload)? {
        return Ok(());
    }
    print_dashboard(&dashboard, range, &ctx.settings.currency);
    Ok(())
}

/// Month named by `--month`, else the current one.
pub(crate) fn month_range(sub: &ArgMatches, ctx: &Ctx) -> Result<DateRange> {
    let day = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => ctx.today,
    };
    Ok(DateRange::month_of(day))
}

pub(crate) fn build_local(
    ctx: &Ctx,
    range: DateRange,
    basis: InstallmentBasis,
) -> Result<(Dashboard, Vec<SkippedEntity>)> {
    let c = ctx.api.fetch_all_collections()?;
    let agg = local_dashboard(&c.expenses, range, &c.investments, &c.sips, &c.loans, basis);
    Ok((agg.summary, agg.skipped))
}

fn print_dashboard(d: &Dashboard, range: DateRange, style: &CurrencyStyle) {
    let month = range
        .start
        .map(|s| s.format("%B %Y").to_string())
        .unwrap_or_default();
    let ret = match d.overall_return {
        Percentage::Undefined => "n/a".to_string(),
        p => fmt_percent(p.value(), 2),
    };
    let cards = vec![
        vec!["Net Worth".to_string(), fmt_money(d.net_worth, style)],
        vec!["Total Assets".to_string(), fmt_money(d.total_assets, style)],
        vec!["Overall Return".to_string(), ret],
        vec!["Loan Balance".to_string(), fmt_money(d.loans.total_balance, style)],
        vec![
            format!("Expenses ({})", month),
            fmt_money(d.expenses.total_expenses, style),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], cards));

    if !d.expenses.expenses_by_category.is_empty() {
        let largest = d
            .expenses
            .expenses_by_category
            .iter()
            .map(|(_, amt)| amt)
            .max()
            .unwrap_or_default();
        let rows = d
            .expenses
            .expenses_by_category
            .iter()
            .map(|(cat, amt)| {
                vec![
                    cat.to_string(),
                    fmt_money(amt, style),
                    format!("{} {}", bar(amt, largest), fmt_compact(amt, 1)),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", ""], rows));
    }

    if !d.allocation.is_empty() {
        let rows = d
            .allocation
            .iter()
            .map(|s| {
                vec![
                    s.label.to_string(),
                    fmt_money(s.value, style),
                    fmt_percent(Percentage::of(s.value, d.total_assets).value(), 1),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Asset", "Value", "Share"], rows));
    }
}

const BAR_WIDTH: u32 = 20;

/// Horizontal bar scaled against the largest category.
fn bar(value: Decimal, largest: Decimal) -> String {
    let width = match Percentage::of(value, largest) {
        Percentage::Value(p) => (p * Decimal::from(BAR_WIDTH) / Decimal::ONE_HUNDRED)
            .round()
            .to_usize()
            .unwrap_or(0),
        Percentage::Undefined => 0,
    };
    "█".repeat(width)
}
