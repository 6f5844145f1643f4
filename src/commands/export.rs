// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::ArgMatches;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::api::ApiClient;
use crate::commands::{as_of, warn_skipped, Ctx};
use crate::format::CurrencyStyle;
use crate::metrics::{derive_investments, derive_loans, derive_sips, InstallmentBasis};
use crate::models::{DateRange, EntityKind, Investment, Loan, Sip};
use crate::report::{
    expense_report, investment_report, loan_report, report_file_stem, sip_report, Cell, Report,
    TotalsSource,
};
use crate::summary::valid_expenses;
use crate::utils::parse_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(anyhow!("Unknown format: {} (use csv|json)", other)),
        }
    }
}

pub fn handle(ctx: &Ctx, sub: &ArgMatches) -> Result<()> {
    let kind: EntityKind = sub
        .get_one::<String>("kind")
        .context("missing export kind")?
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let format: ExportFormat = sub
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("csv")
        .parse()?;
    let range = parse_range(sub.get_one::<String>("from"), sub.get_one::<String>("to"))?;
    let basis = InstallmentBasis::AsOf(as_of(sub, ctx.today)?);

    let report = fetch_report(&ctx.api, kind, range, basis, sub.get_flag("server-totals"))?;
    let out = match sub.get_one::<String>("out") {
        Some(p) => PathBuf::from(p),
        None => default_path(kind, ctx.today, range, format),
    };
    write_report(&report, &out, format, &ctx.settings.currency)?;
    info!(rows = report.rows.len(), path = %out.display(), "export written");
    println!("Exported {} to {}", kind.title(), out.display());
    Ok(())
}

pub fn default_path(
    kind: EntityKind,
    today: NaiveDate,
    range: DateRange,
    format: ExportFormat,
) -> PathBuf {
    PathBuf::from(format!(
        "{}.{}",
        report_file_stem(kind, today, range),
        format.extension()
    ))
}

/// Rows are fetched and derived locally; `server_totals` only swaps the
/// source of the totals row.
fn fetch_report(
    api: &ApiClient,
    kind: EntityKind,
    range: DateRange,
    basis: InstallmentBasis,
    server_totals: bool,
) -> Result<Report> {
    let report = match kind {
        EntityKind::Expenses => {
            let kept = valid_expenses(&api.expenses_in_range(range)?, range);
            warn_skipped(&kept.skipped);
            let totals = if server_totals {
                TotalsSource::Provided(api.expense_summary(range)?)
            } else {
                TotalsSource::Recomputed
            };
            expense_report(&kept.summary, totals)
        }
        EntityKind::Investments => {
            let derived = derive_investments(&api.list::<Investment>()?);
            warn_skipped(&derived.skipped);
            let totals = if server_totals {
                TotalsSource::Provided(api.summary::<Investment>()?)
            } else {
                TotalsSource::Recomputed
            };
            investment_report(&derived.views, totals)
        }
        EntityKind::Loans => {
            let derived = derive_loans(&api.list::<Loan>()?);
            warn_skipped(&derived.skipped);
            let totals = if server_totals {
                TotalsSource::Provided(api.summary::<Loan>()?)
            } else {
                TotalsSource::Recomputed
            };
            loan_report(&derived.views, totals)
        }
        EntityKind::Sips => {
            let derived = derive_sips(&api.list::<Sip>()?, basis);
            warn_skipped(&derived.skipped);
            let totals = if server_totals {
                TotalsSource::Provided(api.summary::<Sip>()?)
            } else {
                TotalsSource::Recomputed
            };
            sip_report(&derived.views, totals)
        }
    };
    Ok(report)
}

fn row_object(columns: &[&str], cells: &[Cell]) -> Result<Value> {
    let mut obj = Map::new();
    for (col, cell) in columns.iter().zip(cells) {
        obj.insert(col.to_string(), serde_json::to_value(cell)?);
    }
    Ok(Value::Object(obj))
}

/// CSV carries the formatted figures, header first and the totals row last.
/// JSON carries typed values with the totals kept apart from the rows.
pub fn write_report(
    report: &Report,
    path: &Path,
    format: ExportFormat,
    style: &CurrencyStyle,
) -> Result<()> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_path(path)
                .with_context(|| format!("Create {}", path.display()))?;
            wtr.write_record(report.columns)?;
            for row in report.render(style) {
                wtr.write_record(&row)?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => {
            let rows = report
                .rows
                .iter()
                .map(|r| row_object(report.columns, r))
                .collect::<Result<Vec<_>>>()?;
            let doc = json!({
                "kind": report.kind.path(),
                "columns": report.columns,
                "rows": rows,
                "totals": row_object(report.columns, &report.totals)?,
                "totalsSource": if report.totals_provided { "server" } else { "computed" },
            });
            std::fs::write(path, serde_json::to_string_pretty(&doc)?)
                .with_context(|| format!("Write {}", path.display()))?;
        }
    }
    Ok(())
}
