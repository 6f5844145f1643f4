// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Tabular reports: one row per record plus a trailing totals row.
//!
//! The totals row is always summed from the rows built here. A summary
//! handed in as [`TotalsSource::Provided`] then overrides the columns it
//! covers; columns it does not cover keep the local sums.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::format::{fmt_money, fmt_percent, CurrencyStyle};
use crate::models::{
    DateRange, EntityKind, Expense, ExpenseSummary, InvestmentSummary, InvestmentView,
    LoanSummary, LoanView, Percentage, SipSummary, SipView,
};

pub const EXPENSE_COLUMNS: [&str; 5] = ["Date", "Description", "Category", "Payment Method", "Amount"];

pub const INVESTMENT_COLUMNS: [&str; 10] = [
    "Name",
    "Symbol",
    "Type",
    "Quantity",
    "Purchase Price",
    "Current Price",
    "Purchase Date",
    "Current Value",
    "Profit/Loss",
    "Return %",
];

pub const LOAN_COLUMNS: [&str; 10] = [
    "Name",
    "Principal",
    "Interest Rate",
    "Interest Type",
    "Start Date",
    "Tenure (Months)",
    "EMI",
    "Current Balance",
    "Remaining Months",
    "Total Interest",
];

pub const SIP_COLUMNS: [&str; 11] = [
    "Name",
    "Scheme Code",
    "Monthly Amount",
    "Start Date",
    "Duration (Months)",
    "Current NAV",
    "Total Units",
    "Total Invested",
    "Current Value",
    "Profit/Loss",
    "Return %",
];

const TOTAL_LABEL: &str = "TOTAL";

/// Where the totals row gets its figures from.
#[derive(Debug, Clone, PartialEq)]
pub enum TotalsSource<S> {
    /// A summary computed elsewhere (the server); authoritative where it
    /// has a figure.
    Provided(S),
    /// Sum the rows locally.
    Recomputed,
}

impl<S> TotalsSource<S> {
    pub fn is_provided(&self) -> bool {
        matches!(self, TotalsSource::Provided(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Money(Decimal),
    Percent(Percentage),
    Number(Decimal),
    Units(Decimal),
    Count(i64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    pub fn money(&self) -> Option<Decimal> {
        match self {
            Cell::Money(d) => Some(*d),
            _ => None,
        }
    }

    pub fn render(&self, style: &CurrencyStyle) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Money(d) => fmt_money(*d, style),
            Cell::Percent(p) => fmt_percent(p.value(), 2),
            Cell::Number(d) => d.normalize().to_string(),
            Cell::Units(d) => format!("{:.3}", d),
            Cell::Count(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// Machine-readable form: figures as JSON numbers, dates as ISO strings,
/// blanks as null.
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(t) => s.serialize_str(t),
            Cell::Money(d) | Cell::Number(d) | Cell::Units(d) => Serialize::serialize(d, s),
            Cell::Percent(p) => p.serialize(s),
            Cell::Count(n) => s.serialize_i64(*n),
            Cell::Date(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            Cell::Empty => s.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: EntityKind,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
    pub totals: Vec<Cell>,
    pub totals_provided: bool,
}

impl Report {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }

    pub fn total(&self, column: &str) -> Option<&Cell> {
        self.column(column).and_then(|i| self.totals.get(i))
    }

    /// Body rows followed by the totals row, as display strings.
    pub fn render(&self, style: &CurrencyStyle) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .chain(std::iter::once(&self.totals))
            .map(|row| row.iter().map(|c| c.render(style)).collect())
            .collect()
    }
}

/// Pass rows from [`crate::summary::valid_expenses`] so the totals row
/// matches the expense summary.
pub fn expense_report(expenses: &[Expense], source: TotalsSource<ExpenseSummary>) -> Report {
    let rows: Vec<Vec<Cell>> = expenses
        .iter()
        .map(|e| {
            vec![
                Cell::Date(e.date),
                Cell::Text(e.description.clone()),
                Cell::Text(e.category.clone()),
                Cell::Text(e.payment_method.clone()),
                Cell::Money(e.amount),
            ]
        })
        .collect();

    let mut total: Decimal = expenses.iter().map(|e| e.amount).sum();
    if let TotalsSource::Provided(s) = &source {
        total = s.total_expenses;
    }

    Report {
        kind: EntityKind::Expenses,
        columns: &EXPENSE_COLUMNS,
        rows,
        totals: vec![
            Cell::text(TOTAL_LABEL),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Money(total),
        ],
        totals_provided: source.is_provided(),
    }
}

pub fn investment_report(
    investments: &[InvestmentView],
    source: TotalsSource<InvestmentSummary>,
) -> Report {
    let rows: Vec<Vec<Cell>> = investments
        .iter()
        .map(|v| {
            let inv = &v.investment;
            vec![
                Cell::Text(inv.name.clone()),
                Cell::Text(inv.symbol.clone()),
                Cell::text(inv.r#type.as_str()),
                Cell::Number(inv.quantity),
                Cell::Money(inv.purchase_price),
                Cell::Money(inv.current_price),
                Cell::Date(inv.purchase_date),
                Cell::Money(v.current_value),
                Cell::Money(v.profit_loss),
                Cell::Percent(v.return_percentage),
            ]
        })
        .collect();

    let mut value: Decimal = investments.iter().map(|v| v.current_value).sum();
    let mut profit_loss: Decimal = investments.iter().map(|v| v.profit_loss).sum();
    if let TotalsSource::Provided(s) = &source {
        value = s.total_value;
        profit_loss = s.total_profit_loss;
    }

    Report {
        kind: EntityKind::Investments,
        columns: &INVESTMENT_COLUMNS,
        rows,
        totals: vec![
            Cell::text(TOTAL_LABEL),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Money(value),
            Cell::Money(profit_loss),
            Cell::Percent(Percentage::of(profit_loss, value - profit_loss)),
        ],
        totals_provided: source.is_provided(),
    }
}

pub fn loan_report(loans: &[LoanView], source: TotalsSource<LoanSummary>) -> Report {
    let rows: Vec<Vec<Cell>> = loans
        .iter()
        .map(|v| {
            let loan = &v.loan;
            vec![
                Cell::Text(loan.name.clone()),
                Cell::Money(loan.principal_amount),
                Cell::Percent(Percentage::Value(loan.interest_rate)),
                Cell::text(loan.interest_type.as_str()),
                Cell::Date(loan.start_date),
                Cell::Count(i64::from(loan.tenure_months)),
                Cell::Money(v.emi_amount),
                Cell::Money(loan.current_balance),
                Cell::Count(i64::from(v.remaining_months)),
                Cell::Money(v.total_interest),
            ]
        })
        .collect();

    let principal: Decimal = loans.iter().map(|v| v.loan.principal_amount).sum();
    let emi: Decimal = loans.iter().map(|v| v.emi_amount).sum();
    let interest: Decimal = loans.iter().map(|v| v.total_interest).sum();
    let mut balance: Decimal = loans.iter().map(|v| v.loan.current_balance).sum();
    if let TotalsSource::Provided(s) = &source {
        balance = s.total_balance;
    }

    Report {
        kind: EntityKind::Loans,
        columns: &LOAN_COLUMNS,
        rows,
        totals: vec![
            Cell::text(TOTAL_LABEL),
            Cell::Money(principal),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Money(emi),
            Cell::Money(balance),
            Cell::Empty,
            Cell::Money(interest),
        ],
        totals_provided: source.is_provided(),
    }
}

pub fn sip_report(sips: &[SipView], source: TotalsSource<SipSummary>) -> Report {
    let rows: Vec<Vec<Cell>> = sips
        .iter()
        .map(|v| {
            let sip = &v.sip;
            vec![
                Cell::Text(sip.name.clone()),
                Cell::Text(sip.scheme_code.clone()),
                Cell::Money(sip.monthly_amount),
                Cell::Date(sip.start_date),
                Cell::Count(i64::from(sip.duration_months)),
                Cell::Money(sip.current_nav),
                Cell::Units(sip.total_units),
                Cell::Money(v.total_invested),
                Cell::Money(v.current_value),
                Cell::Money(v.profit_loss),
                Cell::Percent(v.return_percentage),
            ]
        })
        .collect();

    let mut invested: Decimal = sips.iter().map(|v| v.total_invested).sum();
    let mut value: Decimal = sips.iter().map(|v| v.current_value).sum();
    let mut profit_loss: Decimal = sips.iter().map(|v| v.profit_loss).sum();
    if let TotalsSource::Provided(s) = &source {
        invested = s.total_investment;
        value = s.total_current_value;
        profit_loss = s.total_profit_loss;
    }

    Report {
        kind: EntityKind::Sips,
        columns: &SIP_COLUMNS,
        rows,
        totals: vec![
            Cell::text(TOTAL_LABEL),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Money(invested),
            Cell::Money(value),
            Cell::Money(profit_loss),
            Cell::Percent(Percentage::of(profit_loss, invested)),
        ],
        totals_provided: source.is_provided(),
    }
}

/// `expenses-report-20240301_20240101-20240131`; extension left to the writer.
pub fn report_file_stem(kind: EntityKind, exported_on: NaiveDate, range: DateRange) -> String {
    let mut stem = format!("{}-report-{}", kind.path(), exported_on.format("%Y%m%d"));
    if let (Some(start), Some(end)) = (range.start, range.end) {
        stem.push_str(&format!("_{}-{}", start.format("%Y%m%d"), end.format("%Y%m%d")));
    }
    stem
}
