// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Collection totals, net worth and asset allocation.
//!
//! Every summary is a fresh fold over the records it is given. A record that
//! fails validation is left out of the totals and reported in
//! [`Aggregate::skipped`]; the remaining records are still summarised.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::MetricsError;
use crate::metrics::{self, InstallmentBasis, SkippedEntity};
use crate::models::{
    CategoryTotals, DateRange, Expense, ExpenseSummary, Investment, InvestmentSummary, Loan,
    LoanSummary, Percentage, Sip, SipSummary,
};

/// Tolerance used when comparing server and local totals.
pub const RECONCILE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate<S> {
    pub summary: S,
    pub skipped: Vec<SkippedEntity>,
}

impl<S> Aggregate<S> {
    fn clean(summary: S) -> Self {
        Aggregate {
            summary,
            skipped: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

fn validate_expense(e: &Expense) -> Result<(), MetricsError> {
    if e.amount.is_sign_negative() && !e.amount.is_zero() {
        return Err(MetricsError::invalid(
            "amount",
            format!("must not be negative, got {}", e.amount),
        ));
    }
    Ok(())
}

/// Expenses dated inside `range` that pass validation, in input order.
///
/// Every expense total is folded over this set, so listings, reports and
/// summaries agree on which rows count.
pub fn valid_expenses(expenses: &[Expense], range: DateRange) -> Aggregate<Vec<Expense>> {
    let mut kept = Vec::new();
    let mut skipped = Vec::new();
    for (index, e) in expenses.iter().enumerate() {
        if !range.contains(e.date) {
            continue;
        }
        match validate_expense(e) {
            Ok(()) => kept.push(e.clone()),
            Err(error) => skipped.push(SkippedEntity {
                index,
                label: e.description.clone(),
                error,
            }),
        }
    }
    Aggregate {
        summary: kept,
        skipped,
    }
}

/// Totals of expenses dated inside `range`, grouped by category in the order
/// categories first appear in `expenses`.
pub fn expense_summary(expenses: &[Expense], range: DateRange) -> Aggregate<ExpenseSummary> {
    let valid = valid_expenses(expenses, range);
    let mut total = Decimal::ZERO;
    let mut by_category = CategoryTotals::new();
    for e in &valid.summary {
        total += e.amount;
        by_category.add(&e.category, e.amount);
    }

    Aggregate {
        summary: ExpenseSummary {
            total_expenses: total,
            expenses_by_category: by_category,
        },
        skipped: valid.skipped,
    }
}

/// Spending in one calendar month, keyed `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub total: Decimal,
}

/// Expenses inside `range` bucketed by calendar month, oldest month first.
/// Months without any expense are left out.
pub fn monthly_totals(expenses: &[Expense], range: DateRange) -> Aggregate<Vec<MonthlyTotal>> {
    let valid = valid_expenses(expenses, range);
    let mut by_month: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in &valid.summary {
        *by_month.entry(e.date.format("%Y-%m").to_string()).or_default() += e.amount;
    }
    Aggregate {
        summary: by_month
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect(),
        skipped: valid.skipped,
    }
}

/// Mean spend over the months that have any expense, optionally for one
/// category (matched case-insensitively). Zero when there are no such months.
pub fn average_monthly(expenses: &[Expense], category: Option<&str>) -> Aggregate<Decimal> {
    let wanted = |e: &Expense| category.is_none_or(|c| e.category.eq_ignore_ascii_case(c.trim()));
    let valid = valid_expenses(expenses, DateRange::unbounded());
    let mut by_month: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in valid.summary.iter().filter(|&e| wanted(e)) {
        *by_month.entry(e.date.format("%Y-%m").to_string()).or_default() += e.amount;
    }
    let average = if by_month.is_empty() {
        Decimal::ZERO
    } else {
        by_month.values().sum::<Decimal>() / Decimal::from(by_month.len())
    };
    Aggregate {
        summary: average,
        skipped: valid
            .skipped
            .into_iter()
            .filter(|s| expenses.get(s.index).is_some_and(|e| wanted(e)))
            .collect(),
    }
}

pub fn investment_summary(investments: &[Investment]) -> Aggregate<InvestmentSummary> {
    let derived = metrics::derive_investments(investments);
    let summary = derived
        .views
        .iter()
        .fold(InvestmentSummary::default(), |mut acc, v| {
            acc.total_value += v.current_value;
            acc.total_profit_loss += v.profit_loss;
            acc
        });
    Aggregate {
        summary,
        skipped: derived.skipped,
    }
}

/// Sums the stored balances. Balances are authoritative and are never
/// rebuilt from an amortization schedule.
pub fn loan_summary(loans: &[Loan]) -> Aggregate<LoanSummary> {
    let mut total = Decimal::ZERO;
    let mut skipped = Vec::new();
    for (index, loan) in loans.iter().enumerate() {
        if loan.current_balance.is_sign_negative() && !loan.current_balance.is_zero() {
            skipped.push(SkippedEntity {
                index,
                label: loan.name.clone(),
                error: MetricsError::invalid(
                    "currentBalance",
                    format!("must not be negative, got {}", loan.current_balance),
                ),
            });
            continue;
        }
        total += loan.current_balance;
    }
    Aggregate {
        summary: LoanSummary {
            total_balance: total,
        },
        skipped,
    }
}

pub fn sip_summary(sips: &[Sip], basis: InstallmentBasis) -> Aggregate<SipSummary> {
    let derived = metrics::derive_sips(sips, basis);
    let summary = derived
        .views
        .iter()
        .fold(SipSummary::default(), |mut acc, v| {
            acc.total_investment += v.total_invested;
            acc.total_current_value += v.current_value;
            acc.total_profit_loss += v.profit_loss;
            acc
        });
    Aggregate {
        summary,
        skipped: derived.skipped,
    }
}

/// Assets minus liabilities. Negative net worth is a valid answer.
pub fn net_worth(inv: &InvestmentSummary, sip: &SipSummary, loans: &LoanSummary) -> Decimal {
    (inv.total_value + sip.total_current_value) - loans.total_balance
}

/// Overall return on the investment portfolio, as the dashboard shows it.
pub fn overall_return(inv: &InvestmentSummary) -> Percentage {
    Percentage::of(inv.total_profit_loss, inv.total_value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub label: &'static str,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetAllocation {
    pub slices: Vec<AllocationSlice>,
}

impl AssetAllocation {
    /// Slices with a positive value only, for pie charts.
    pub fn chart_ready(&self) -> Vec<AllocationSlice> {
        self.slices
            .iter()
            .filter(|s| s.value > Decimal::ZERO)
            .cloned()
            .collect()
    }

    pub fn total(&self) -> Decimal {
        self.slices.iter().map(|s| s.value).sum()
    }
}

pub fn asset_allocation(inv: &InvestmentSummary, sip: &SipSummary) -> AssetAllocation {
    AssetAllocation {
        slices: vec![
            AllocationSlice {
                label: "Investments",
                value: inv.total_value,
            },
            AllocationSlice {
                label: "SIPs",
                value: sip.total_current_value,
            },
        ],
    }
}

/// Everything the dashboard cards and charts render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub expenses: ExpenseSummary,
    pub investments: InvestmentSummary,
    pub sips: SipSummary,
    pub loans: LoanSummary,
    pub net_worth: Decimal,
    pub total_assets: Decimal,
    pub overall_return: Percentage,
    pub allocation: Vec<AllocationSlice>,
}

impl Dashboard {
    pub fn assemble(
        expenses: ExpenseSummary,
        investments: InvestmentSummary,
        sips: SipSummary,
        loans: LoanSummary,
    ) -> Self {
        let allocation = asset_allocation(&investments, &sips);
        Dashboard {
            net_worth: net_worth(&investments, &sips, &loans),
            total_assets: allocation.total(),
            overall_return: overall_return(&investments),
            allocation: allocation.chart_ready(),
            expenses,
            investments,
            sips,
            loans,
        }
    }
}

/// Dashboard recomputed from raw collections, with whatever was skipped.
pub fn local_dashboard(
    expenses: &[Expense],
    range: DateRange,
    investments: &[Investment],
    sips: &[Sip],
    loans: &[Loan],
    basis: InstallmentBasis,
) -> Aggregate<Dashboard> {
    let e = expense_summary(expenses, range);
    let i = investment_summary(investments);
    let s = sip_summary(sips, basis);
    let l = loan_summary(loans);

    let mut skipped = Vec::new();
    skipped.extend(e.skipped);
    skipped.extend(i.skipped);
    skipped.extend(s.skipped);
    skipped.extend(l.skipped);

    Aggregate {
        summary: Dashboard::assemble(e.summary, i.summary, s.summary, l.summary),
        skipped,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discrepancy {
    pub field: String,
    pub local: Decimal,
    pub server: Decimal,
}

impl Discrepancy {
    pub fn difference(&self) -> Decimal {
        self.local - self.server
    }

    /// Explanation for differences that follow from how the server counts,
    /// not from bad data.
    pub fn known_cause(&self) -> Option<&'static str> {
        match self.field.as_str() {
            "sips.totalInvestment" | "sips.totalProfitLoss" => Some(
                "the server counts the start month as an installment and counts up to \
                 lastInvestmentDate, one more than the whole months elapsed locally",
            ),
            _ => None,
        }
    }
}

fn compare(out: &mut Vec<Discrepancy>, field: &str, local: Decimal, server: Decimal) {
    if (local - server).abs() > RECONCILE_TOLERANCE {
        out.push(Discrepancy {
            field: field.to_string(),
            local,
            server,
        });
    }
}

/// Field-level differences between a local recomputation and a summary
/// reported by the server.
pub trait Reconcile {
    fn reconcile(&self, server: &Self) -> Vec<Discrepancy>;
}

impl Reconcile for ExpenseSummary {
    fn reconcile(&self, server: &Self) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        compare(&mut out, "totalExpenses", self.total_expenses, server.total_expenses);
        let local = self.expenses_by_category.to_sorted();
        let remote = server.expenses_by_category.to_sorted();
        let mut names: Vec<&String> = local.keys().chain(remote.keys()).collect();
        names.sort();
        names.dedup();
        for name in names {
            compare(
                &mut out,
                &format!("expensesByCategory.{}", name),
                local.get(name).copied().unwrap_or_default(),
                remote.get(name).copied().unwrap_or_default(),
            );
        }
        out
    }
}

impl Reconcile for InvestmentSummary {
    fn reconcile(&self, server: &Self) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        compare(&mut out, "investments.totalValue", self.total_value, server.total_value);
        compare(
            &mut out,
            "investments.totalProfitLoss",
            self.total_profit_loss,
            server.total_profit_loss,
        );
        out
    }
}

impl Reconcile for LoanSummary {
    fn reconcile(&self, server: &Self) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        compare(&mut out, "loans.totalBalance", self.total_balance, server.total_balance);
        out
    }
}

impl Reconcile for SipSummary {
    fn reconcile(&self, server: &Self) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        compare(
            &mut out,
            "sips.totalInvestment",
            self.total_investment,
            server.total_investment,
        );
        compare(
            &mut out,
            "sips.totalCurrentValue",
            self.total_current_value,
            server.total_current_value,
        );
        compare(
            &mut out,
            "sips.totalProfitLoss",
            self.total_profit_loss,
            server.total_profit_loss,
        );
        out
    }
}

impl Reconcile for Dashboard {
    fn reconcile(&self, server: &Self) -> Vec<Discrepancy> {
        let mut out = self.expenses.reconcile(&server.expenses);
        out.extend(self.investments.reconcile(&server.investments));
        out.extend(self.sips.reconcile(&server.sips));
        out.extend(self.loans.reconcile(&server.loans));
        out
    }
}

impl<S: Default> Default for Aggregate<S> {
    fn default() -> Self {
        Aggregate::clean(S::default())
    }
}
