// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-record derived figures: current value and P/L for investments,
//! EMI and tenure for loans, installments and value for SIPs.
//!
//! Every function here is a pure function of the stored fields it is handed.
//! Nothing reads the clock; SIP valuation takes its as-of date explicitly.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;

use crate::error::MetricsError;
use crate::models::{
    CompoundingFrequency, InterestType, Investment, InvestmentView, Loan, LoanView, Percentage,
    Sip, SipView,
};

/// Scale that loan totals are rounded to, so that sub-cent division residue
/// of a full-precision EMI never reads as negative interest.
const TOTALS_DP: u32 = 10;

/// Which date SIP installments are counted up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentBasis {
    /// Whole months elapsed from the start date up to this date.
    AsOf(NaiveDate),
    /// Count unknown: assume the full scheduled duration.
    FullTerm,
}

/// A record that could not be derived, with its position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntity {
    pub index: usize,
    pub label: String,
    #[serde(serialize_with = "error_text")]
    pub error: MetricsError,
}

fn error_text<S: serde::Serializer>(e: &MetricsError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&e.to_string())
}

/// Derived views of a batch plus the records that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived<T> {
    pub views: Vec<T>,
    pub skipped: Vec<SkippedEntity>,
}

fn derive_batch<E, T>(
    items: &[E],
    label: impl Fn(&E) -> &str,
    derive: impl Fn(&E) -> Result<T, MetricsError>,
) -> Derived<T> {
    let mut views = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match derive(item) {
            Ok(view) => views.push(view),
            Err(error) => skipped.push(SkippedEntity {
                index,
                label: label(item).to_string(),
                error,
            }),
        }
    }
    Derived { views, skipped }
}

fn mul(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, MetricsError> {
    a.checked_mul(b)
        .ok_or_else(|| MetricsError::invalid(field, "value out of range"))
}

fn div(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, MetricsError> {
    a.checked_div(b)
        .ok_or_else(|| MetricsError::invalid(field, "value out of range"))
}

fn add(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, MetricsError> {
    a.checked_add(b)
        .ok_or_else(|| MetricsError::invalid(field, "value out of range"))
}

fn percent(field: &'static str, gain: Decimal, base: Decimal) -> Result<Percentage, MetricsError> {
    Percentage::checked_of(gain, base)
        .ok_or_else(|| MetricsError::invalid(field, "return out of range"))
}

fn non_negative(field: &'static str, v: Decimal) -> Result<(), MetricsError> {
    if v.is_sign_negative() && !v.is_zero() {
        return Err(MetricsError::invalid(field, format!("must not be negative, got {}", v)));
    }
    Ok(())
}

fn positive(field: &'static str, v: Decimal) -> Result<(), MetricsError> {
    if v <= Decimal::ZERO {
        return Err(MetricsError::invalid(field, format!("must be greater than zero, got {}", v)));
    }
    Ok(())
}

pub fn derive_investment(inv: &Investment) -> Result<InvestmentView, MetricsError> {
    non_negative("quantity", inv.quantity)?;
    non_negative("purchasePrice", inv.purchase_price)?;
    non_negative("currentPrice", inv.current_price)?;

    let cost_basis = mul("purchasePrice", inv.quantity, inv.purchase_price)?;
    let current_value = mul("currentPrice", inv.quantity, inv.current_price)?;
    let profit_loss = current_value - cost_basis;

    Ok(InvestmentView {
        investment: inv.clone(),
        cost_basis,
        current_value,
        profit_loss,
        return_percentage: percent("purchasePrice", profit_loss, cost_basis)?,
    })
}

pub fn derive_investments(items: &[Investment]) -> Derived<InvestmentView> {
    derive_batch(items, |i| i.name.as_str(), derive_investment)
}

/// Monthly rate equivalent to `annual_pct` compounded `freq` times a year.
///
/// EMIs are paid monthly whatever the compounding, so quarterly and yearly
/// compounding are converted to the monthly rate with the same effective
/// annual yield: `(1 + i/k)^(k/12) - 1`.
pub fn monthly_rate(annual_pct: Decimal, freq: CompoundingFrequency) -> Result<Decimal, MetricsError> {
    let annual = annual_pct / Decimal::ONE_HUNDRED;
    let k = Decimal::from(freq.periods_per_year());
    if freq == CompoundingFrequency::Monthly {
        return Ok(annual / k);
    }
    let per_period = Decimal::ONE + annual / k;
    let exponent = k / Decimal::from(12);
    per_period
        .checked_powd(exponent)
        .map(|growth| growth - Decimal::ONE)
        .ok_or_else(|| MetricsError::invalid("interestRate", "rate out of range"))
}

/// Level payment that amortizes `principal` over `periods` at rate `r`.
pub fn amortized_payment(principal: Decimal, r: Decimal, periods: u32) -> Result<Decimal, MetricsError> {
    let n = Decimal::from(periods);
    if r.is_zero() {
        return div("tenureMonths", principal, n);
    }
    let factor = (Decimal::ONE + r)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| MetricsError::invalid("tenureMonths", "rate and tenure out of range"))?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return div("tenureMonths", principal, n);
    }
    let numerator = mul("principalAmount", mul("interestRate", principal, r)?, factor)?;
    div("tenureMonths", numerator, denominator)
}

fn validate_loan(loan: &Loan) -> Result<u32, MetricsError> {
    positive("principalAmount", loan.principal_amount)?;
    non_negative("interestRate", loan.interest_rate)?;
    non_negative("currentBalance", loan.current_balance)?;
    if loan.tenure_months <= 0 {
        return Err(MetricsError::invalid(
            "tenureMonths",
            format!("must be greater than zero, got {}", loan.tenure_months),
        ));
    }
    if loan.interest_type == InterestType::Compound && loan.compounding_frequency.is_none() {
        return Err(MetricsError::invalid(
            "compoundingFrequency",
            "required for compound interest",
        ));
    }
    Ok(loan.tenure_months as u32)
}

pub fn emi_amount(loan: &Loan) -> Result<Decimal, MetricsError> {
    let tenure = validate_loan(loan)?;
    let months = Decimal::from(tenure);
    let principal = loan.principal_amount;
    match (loan.interest_type, loan.compounding_frequency) {
        (InterestType::Simple, _) => {
            let years = months / Decimal::from(12);
            let rate = loan.interest_rate / Decimal::ONE_HUNDRED;
            let interest = mul("interestRate", mul("principalAmount", principal, rate)?, years)?;
            div("tenureMonths", add("principalAmount", principal, interest)?, months)
        }
        (InterestType::Compound, Some(freq)) => {
            let r = monthly_rate(loan.interest_rate, freq)?;
            amortized_payment(principal, r, tenure)
        }
        (InterestType::Compound, None) => Err(MetricsError::invalid(
            "compoundingFrequency",
            "required for compound interest",
        )),
    }
}

/// `ceil(balance / emi)` clamped to `[0, tenure]`; zero without a positive EMI.
pub fn remaining_months(balance: Decimal, emi: Decimal, tenure: u32) -> u32 {
    if emi <= Decimal::ZERO || balance <= Decimal::ZERO {
        return 0;
    }
    match balance.checked_div(emi) {
        Some(months) => months.ceil().to_u32().map_or(tenure, |m| m.min(tenure)),
        None => tenure,
    }
}

pub fn derive_loan(loan: &Loan) -> Result<LoanView, MetricsError> {
    let tenure = validate_loan(loan)?;
    let emi = emi_amount(loan)?;

    let end_date = loan
        .start_date
        .checked_add_months(Months::new(tenure))
        .ok_or_else(|| MetricsError::invalid("tenureMonths", "end date out of range"))?;

    let total_repayment = mul("emiAmount", emi, Decimal::from(tenure))?.round_dp(TOTALS_DP);
    if total_repayment.is_sign_negative() && !total_repayment.is_zero() {
        return Err(MetricsError::InconsistentState {
            field: "totalRepayment",
            value: total_repayment,
        });
    }
    let total_interest = total_repayment - loan.principal_amount;
    if total_interest.is_sign_negative() && !total_interest.is_zero() {
        return Err(MetricsError::InconsistentState {
            field: "totalInterest",
            value: total_interest,
        });
    }

    Ok(LoanView {
        loan: loan.clone(),
        emi_amount: emi,
        end_date,
        remaining_months: remaining_months(loan.current_balance, emi, tenure),
        total_repayment,
        total_interest,
    })
}

pub fn derive_loans(items: &[Loan]) -> Derived<LoanView> {
    derive_batch(items, |l| l.name.as_str(), derive_loan)
}

/// Whole calendar months from `from` to `to`; negative when `to` is earlier.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut months = i64::from(to.year() - from.year()) * 12
        + i64::from(to.month()) - i64::from(from.month());
    if to >= from {
        if to.day() < from.day() {
            months -= 1;
        }
    } else if to.day() > from.day() {
        months += 1;
    }
    months
}

pub fn completed_installments(sip: &Sip, basis: InstallmentBasis) -> u32 {
    let duration = sip.duration_months.max(0) as u32;
    match basis {
        InstallmentBasis::FullTerm => duration,
        InstallmentBasis::AsOf(as_of) => {
            let elapsed = whole_months_between(sip.start_date, as_of);
            elapsed.clamp(0, i64::from(duration)) as u32
        }
    }
}

pub fn derive_sip(sip: &Sip, basis: InstallmentBasis) -> Result<SipView, MetricsError> {
    positive("monthlyAmount", sip.monthly_amount)?;
    non_negative("currentNav", sip.current_nav)?;
    non_negative("totalUnits", sip.total_units)?;
    if sip.duration_months <= 0 {
        return Err(MetricsError::invalid(
            "durationMonths",
            format!("must be greater than zero, got {}", sip.duration_months),
        ));
    }

    let installments = completed_installments(sip, basis);
    let total_invested = mul("monthlyAmount", sip.monthly_amount, Decimal::from(installments))?;
    let current_value = mul("currentNav", sip.total_units, sip.current_nav)?;
    let profit_loss = current_value - total_invested;

    Ok(SipView {
        sip: sip.clone(),
        completed_installments: installments,
        total_invested,
        current_value,
        profit_loss,
        return_percentage: percent("monthlyAmount", profit_loss, total_invested)?,
    })
}

pub fn derive_sips(items: &[Sip], basis: InstallmentBasis) -> Derived<SipView> {
    derive_batch(items, |s| s.name.as_str(), |s| derive_sip(s, basis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvestmentType;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn investment(qty: Decimal, buy: Decimal, now: Decimal) -> Investment {
        Investment {
            id: None,
            name: "Acme".into(),
            symbol: "ACME".into(),
            r#type: InvestmentType::Stock,
            quantity: qty,
            purchase_price: buy,
            current_price: now,
            purchase_date: day(2023, 4, 1),
            last_updated: None,
        }
    }

    fn loan(principal: Decimal, rate: Decimal, kind: InterestType, tenure: i32) -> Loan {
        Loan {
            id: None,
            name: "Home".into(),
            principal_amount: principal,
            interest_rate: rate,
            interest_type: kind,
            compounding_frequency: match kind {
                InterestType::Simple => None,
                InterestType::Compound => Some(CompoundingFrequency::Monthly),
            },
            start_date: day(2024, 1, 15),
            tenure_months: tenure,
            current_balance: principal,
            last_updated: None,
        }
    }

    fn sip(start: NaiveDate, duration: i32) -> Sip {
        Sip {
            id: None,
            name: "Index Fund".into(),
            scheme_code: "120716".into(),
            monthly_amount: dec!(5000),
            start_date: start,
            duration_months: duration,
            current_nav: dec!(42.5),
            total_units: dec!(300),
            last_updated: None,
            last_investment_date: None,
        }
    }

    #[test]
    fn investment_gain_and_return() {
        let v = derive_investment(&investment(dec!(10), dec!(100), dec!(150))).unwrap();
        assert_eq!(v.current_value, dec!(1500));
        assert_eq!(v.profit_loss, dec!(500));
        assert_eq!(v.return_percentage, Percentage::Value(dec!(50)));
    }

    #[test]
    fn investment_with_free_purchase_has_undefined_return() {
        let v = derive_investment(&investment(dec!(4), dec!(0), dec!(25))).unwrap();
        assert_eq!(v.profit_loss, dec!(100));
        assert!(v.return_percentage.is_undefined());
        assert_eq!(v.return_percentage.value(), Decimal::ZERO);
    }

    #[test]
    fn investment_rejects_negative_inputs() {
        let err = derive_investment(&investment(dec!(-1), dec!(10), dec!(10))).unwrap_err();
        assert!(err.is_invalid_input());
        let err = derive_investment(&investment(dec!(1), dec!(10), dec!(-0.5))).unwrap_err();
        assert_eq!(
            err,
            MetricsError::invalid("currentPrice", "must not be negative, got -0.5")
        );
    }

    #[test]
    fn simple_loan_figures() {
        let v = derive_loan(&loan(dec!(120000), dec!(12), InterestType::Simple, 12)).unwrap();
        assert_eq!(v.total_interest, dec!(14400));
        assert_eq!(v.emi_amount, dec!(11200));
        assert_eq!(v.total_repayment, dec!(134400));
        assert_eq!(v.end_date, day(2025, 1, 15));
        assert_eq!(v.remaining_months, 11);
    }

    #[test]
    fn zero_rate_loan_splits_principal_evenly() {
        let mut l = loan(dec!(100), dec!(0), InterestType::Compound, 3);
        l.current_balance = dec!(40);
        let v = derive_loan(&l).unwrap();
        assert_eq!(v.total_interest, Decimal::ZERO);
        assert_eq!(v.total_repayment, dec!(100));
        assert_eq!(v.remaining_months, 2);
    }

    #[test]
    fn compound_monthly_emi_matches_reference() {
        // 10 lakh at 9% for 20 years, the textbook figure is 8997.26
        let v = derive_loan(&loan(dec!(1000000), dec!(9), InterestType::Compound, 240)).unwrap();
        assert_eq!(v.emi_amount.round_dp(2), dec!(8997.26));
        assert!(v.total_interest > Decimal::ZERO);
    }

    #[test]
    fn quarterly_compounding_is_cheaper_than_monthly() {
        let monthly = loan(dec!(500000), dec!(10), InterestType::Compound, 60);
        let mut quarterly = monthly.clone();
        quarterly.compounding_frequency = Some(CompoundingFrequency::Quarterly);
        let m = emi_amount(&monthly).unwrap();
        let q = emi_amount(&quarterly).unwrap();
        assert!(q < m);
    }

    #[test]
    fn compound_loan_requires_frequency() {
        let mut l = loan(dec!(1000), dec!(5), InterestType::Compound, 12);
        l.compounding_frequency = None;
        let err = derive_loan(&l).unwrap_err();
        assert!(matches!(
            err,
            MetricsError::InvalidInput { field: "compoundingFrequency", .. }
        ));
    }

    #[test]
    fn loan_rejects_non_positive_tenure() {
        let err = derive_loan(&loan(dec!(1000), dec!(5), InterestType::Simple, 0)).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidInput { field: "tenureMonths", .. }));
    }

    #[test]
    fn remaining_months_clamps_to_tenure() {
        assert_eq!(remaining_months(dec!(5000), dec!(100), 12), 12);
        assert_eq!(remaining_months(dec!(250), dec!(100), 12), 3);
        assert_eq!(remaining_months(dec!(250), Decimal::ZERO, 12), 0);
        assert_eq!(remaining_months(Decimal::ZERO, dec!(100), 12), 0);
    }

    #[test]
    fn month_counting_respects_day_of_month() {
        assert_eq!(whole_months_between(day(2024, 1, 31), day(2024, 2, 29)), 0);
        assert_eq!(whole_months_between(day(2024, 1, 15), day(2024, 3, 15)), 2);
        assert_eq!(whole_months_between(day(2024, 1, 15), day(2024, 3, 14)), 1);
        assert_eq!(whole_months_between(day(2024, 5, 10), day(2024, 3, 20)), -1);
    }

    #[test]
    fn sip_counts_installments_up_to_as_of() {
        let s = sip(day(2024, 1, 10), 24);
        let v = derive_sip(&s, InstallmentBasis::AsOf(day(2024, 7, 10))).unwrap();
        assert_eq!(v.completed_installments, 6);
        assert_eq!(v.total_invested, dec!(30000));
        assert_eq!(v.current_value, dec!(12750));
        assert_eq!(v.profit_loss, dec!(-17250));
    }

    #[test]
    fn sip_installments_clamp_to_schedule() {
        let s = sip(day(2020, 1, 1), 12);
        assert_eq!(completed_installments(&s, InstallmentBasis::AsOf(day(2024, 1, 1))), 12);
        assert_eq!(completed_installments(&s, InstallmentBasis::AsOf(day(2019, 6, 1))), 0);
        assert_eq!(completed_installments(&s, InstallmentBasis::FullTerm), 12);
    }

    #[test]
    fn sip_before_first_month_has_undefined_return() {
        let s = sip(day(2024, 6, 1), 12);
        let v = derive_sip(&s, InstallmentBasis::AsOf(day(2024, 6, 20))).unwrap();
        assert_eq!(v.total_invested, Decimal::ZERO);
        assert!(v.return_percentage.is_undefined());
    }

    #[test]
    fn batch_derivation_skips_bad_records() {
        let good = investment(dec!(1), dec!(10), dec!(12));
        let mut bad = investment(dec!(1), dec!(-10), dec!(12));
        bad.name = "Broken".into();
        let d = derive_investments(&[good, bad]);
        assert_eq!(d.views.len(), 1);
        assert_eq!(d.skipped.len(), 1);
        assert_eq!(d.skipped[0].index, 1);
        assert_eq!(d.skipped[0].label, "Broken");
    }

    #[test]
    fn extreme_investment_prices_are_invalid_not_a_panic() {
        let inv = investment(dec!(1), dec!(0.00000001), dec!(100000000000000000000));
        let err = derive_investment(&inv).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn simple_loan_interest_overflow_is_invalid() {
        let l = loan(
            dec!(100000000000000000000000000),
            dec!(1000),
            InterestType::Simple,
            1200,
        );
        let err = derive_loan(&l).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn remaining_months_with_tiny_emi_is_full_tenure() {
        let mut l = loan(dec!(0.0000000001), dec!(0), InterestType::Simple, 1);
        l.current_balance = dec!(100000000000000000000);
        let v = derive_loan(&l).unwrap();
        assert_eq!(v.remaining_months, 1);
        assert_eq!(
            remaining_months(dec!(79000000000000000000000000000), dec!(0.0000000001), 360),
            360
        );
    }
}

