// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Raw string input to typed records.
//!
//! Each form collects every field problem before giving up, so a caller can
//! show all of them at once.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationErrors;
use crate::models::{
    CompoundingFrequency, EXPENSE_CATEGORIES, Expense, InterestType, Investment, InvestmentType,
    Loan, PAYMENT_METHODS, Sip,
};

#[derive(Clone, Copy)]
enum Bound {
    Positive,
    NonNegative,
}

fn required(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> Option<String> {
    let v = raw.trim();
    if v.is_empty() {
        errors.push(field, "is required");
        return None;
    }
    Some(v.to_string())
}

fn decimal(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    bound: Bound,
) -> Option<Decimal> {
    let v = required(errors, field, raw)?;
    let parsed = match Decimal::from_str(&v) {
        Ok(d) => d,
        Err(_) => {
            errors.push(field, format!("'{}' is not a number", v));
            return None;
        }
    };
    match bound {
        Bound::Positive if parsed <= Decimal::ZERO => {
            errors.push(field, "must be greater than zero");
            None
        }
        Bound::NonNegative if parsed < Decimal::ZERO => {
            errors.push(field, "must not be negative");
            None
        }
        _ => Some(parsed),
    }
}

fn date(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> Option<NaiveDate> {
    let v = required(errors, field, raw)?;
    match NaiveDate::parse_from_str(&v, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push(field, format!("'{}' is not a date, expected YYYY-MM-DD", v));
            None
        }
    }
}

fn months(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> Option<i32> {
    let v = required(errors, field, raw)?;
    match v.parse::<i32>() {
        Ok(n) if n > 0 => Some(n),
        Ok(_) => {
            errors.push(field, "must be at least one month");
            None
        }
        Err(_) => {
            errors.push(field, format!("'{}' is not a whole number of months", v));
            None
        }
    }
}

fn choice<T: FromStr<Err = String>>(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
) -> Option<T> {
    let v = required(errors, field, raw)?;
    match v.parse::<T>() {
        Ok(t) => Some(t),
        Err(msg) => {
            errors.push(field, msg);
            None
        }
    }
}

/// Known spellings win regardless of case; anything else is kept verbatim.
fn canonical(value: String, known: &[&str]) -> String {
    known
        .iter()
        .find(|k| k.eq_ignore_ascii_case(&value))
        .map(|k| k.to_string())
        .unwrap_or(value)
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: String,
    pub date: String,
    pub category: String,
    pub payment_method: String,
}

impl ExpenseForm {
    pub fn parse(&self) -> Result<Expense, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let description = required(&mut errors, "description", &self.description);
        let amount = decimal(&mut errors, "amount", &self.amount, Bound::NonNegative);
        let date = date(&mut errors, "date", &self.date);
        let category = required(&mut errors, "category", &self.category);
        let payment_method = required(&mut errors, "paymentMethod", &self.payment_method);

        match (description, amount, date, category, payment_method) {
            (Some(description), Some(amount), Some(date), Some(category), Some(method))
                if errors.is_empty() =>
            {
                Ok(Expense {
                    id: None,
                    description,
                    amount,
                    date,
                    category: canonical(category, &EXPENSE_CATEGORIES),
                    payment_method: canonical(method, &PAYMENT_METHODS),
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvestmentForm {
    pub name: String,
    pub symbol: String,
    pub r#type: String,
    pub quantity: String,
    pub purchase_price: String,
    pub current_price: String,
    pub purchase_date: String,
}

impl InvestmentForm {
    pub fn parse(&self) -> Result<Investment, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = required(&mut errors, "name", &self.name);
        let symbol = required(&mut errors, "symbol", &self.symbol);
        let kind = choice::<InvestmentType>(&mut errors, "type", &self.r#type);
        let quantity = decimal(&mut errors, "quantity", &self.quantity, Bound::Positive);
        let purchase_price = decimal(
            &mut errors,
            "purchasePrice",
            &self.purchase_price,
            Bound::NonNegative,
        );
        let current_price = decimal(
            &mut errors,
            "currentPrice",
            &self.current_price,
            Bound::NonNegative,
        );
        let purchase_date = date(&mut errors, "purchaseDate", &self.purchase_date);

        match (name, symbol, kind, quantity, purchase_price, current_price, purchase_date) {
            (Some(name), Some(symbol), Some(kind), Some(quantity), Some(buy), Some(now), Some(on))
                if errors.is_empty() =>
            {
                Ok(Investment {
                    id: None,
                    name,
                    symbol: symbol.to_uppercase(),
                    r#type: kind,
                    quantity,
                    purchase_price: buy,
                    current_price: now,
                    purchase_date: on,
                    last_updated: None,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoanForm {
    pub name: String,
    pub principal_amount: String,
    pub interest_rate: String,
    pub interest_type: String,
    pub compounding_frequency: String,
    pub start_date: String,
    pub tenure_months: String,
    pub current_balance: String,
}

impl LoanForm {
    pub fn parse(&self) -> Result<Loan, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = required(&mut errors, "name", &self.name);
        let principal = decimal(
            &mut errors,
            "principalAmount",
            &self.principal_amount,
            Bound::Positive,
        );
        let rate = decimal(
            &mut errors,
            "interestRate",
            &self.interest_rate,
            Bound::NonNegative,
        );
        let interest_type = choice::<InterestType>(&mut errors, "interestType", &self.interest_type);
        let frequency = match interest_type {
            Some(InterestType::Compound) => {
                choice::<CompoundingFrequency>(
                    &mut errors,
                    "compoundingFrequency",
                    &self.compounding_frequency,
                )
            }
            _ => None,
        };
        let start_date = date(&mut errors, "startDate", &self.start_date);
        let tenure = months(&mut errors, "tenureMonths", &self.tenure_months);
        let balance = decimal(
            &mut errors,
            "currentBalance",
            &self.current_balance,
            Bound::NonNegative,
        );

        match (name, principal, rate, interest_type, start_date, tenure, balance) {
            (Some(name), Some(principal), Some(rate), Some(kind), Some(start), Some(tenure), Some(balance))
                if errors.is_empty() =>
            {
                Ok(Loan {
                    id: None,
                    name,
                    principal_amount: principal,
                    interest_rate: rate,
                    interest_type: kind,
                    compounding_frequency: frequency,
                    start_date: start,
                    tenure_months: tenure,
                    current_balance: balance,
                    last_updated: None,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SipForm {
    pub name: String,
    pub scheme_code: String,
    pub monthly_amount: String,
    pub start_date: String,
    pub duration_months: String,
    pub current_nav: String,
    pub total_units: String,
}

impl SipForm {
    pub fn parse(&self) -> Result<Sip, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = required(&mut errors, "name", &self.name);
        let scheme_code = required(&mut errors, "schemeCode", &self.scheme_code);
        let monthly = decimal(
            &mut errors,
            "monthlyAmount",
            &self.monthly_amount,
            Bound::Positive,
        );
        let start_date = date(&mut errors, "startDate", &self.start_date);
        let duration = months(&mut errors, "durationMonths", &self.duration_months);
        let nav = decimal(&mut errors, "currentNav", &self.current_nav, Bound::NonNegative);
        let units = decimal(&mut errors, "totalUnits", &self.total_units, Bound::NonNegative);

        match (name, scheme_code, monthly, start_date, duration, nav, units) {
            (Some(name), Some(code), Some(monthly), Some(start), Some(duration), Some(nav), Some(units))
                if errors.is_empty() =>
            {
                Ok(Sip {
                    id: None,
                    name,
                    scheme_code: code,
                    monthly_amount: monthly,
                    start_date: start,
                    duration_months: duration,
                    current_nav: nav,
                    total_units: units,
                    last_updated: None,
                    last_investment_date: None,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&Expense> for ExpenseForm {
    fn from(e: &Expense) -> Self {
        ExpenseForm {
            description: e.description.clone(),
            amount: e.amount.to_string(),
            date: e.date.to_string(),
            category: e.category.clone(),
            payment_method: e.payment_method.clone(),
        }
    }
}

impl From<&Investment> for InvestmentForm {
    fn from(i: &Investment) -> Self {
        InvestmentForm {
            name: i.name.clone(),
            symbol: i.symbol.clone(),
            r#type: i.r#type.as_str().to_string(),
            quantity: i.quantity.to_string(),
            purchase_price: i.purchase_price.to_string(),
            current_price: i.current_price.to_string(),
            purchase_date: i.purchase_date.to_string(),
        }
    }
}

impl From<&Loan> for LoanForm {
    fn from(l: &Loan) -> Self {
        LoanForm {
            name: l.name.clone(),
            principal_amount: l.principal_amount.to_string(),
            interest_rate: l.interest_rate.to_string(),
            interest_type: l.interest_type.as_str().to_string(),
            compounding_frequency: l
                .compounding_frequency
                .map(|f| f.as_str().to_string())
                .unwrap_or_default(),
            start_date: l.start_date.to_string(),
            tenure_months: l.tenure_months.to_string(),
            current_balance: l.current_balance.to_string(),
        }
    }
}

impl From<&Sip> for SipForm {
    fn from(s: &Sip) -> Self {
        SipForm {
            name: s.name.clone(),
            scheme_code: s.scheme_code.clone(),
            monthly_amount: s.monthly_amount.to_string(),
            start_date: s.start_date.to_string(),
            duration_months: s.duration_months.to_string(),
            current_nav: s.current_nav.to_string(),
            total_units: s.total_units.to_string(),
        }
    }
}
