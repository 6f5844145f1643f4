// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const EXPENSE_CATEGORIES: [&str; 11] = [
    "Food",
    "Groceries",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Utilities",
    "Rent",
    "Health",
    "Travel",
    "Education",
    "Miscellaneous",
];

pub const PAYMENT_METHODS: [&str; 7] = [
    "Cash",
    "Credit Card",
    "Debit Card",
    "UPI",
    "Net Banking",
    "Wallet",
    "Other",
];

/// The four ledgers served by the REST backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Expenses,
    Investments,
    Loans,
    Sips,
}

impl EntityKind {
    pub fn path(self) -> &'static str {
        match self {
            EntityKind::Expenses => "expenses",
            EntityKind::Investments => "investments",
            EntityKind::Loans => "loans",
            EntityKind::Sips => "sips",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EntityKind::Expenses => "Expenses",
            EntityKind::Investments => "Investments",
            EntityKind::Loans => "Loans",
            EntityKind::Sips => "SIPs",
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" => Ok(EntityKind::Expenses),
            "investment" | "investments" => Ok(EntityKind::Investments),
            "loan" | "loans" => Ok(EntityKind::Loans),
            "sip" | "sips" => Ok(EntityKind::Sips),
            other => Err(format!("unknown record kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentType {
    Stock,
    MutualFund,
    FixedDeposit,
    Bonds,
    RealEstate,
    Gold,
    Other,
}

impl InvestmentType {
    pub const ALL: [InvestmentType; 7] = [
        InvestmentType::Stock,
        InvestmentType::MutualFund,
        InvestmentType::FixedDeposit,
        InvestmentType::Bonds,
        InvestmentType::RealEstate,
        InvestmentType::Gold,
        InvestmentType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvestmentType::Stock => "STOCK",
            InvestmentType::MutualFund => "MUTUAL_FUND",
            InvestmentType::FixedDeposit => "FIXED_DEPOSIT",
            InvestmentType::Bonds => "BONDS",
            InvestmentType::RealEstate => "REAL_ESTATE",
            InvestmentType::Gold => "GOLD",
            InvestmentType::Other => "OTHER",
        }
    }
}

/// Upper-cases and folds spaces/dashes so "mutual fund" matches MUTUAL_FUND.
fn enum_key(s: &str) -> String {
    s.trim().to_uppercase().replace([' ', '-'], "_")
}

impl FromStr for InvestmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = enum_key(s);
        InvestmentType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| format!("unknown investment type '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterestType {
    Simple,
    Compound,
}

impl InterestType {
    pub fn as_str(self) -> &'static str {
        match self {
            InterestType::Simple => "SIMPLE",
            InterestType::Compound => "COMPOUND",
        }
    }
}

impl FromStr for InterestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match enum_key(s).as_str() {
            "SIMPLE" => Ok(InterestType::Simple),
            "COMPOUND" => Ok(InterestType::Compound),
            _ => Err(format!("unknown interest type '{}'", s.trim())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompoundingFrequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Yearly => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompoundingFrequency::Monthly => "MONTHLY",
            CompoundingFrequency::Quarterly => "QUARTERLY",
            CompoundingFrequency::Yearly => "YEARLY",
        }
    }
}

impl FromStr for CompoundingFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match enum_key(s).as_str() {
            "MONTHLY" => Ok(CompoundingFrequency::Monthly),
            "QUARTERLY" => Ok(CompoundingFrequency::Quarterly),
            "YEARLY" | "ANNUALLY" => Ok(CompoundingFrequency::Yearly),
            _ => Err(format!("unknown compounding frequency '{}'", s.trim())),
        }
    }
}

// The backend sends "" or null for simple-interest loans.
fn frequency_or_none<'de, D>(deserializer: D) -> Result<Option<CompoundingFrequency>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub r#type: InvestmentType,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub current_price: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub principal_amount: Decimal,
    pub interest_rate: Decimal, // annual, in percent
    pub interest_type: InterestType,
    #[serde(
        default,
        deserialize_with = "frequency_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub compounding_frequency: Option<CompoundingFrequency>,
    pub start_date: NaiveDate,
    pub tenure_months: i32,
    pub current_balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub scheme_code: String,
    pub monthly_amount: Decimal,
    pub start_date: NaiveDate,
    pub duration_months: i32,
    pub current_nav: Decimal,
    pub total_units: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_investment_date: Option<NaiveDate>,
}

/// A percentage that may be undefined because its base was zero.
///
/// `Undefined` reads as zero everywhere a number is needed, but stays
/// distinguishable from a genuine 0% return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Percentage {
    Value(Decimal),
    Undefined,
}

impl Percentage {
    /// `numerator / denominator * 100`, or `Undefined` on a zero denominator.
    ///
    /// A ratio too large for `Decimal` is also `Undefined`; use
    /// [`Percentage::checked_of`] to tell the two apart.
    pub fn of(numerator: Decimal, denominator: Decimal) -> Percentage {
        Percentage::checked_of(numerator, denominator).unwrap_or(Percentage::Undefined)
    }

    /// Like [`Percentage::of`], but `None` when the result overflows.
    pub fn checked_of(numerator: Decimal, denominator: Decimal) -> Option<Percentage> {
        if denominator.is_zero() {
            return Some(Percentage::Undefined);
        }
        numerator
            .checked_div(denominator)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(Percentage::Value)
    }

    pub fn value(self) -> Decimal {
        match self {
            Percentage::Value(v) => v,
            Percentage::Undefined => Decimal::ZERO,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Percentage::Undefined)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.value(), serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentView {
    #[serde(flatten)]
    pub investment: Investment,
    pub cost_basis: Decimal,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub return_percentage: Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub emi_amount: Decimal,
    pub end_date: NaiveDate,
    pub remaining_months: u32,
    pub total_repayment: Decimal,
    pub total_interest: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipView {
    #[serde(flatten)]
    pub sip: Sip,
    pub completed_installments: u32,
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub return_percentage: Percentage,
}

/// Inclusive date window; a missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange { start, end }
    }

    pub fn unbounded() -> Self {
        DateRange::default()
    }

    /// First through last day of the month containing `day`.
    pub fn month_of(day: NaiveDate) -> Self {
        let first = day.with_day(1).unwrap_or(day);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(day);
        DateRange::new(Some(first), Some(last))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Category totals kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals(Vec<(String, Decimal)>);

impl CategoryTotals {
    pub fn new() -> Self {
        CategoryTotals(Vec::new())
    }

    pub fn add(&mut self, category: &str, amount: Decimal) {
        match self.0.iter_mut().find(|(c, _)| c == category) {
            Some((_, total)) => *total += amount,
            None => self.0.push((category.to_string(), amount)),
        }
    }

    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.0
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, total)| *total)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.0.iter().map(|(c, _)| c.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(c, v)| (c.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Order-insensitive view for comparisons.
    pub fn to_sorted(&self) -> std::collections::BTreeMap<String, Decimal> {
        self.0.iter().cloned().collect()
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, total) in &self.0 {
            map.serialize_entry(category, total)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryTotals {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TotalsVisitor;

        impl<'de> Visitor<'de> for TotalsVisitor {
            type Value = CategoryTotals;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category to amount")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut totals = CategoryTotals::new();
                while let Some((category, amount)) = access.next_entry::<String, Decimal>()? {
                    totals.add(&category, amount);
                }
                Ok(totals)
            }
        }

        deserializer.deserialize_map(TotalsVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total_expenses: Decimal,
    #[serde(default)]
    pub expenses_by_category: CategoryTotals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSummary {
    pub total_value: Decimal,
    pub total_profit_loss: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub total_balance: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipSummary {
    pub total_investment: Decimal,
    pub total_current_value: Decimal,
    pub total_profit_loss: Decimal,
}
