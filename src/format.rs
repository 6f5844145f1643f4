// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// 12,34,567.89
    Indian,
    /// 1,234,567.89
    Western,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyStyle {
    pub symbol: String,
    pub grouping: Grouping,
}

impl Default for CurrencyStyle {
    fn default() -> Self {
        CurrencyStyle {
            symbol: "₹".to_string(),
            grouping: Grouping::Indian,
        }
    }
}

fn round_half_up(d: Decimal, places: u32) -> Decimal {
    d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

fn group_digits(int_part: &str, grouping: Grouping) -> String {
    let digits: Vec<char> = int_part.chars().collect();
    let mut groups: Vec<String> = Vec::new();
    let mut end = digits.len();
    let mut width = 3;
    while end > 0 {
        let start = end.saturating_sub(width);
        groups.push(digits[start..end].iter().collect());
        end = start;
        if grouping == Grouping::Indian {
            width = 2;
        }
    }
    groups.reverse();
    groups.join(",")
}

pub fn fmt_money(d: Decimal, style: &CurrencyStyle) -> String {
    let rounded = round_half_up(d, 2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    format!(
        "{}{}{}.{}",
        sign,
        style.symbol,
        group_digits(int_part, style.grouping),
        frac
    )
}

pub fn fmt_percent(v: Decimal, places: u32) -> String {
    format!("{:.*}%", places as usize, round_half_up(v, places))
}

/// 1500 -> "1.5K", 2_500_000 -> "2.5M".
pub fn fmt_compact(v: Decimal, places: u32) -> String {
    let thousand = Decimal::from(1_000);
    let million = Decimal::from(1_000_000);
    let billion = Decimal::from(1_000_000_000);
    let abs = v.abs();
    let (scaled, suffix) = if abs >= billion {
        (v / billion, "B")
    } else if abs >= million {
        (v / million, "M")
    } else if abs >= thousand {
        (v / thousand, "K")
    } else {
        (v, "")
    };
    format!("{:.*}{}", places as usize, round_half_up(scaled, places), suffix)
}
