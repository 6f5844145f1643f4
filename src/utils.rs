// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

use crate::models::DateRange;

const UA: &str = concat!("fintrack/", env!("CARGO_PKG_VERSION"));

pub fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// First day of a `YYYY-MM` month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))
}

pub fn parse_range(from: Option<&String>, to: Option<&String>) -> Result<DateRange> {
    let start = from.map(|s| parse_date(s)).transpose()?;
    let end = to.map(|s| parse_date(s)).transpose()?;
    if let (Some(s), Some(e)) = (start, end) {
        anyhow::ensure!(s <= e, "--from {} is after --to {}", s, e);
    }
    Ok(DateRange::new(start, end))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parses_to_first_day() {
        let d = parse_month("2024-02").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!(parse_month("2024-13").is_err());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let from = "2024-03-10".to_string();
        let to = "2024-03-01".to_string();
        assert!(parse_range(Some(&from), Some(&to)).is_err());
        let r = parse_range(Some(&to), None).unwrap();
        assert_eq!(r.start, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(r.end, None);
    }
}
