// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Blocking client for the finance-tracker REST backend.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Settings;
use crate::models::{
    DateRange, EntityKind, Expense, ExpenseSummary, Investment, InvestmentSummary, Loan,
    LoanSummary, Sip, SipSummary,
};
use crate::utils::http_client;

/// A record type served under its own collection path.
pub trait Record: Serialize + DeserializeOwned + Send {
    const KIND: EntityKind;
    type Summary: DeserializeOwned + Send;
}

impl Record for Expense {
    const KIND: EntityKind = EntityKind::Expenses;
    type Summary = ExpenseSummary;
}

impl Record for Investment {
    const KIND: EntityKind = EntityKind::Investments;
    type Summary = InvestmentSummary;
}

impl Record for Loan {
    const KIND: EntityKind = EntityKind::Loans;
    type Summary = LoanSummary;
}

impl Record for Sip {
    const KIND: EntityKind = EntityKind::Sips;
    type Summary = SipSummary;
}

/// Server-side summaries for every ledger, fetched together.
#[derive(Debug, Clone)]
pub struct ServerSummaries {
    pub expenses: ExpenseSummary,
    pub investments: InvestmentSummary,
    pub sips: SipSummary,
    pub loans: LoanSummary,
}

/// Every collection, fetched together.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub expenses: Vec<Expense>,
    pub investments: Vec<Investment>,
    pub sips: Vec<Sip>,
    pub loans: Vec<Loan>,
}

pub struct ApiClient {
    base: String,
    http: Client,
}

fn range_params(range: DateRange) -> Vec<(&'static str, String)> {
    let mut q = Vec::new();
    if let Some(s) = range.start {
        q.push(("startDate", s.to_string()));
    }
    if let Some(e) = range.end {
        q.push(("endDate", e.to_string()));
    }
    q
}

fn category_params(category: Option<&str>) -> Vec<(&'static str, String)> {
    category
        .map(|c| vec![("category", c.trim().to_string())])
        .unwrap_or_default()
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(ApiClient {
            base: settings.api_base_url.trim_end_matches('/').to_string(),
            http: http_client(settings.timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn url(&self, kind: EntityKind, tail: Option<&str>) -> String {
        match tail {
            Some(t) => format!("{}/{}/{}", self.base, kind.path(), t),
            None => format!("{}/{}", self.base, kind.path()),
        }
    }

    fn send(&self, req: RequestBuilder, what: &str) -> Result<reqwest::blocking::Response> {
        let resp = req.send().with_context(|| format!("Request failed: {}", what))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!("{} returned {}: {}", what, status, body.trim()));
        }
        Ok(resp)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(%url, ?query, "GET");
        let what = format!("GET {}", url);
        self.send(self.http.get(url).query(query), &what)?
            .json::<T>()
            .with_context(|| format!("Decode response of {}", what))
    }

    pub fn list<R: Record>(&self) -> Result<Vec<R>> {
        self.get_json(&self.url(R::KIND, None), &[])
    }

    pub fn get<R: Record>(&self, id: i64) -> Result<R> {
        self.get_json(&self.url(R::KIND, Some(&id.to_string())), &[])
    }

    pub fn create<R: Record>(&self, record: &R) -> Result<R> {
        let url = self.url(R::KIND, None);
        debug!(%url, "POST");
        let what = format!("POST {}", url);
        self.send(self.http.post(&url).json(record), &what)?
            .json::<R>()
            .with_context(|| format!("Decode response of {}", what))
    }

    pub fn update<R: Record>(&self, id: i64, record: &R) -> Result<R> {
        let url = self.url(R::KIND, Some(&id.to_string()));
        debug!(%url, "PUT");
        let what = format!("PUT {}", url);
        self.send(self.http.put(&url).json(record), &what)?
            .json::<R>()
            .with_context(|| format!("Decode response of {}", what))
    }

    pub fn delete<R: Record>(&self, id: i64) -> Result<()> {
        let url = self.url(R::KIND, Some(&id.to_string()));
        debug!(%url, "DELETE");
        self.send(self.http.delete(&url), &format!("DELETE {}", url))?;
        Ok(())
    }

    pub fn summary<R: Record>(&self) -> Result<R::Summary> {
        self.get_json(&self.url(R::KIND, Some("summary")), &[])
    }

    /// Expense summary restricted to `range` on the server side.
    pub fn expense_summary(&self, range: DateRange) -> Result<ExpenseSummary> {
        self.get_json(
            &self.url(EntityKind::Expenses, Some("summary")),
            &range_params(range),
        )
    }

    /// Expenses dated within `range`. The server filter needs both bounds;
    /// a half-open range is filtered locally.
    pub fn expenses_in_range(&self, range: DateRange) -> Result<Vec<Expense>> {
        if range.start.is_some() && range.end.is_some() {
            return self.get_json(
                &self.url(EntityKind::Expenses, Some("by-date-range")),
                &range_params(range),
            );
        }
        let all: Vec<Expense> = self.list()?;
        Ok(all.into_iter().filter(|e| range.contains(e.date)).collect())
    }

    pub fn expenses_by_category(&self, category: &str) -> Result<Vec<Expense>> {
        self.get_json(
            &self.url(EntityKind::Expenses, Some("by-category")),
            &category_params(Some(category)),
        )
    }

    /// Server's mean monthly spend, overall or for one category.
    pub fn average_monthly(&self, category: Option<&str>) -> Result<Decimal> {
        self.get_json(
            &self.url(EntityKind::Expenses, Some("average-monthly")),
            &category_params(category),
        )
    }

    /// The four summaries in parallel; any failure fails the whole set.
    pub fn fetch_all_summaries(&self, expense_range: DateRange) -> Result<ServerSummaries> {
        std::thread::scope(|s| -> Result<ServerSummaries> {
            let e = s.spawn(|| self.expense_summary(expense_range));
            let i = s.spawn(|| self.summary::<Investment>());
            let p = s.spawn(|| self.summary::<Sip>());
            let l = s.spawn(|| self.summary::<Loan>());
            Ok(ServerSummaries {
                expenses: joined(e.join())?,
                investments: joined(i.join())?,
                sips: joined(p.join())?,
                loans: joined(l.join())?,
            })
        })
    }

    /// The four collections in parallel; any failure fails the whole set.
    pub fn fetch_all_collections(&self) -> Result<Collections> {
        std::thread::scope(|s| -> Result<Collections> {
            let e = s.spawn(|| self.list::<Expense>());
            let i = s.spawn(|| self.list::<Investment>());
            let p = s.spawn(|| self.list::<Sip>());
            let l = s.spawn(|| self.list::<Loan>());
            Ok(Collections {
                expenses: joined(e.join())?,
                investments: joined(i.join())?,
                sips: joined(p.join())?,
                loans: joined(l.join())?,
            })
        })
    }
}

fn joined<T>(r: std::thread::Result<Result<T>>) -> Result<T> {
    r.map_err(|_| anyhow!("fetch worker panicked"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn client(base: &str) -> ApiClient {
        let settings = Settings {
            api_base_url: base.to_string(),
            ..Settings::default()
        };
        ApiClient::new(&settings).unwrap()
    }

    #[test]
    fn urls_follow_collection_paths() {
        let api = client("http://localhost:8080/api/");
        assert_eq!(api.base_url(), "http://localhost:8080/api");
        assert_eq!(
            api.url(EntityKind::Sips, None),
            "http://localhost:8080/api/sips"
        );
        assert_eq!(
            api.url(EntityKind::Loans, Some("7")),
            "http://localhost:8080/api/loans/7"
        );
        assert_eq!(
            api.url(EntityKind::Expenses, Some("by-date-range")),
            "http://localhost:8080/api/expenses/by-date-range"
        );
    }

    #[test]
    fn range_params_skip_open_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        let end = NaiveDate::from_ymd_opt(2024, 1, 31);
        assert_eq!(
            range_params(DateRange::new(start, end)),
            vec![
                ("startDate", "2024-01-01".to_string()),
                ("endDate", "2024-01-31".to_string())
            ]
        );
        assert!(range_params(DateRange::unbounded()).is_empty());
    }

    #[test]
    fn category_param_is_trimmed_and_optional() {
        assert_eq!(
            category_params(Some(" Food ")),
            vec![("category", "Food".to_string())]
        );
        assert!(category_params(None).is_empty());
    }

    #[test]
    fn unreachable_server_fails_whole_fetch() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = client("http://127.0.0.1:9/api");
        assert!(api.fetch_all_summaries(DateRange::unbounded()).is_err());
    }
}
