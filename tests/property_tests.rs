// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::metrics::{derive_investment, derive_loan, monthly_rate};
use fintrack::models::{
    CompoundingFrequency, DateRange, Expense, InterestType, Investment, InvestmentSummary,
    InvestmentType, Loan, LoanSummary, Percentage, SipSummary,
};
use fintrack::summary::{expense_summary, net_worth};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const CATEGORIES: [&str; 4] = ["Food", "Rent", "Utilities", "Travel"];

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn frequency() -> impl Strategy<Value = CompoundingFrequency> {
    prop_oneof![
        Just(CompoundingFrequency::Monthly),
        Just(CompoundingFrequency::Quarterly),
        Just(CompoundingFrequency::Yearly),
    ]
}

fn loan(principal: Decimal, rate: Decimal, tenure: i32, kind: InterestType, freq: Option<CompoundingFrequency>) -> Loan {
    Loan {
        id: None,
        name: "prop".into(),
        principal_amount: principal,
        interest_rate: rate,
        interest_type: kind,
        compounding_frequency: freq,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        tenure_months: tenure,
        current_balance: principal,
        last_updated: None,
    }
}

fn expenses() -> impl Strategy<Value = Vec<Expense>> {
    prop::collection::vec((money(), 0usize..CATEGORIES.len(), 1u32..=28), 0..40).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (amount, cat, d))| Expense {
                id: Some(i as i64),
                description: format!("e{}", i),
                amount,
                date: NaiveDate::from_ymd_opt(2024, 2, d).unwrap(),
                category: CATEGORIES[cat].into(),
                payment_method: "Cash".into(),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn return_is_undefined_exactly_when_cost_is_zero(
        qty in (0i64..1_000_000).prop_map(|q| Decimal::new(q, 3)),
        buy in money(),
        now in money(),
    ) {
        let inv = Investment {
            id: None,
            name: "p".into(),
            symbol: "P".into(),
            r#type: InvestmentType::Stock,
            quantity: qty,
            purchase_price: buy,
            current_price: now,
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            last_updated: None,
        };
        let v = derive_investment(&inv).unwrap();
        if v.cost_basis.is_zero() {
            prop_assert_eq!(v.return_percentage, Percentage::Undefined);
        } else {
            let expected = v.profit_loss / v.cost_basis * dec!(100);
            prop_assert!((v.return_percentage.value() - expected).abs() < dec!(0.000000001));
        }
    }

    #[test]
    fn simple_loan_totals_are_consistent(
        principal in (1i64..100_000_000).prop_map(|c| Decimal::new(c, 2)),
        rate in (0i64..3_000).prop_map(|bp| Decimal::new(bp, 2)),
        tenure in 1i32..480,
    ) {
        let v = derive_loan(&loan(principal, rate, tenure, InterestType::Simple, None)).unwrap();
        let repayment = v.emi_amount * Decimal::from(tenure);
        prop_assert!((v.total_repayment - repayment).abs() < dec!(0.000000001));
        prop_assert_eq!(v.total_interest, v.total_repayment - principal);
        prop_assert!(v.total_interest >= Decimal::ZERO);
        prop_assert!(v.total_repayment >= Decimal::ZERO);
    }

    #[test]
    fn compound_loan_pays_off_within_a_cent(
        principal in (100_000i64..1_000_000_000).prop_map(|c| Decimal::new(c, 2)),
        rate in (1i64..2_400).prop_map(|bp| Decimal::new(bp, 2)),
        tenure in 1i32..360,
        freq in frequency(),
    ) {
        let v = derive_loan(&loan(principal, rate, tenure, InterestType::Compound, Some(freq))).unwrap();
        let r = monthly_rate(rate, freq).unwrap();
        let mut balance = principal;
        for _ in 0..tenure {
            balance = balance * (Decimal::ONE + r) - v.emi_amount;
        }
        prop_assert!(balance.abs() < dec!(0.01), "left {}", balance);
    }

    #[test]
    fn expense_summary_ignores_order(items in expenses()) {
        let range = DateRange::unbounded();
        let forward = expense_summary(&items, range).summary;

        let mut reversed = items.clone();
        reversed.reverse();
        let backward = expense_summary(&reversed, range).summary;

        prop_assert_eq!(forward.total_expenses, backward.total_expenses);
        prop_assert_eq!(
            forward.expenses_by_category.to_sorted(),
            backward.expenses_by_category.to_sorted()
        );
        prop_assert_eq!(&expense_summary(&items, range).summary, &forward);
    }

    #[test]
    fn net_worth_is_monotone(
        inv in money(),
        sip in money(),
        debt in money(),
        bump in money(),
    ) {
        let i = InvestmentSummary { total_value: inv, total_profit_loss: Decimal::ZERO };
        let s = SipSummary { total_current_value: sip, ..Default::default() };
        let l = LoanSummary { total_balance: debt };
        let base = net_worth(&i, &s, &l);

        let richer = InvestmentSummary { total_value: inv + bump, ..i };
        prop_assert!(net_worth(&richer, &s, &l) >= base);
        let more_sip = SipSummary { total_current_value: sip + bump, ..s };
        prop_assert!(net_worth(&i, &more_sip, &l) >= base);
        let more_debt = LoanSummary { total_balance: debt + bump };
        prop_assert!(net_worth(&i, &s, &more_debt) <= base);
    }
}

#[test]
fn net_worth_of_nothing_is_zero() {
    assert_eq!(
        net_worth(
            &InvestmentSummary::default(),
            &SipSummary::default(),
            &LoanSummary::default()
        ),
        Decimal::ZERO
    );
}
