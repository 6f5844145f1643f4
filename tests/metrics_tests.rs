// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::metrics::{
    derive_loan, derive_sip, derive_sips, monthly_rate, InstallmentBasis,
};
use fintrack::models::{
    CompoundingFrequency, DateRange, Expense, InterestType, Investment, InvestmentType, Loan,
    Percentage, Sip,
};
use fintrack::summary::{
    expense_summary, investment_summary, loan_summary, local_dashboard, sip_summary,
};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn compound_loan(principal: Decimal, rate: Decimal, tenure: i32, freq: CompoundingFrequency) -> Loan {
    Loan {
        id: Some(1),
        name: "Home".into(),
        principal_amount: principal,
        interest_rate: rate,
        interest_type: InterestType::Compound,
        compounding_frequency: Some(freq),
        start_date: day(2024, 1, 31),
        tenure_months: tenure,
        current_balance: principal,
        last_updated: None,
    }
}

fn expense(desc: &str, amount: Decimal, date: NaiveDate, category: &str) -> Expense {
    Expense {
        id: None,
        description: desc.into(),
        amount,
        date,
        category: category.into(),
        payment_method: "UPI".into(),
    }
}

fn sip(name: &str, monthly: Decimal, start: NaiveDate, duration: i32, nav: Decimal, units: Decimal) -> Sip {
    Sip {
        id: None,
        name: name.into(),
        scheme_code: "120716".into(),
        monthly_amount: monthly,
        start_date: start,
        duration_months: duration,
        current_nav: nav,
        total_units: units,
        last_updated: None,
        last_investment_date: None,
    }
}

#[test]
fn compound_emi_amortizes_to_zero_for_every_frequency() {
    for freq in [
        CompoundingFrequency::Monthly,
        CompoundingFrequency::Quarterly,
        CompoundingFrequency::Yearly,
    ] {
        let loan = compound_loan(dec!(2500000), dec!(8.5), 240, freq);
        let view = derive_loan(&loan).unwrap();
        let r = monthly_rate(loan.interest_rate, freq).unwrap();

        let mut balance = loan.principal_amount;
        for _ in 0..loan.tenure_months {
            balance = balance * (Decimal::ONE + r) - view.emi_amount;
        }
        assert!(balance.abs() < dec!(0.01), "{:?} left {}", freq, balance);
        assert!(view.total_interest > Decimal::ZERO);
    }
}

#[test]
fn effective_rate_preserves_annual_yield() {
    let monthly = monthly_rate(dec!(12), CompoundingFrequency::Quarterly).unwrap();
    let yearly_growth = (Decimal::ONE + monthly).powu(12);
    // (1 + 0.12/4)^4
    assert!((yearly_growth - dec!(1.12550881)).abs() < dec!(0.000001));
}

#[test]
fn loan_end_date_clamps_to_month_end() {
    let loan = compound_loan(dec!(100000), dec!(10), 1, CompoundingFrequency::Monthly);
    let view = derive_loan(&loan).unwrap();
    assert_eq!(view.end_date, day(2024, 2, 29));
    // One month at 10% a year: 100000 * (1 + 0.1/12)
    assert_eq!(view.emi_amount.round_dp(2), dec!(100833.33));
}

#[test]
fn remaining_months_follow_balance() {
    let loan = Loan {
        interest_type: InterestType::Simple,
        compounding_frequency: None,
        interest_rate: dec!(12),
        current_balance: dec!(60000),
        tenure_months: 12,
        ..compound_loan(dec!(120000), dec!(0), 12, CompoundingFrequency::Monthly)
    };
    let view = derive_loan(&loan).unwrap();
    assert_eq!(view.emi_amount, dec!(11200));
    assert_eq!(view.remaining_months, 6);
    assert_eq!(view.total_interest, dec!(14400));
}

#[test]
fn january_expenses_group_in_first_seen_order() {
    let expenses = vec![
        expense("Groceries", dec!(2500), day(2024, 1, 3), "Food"),
        expense("Rent", dec!(15000), day(2024, 1, 1), "Rent"),
        expense("Dinner", dec!(1200.50), day(2024, 1, 20), "Food"),
        expense("February rent", dec!(15000), day(2024, 2, 1), "Rent"),
    ];
    let agg = expense_summary(&expenses, DateRange::month_of(day(2024, 1, 15)));
    assert!(agg.is_complete());
    assert_eq!(agg.summary.total_expenses, dec!(18700.50));
    assert_eq!(agg.summary.expenses_by_category.categories(), vec!["Food", "Rent"]);
    assert_eq!(agg.summary.expenses_by_category.get("Food"), Some(dec!(3700.50)));

    let json = serde_json::to_string(&agg.summary).unwrap();
    assert!(json.find("\"Food\"").unwrap() < json.find("\"Rent\"").unwrap());
}

#[test]
fn sip_installments_count_whole_months() {
    let start = day(2024, 1, 15);
    let plan = sip("Index", dec!(5000), start, 12, dec!(25), dec!(600));

    let before_first_anniversary = derive_sip(&plan, InstallmentBasis::AsOf(day(2024, 4, 14))).unwrap();
    assert_eq!(before_first_anniversary.completed_installments, 2);
    assert_eq!(before_first_anniversary.total_invested, dec!(10000));

    let on_day = derive_sip(&plan, InstallmentBasis::AsOf(day(2024, 4, 15))).unwrap();
    assert_eq!(on_day.completed_installments, 3);

    let not_started = derive_sip(&plan, InstallmentBasis::AsOf(day(2023, 12, 1))).unwrap();
    assert_eq!(not_started.completed_installments, 0);
    assert_eq!(not_started.return_percentage, Percentage::Undefined);

    let long_after = derive_sip(&plan, InstallmentBasis::AsOf(day(2030, 1, 1))).unwrap();
    assert_eq!(long_after.completed_installments, 12);
    assert_eq!(
        derive_sip(&plan, InstallmentBasis::FullTerm).unwrap().total_invested,
        dec!(60000)
    );
}

#[test]
fn malformed_records_are_skipped_not_fatal() {
    let sips = vec![
        sip("Good", dec!(1000), day(2023, 1, 1), 24, dec!(12), dec!(1000)),
        sip("Zero amount", dec!(0), day(2023, 1, 1), 24, dec!(12), dec!(10)),
        sip("Negative units", dec!(1000), day(2023, 1, 1), 24, dec!(12), dec!(-1)),
    ];
    let derived = derive_sips(&sips, InstallmentBasis::AsOf(day(2024, 1, 1)));
    assert_eq!(derived.views.len(), 1);
    let skipped: Vec<usize> = derived.skipped.iter().map(|s| s.index).collect();
    assert_eq!(skipped, vec![1, 2]);
    assert!(derived.skipped.iter().all(|s| s.error.is_invalid_input()));

    let agg = sip_summary(&sips, InstallmentBasis::AsOf(day(2024, 1, 1)));
    assert_eq!(agg.summary.total_investment, dec!(12000));
    assert_eq!(agg.summary.total_current_value, dec!(12000));
    assert_eq!(agg.skipped.len(), 2);
}

#[test]
fn local_dashboard_combines_every_ledger() {
    let as_of = day(2024, 3, 10);
    let expenses = vec![expense("Fuel", dec!(3000), day(2024, 3, 2), "Transportation")];
    let investments = vec![Investment {
        id: None,
        name: "Infosys".into(),
        symbol: "INFY".into(),
        r#type: InvestmentType::Stock,
        quantity: dec!(10),
        purchase_price: dec!(100),
        current_price: dec!(150),
        purchase_date: day(2023, 6, 1),
        last_updated: None,
    }];
    let sips = vec![sip("Flexi", dec!(2000), day(2023, 12, 10), 36, dec!(50), dec!(130))];
    let loans = vec![compound_loan(dec!(400000), dec!(9), 60, CompoundingFrequency::Monthly)];

    let agg = local_dashboard(
        &expenses,
        DateRange::month_of(as_of),
        &investments,
        &sips,
        &loans,
        InstallmentBasis::AsOf(as_of),
    );
    let d = agg.summary;
    assert!(agg.skipped.is_empty());
    assert_eq!(d.investments.total_value, dec!(1500));
    assert_eq!(d.sips.total_investment, dec!(6000));
    assert_eq!(d.sips.total_current_value, dec!(6500));
    assert_eq!(d.total_assets, dec!(8000));
    assert_eq!(d.net_worth, dec!(-392000));
    assert_eq!(d.overall_return, Percentage::Value(dec!(500) / dec!(1500) * dec!(100)));
    assert_eq!(d.expenses.total_expenses, dec!(3000));

    assert_eq!(investment_summary(&investments).summary, d.investments);
    assert_eq!(loan_summary(&loans).summary.total_balance, dec!(400000));
}
