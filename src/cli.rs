// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn opt(name: &'static str, help: &'static str) -> Arg {
    // Negative amounts must reach form validation rather than read as flags.
    Arg::new(name)
        .long(name)
        .num_args(1)
        .allow_negative_numbers(true)
        .help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Record id")
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn as_of_arg() -> Arg {
    opt("as-of", "Count SIP installments up to this date (YYYY-MM-DD); default today")
}

fn range_args() -> [Arg; 2] {
    [
        opt("from", "Start date, inclusive (YYYY-MM-DD)"),
        opt("to", "End date, inclusive (YYYY-MM-DD)"),
    ]
}

/// `add` requires every field; `update` takes the same fields as optional
/// overrides on top of the stored record.
fn crud(name: &'static str, about: &'static str, fields: &[(&'static str, &'static str)]) -> Command {
    let mut list = Command::new("list")
        .about(format!("List {} with derived figures", name))
        .arg(json_flag())
        .arg(as_of_arg());
    if name == "expenses" {
        list = list
            .args(range_args())
            .arg(opt("month", "Only this month (YYYY-MM)").conflicts_with_all(["from", "to"]));
    }

    let add = Command::new("add")
        .about("Create a record")
        .args(fields.iter().map(|&(n, h)| req(n, h)));
    let update = Command::new("update")
        .about("Change fields of an existing record")
        .arg(id_arg())
        .args(fields.iter().map(|&(n, h)| opt(n, h)));

    let mut group = Command::new(name.trim_end_matches('s'))
        .about(about)
        .subcommand_required(true)
        .subcommand(add)
        .subcommand(update)
        .subcommand(Command::new("delete").about("Delete a record").arg(id_arg()))
        .subcommand(list);
    if name == "expenses" {
        group = group.subcommand(monthly());
    }
    group
}

fn monthly() -> Command {
    Command::new("monthly")
        .about("Spending per calendar month and the monthly average")
        .args(range_args())
        .arg(opt("category", "Only this category"))
        .arg(
            Arg::new("server-average")
                .long("server-average")
                .action(ArgAction::SetTrue)
                .help("Take the average from the server instead of the listed months"),
        )
        .arg(json_flag())
}

pub const EXPENSE_FIELDS: [(&str, &str); 5] = [
    ("description", "What the money went on"),
    ("amount", "Amount spent"),
    ("date", "Date spent (YYYY-MM-DD)"),
    ("category", "Category, e.g. Food"),
    ("payment-method", "Payment method, e.g. UPI"),
];

pub const INVESTMENT_FIELDS: [(&str, &str); 7] = [
    ("name", "Holding name"),
    ("symbol", "Ticker or scheme symbol"),
    ("type", "STOCK, MUTUAL_FUND, FIXED_DEPOSIT, BONDS, REAL_ESTATE, GOLD or OTHER"),
    ("quantity", "Units held"),
    ("purchase-price", "Price per unit at purchase"),
    ("current-price", "Latest price per unit"),
    ("purchase-date", "Purchase date (YYYY-MM-DD)"),
];

pub const LOAN_FIELDS: [(&str, &str); 8] = [
    ("name", "Loan name"),
    ("principal", "Principal borrowed"),
    ("rate", "Annual interest rate in percent"),
    ("interest-type", "SIMPLE or COMPOUND"),
    ("frequency", "MONTHLY, QUARTERLY or YEARLY (compound loans)"),
    ("start-date", "First month of the loan (YYYY-MM-DD)"),
    ("tenure", "Tenure in months"),
    ("balance", "Outstanding balance"),
];

pub const SIP_FIELDS: [(&str, &str); 7] = [
    ("name", "Plan name"),
    ("scheme-code", "Fund scheme code"),
    ("monthly-amount", "Amount invested each month"),
    ("start-date", "First installment date (YYYY-MM-DD)"),
    ("duration", "Planned duration in months"),
    ("nav", "Current NAV per unit"),
    ("units", "Units accumulated so far"),
];

pub fn build_cli() -> Command {
    let loan = crud("loans", "Borrowings and their repayment schedule", &LOAN_FIELDS);
    // Simple loans never compound, so the frequency is optional on add too.
    let loan = loan.mut_subcommand("add", |add| add.mut_arg("frequency", |a| a.required(false)));

    Command::new("fintrack")
        .about("Personal finance tracker: expenses, investments, loans and SIPs")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .num_args(1)
                .help("Backend base URL, overriding config and FINTRACK_API_URL"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .subcommand(crud("expenses", "Day-to-day spending", &EXPENSE_FIELDS))
        .subcommand(crud("investments", "Stocks, funds and other holdings", &INVESTMENT_FIELDS))
        .subcommand(loan)
        .subcommand(crud("sips", "Systematic investment plans", &SIP_FIELDS))
        .subcommand(
            Command::new("dashboard")
                .about("Totals, net worth and allocation")
                .arg(opt("month", "Expense month (YYYY-MM); default this month"))
                .arg(
                    Arg::new("local")
                        .long("local")
                        .action(ArgAction::SetTrue)
                        .help("Recompute from raw records instead of server summaries"),
                )
                .arg(as_of_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("reconcile")
                .about("Compare server summaries with a local recomputation")
                .arg(opt("month", "Expense month (YYYY-MM); default this month"))
                .arg(as_of_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("export")
                .about("Write a report with a totals row")
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .value_parser(["expenses", "investments", "loans", "sips"])
                        .help("Which ledger to export"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("csv")
                        .value_parser(["csv", "json"]),
                )
                .arg(opt("out", "Output path; default <kind>-report-<date>.<format>"))
                .args(range_args())
                .arg(as_of_arg())
                .arg(
                    Arg::new("server-totals")
                        .long("server-totals")
                        .action(ArgAction::SetTrue)
                        .help("Take totals from the server summary"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print effective settings"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn compound_frequency_optional_on_add() {
        let m = build_cli()
            .try_get_matches_from([
                "fintrack", "loan", "add", "--name", "Car", "--principal", "500000", "--rate",
                "9", "--interest-type", "SIMPLE", "--start-date", "2024-01-01", "--tenure", "36",
                "--balance", "500000",
            ])
            .unwrap();
        let (_, loan) = m.subcommand().unwrap();
        let (_, add) = loan.subcommand().unwrap();
        assert!(add.get_one::<String>("frequency").is_none());
    }

    #[test]
    fn month_conflicts_with_explicit_range() {
        let r = build_cli().try_get_matches_from([
            "fintrack", "expense", "list", "--month", "2024-01", "--from", "2024-01-05",
        ]);
        assert!(r.is_err());
    }
}
