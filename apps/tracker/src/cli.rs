//! Command-line definition for the `tracker` binary.
//!
//! Amounts, dates, payment modes and roles are parsed by clap through
//! their `FromStr` impls, so a bad value fails before any database work.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{Datelike, Months, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracker_core::{DateRange, Money, PaymentMode, Role, ValidationError};

/// Environment variable holding the session token.
pub const TOKEN_VAR: &str = "TRACKER_TOKEN";

/// Environment variable holding the password for `init`, `add-user` and `login`.
pub const PASSWORD_VAR: &str = "TRACKER_PASSWORD";

/// How far back `report trends` looks when `--from` is not given.
pub const TRENDS_WINDOW_MONTHS: u32 = 12;

#[derive(Parser, Debug)]
#[command(name = "tracker", version, disable_help_subcommand = true)]
#[command(about = "School expense and uniform tracker")]
#[command(after_help = "Dates are YYYY-MM-DD. Amounts accept \"1500\", \"1,500.00\" or \"KES 1,500\".")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the first admin account (password from TRACKER_PASSWORD)
    Init {
        #[arg(long)]
        username: String,
    },
    /// Create an account; admin only (password from TRACKER_PASSWORD)
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        role: Role,
    },
    /// Print a session token (password from TRACKER_PASSWORD)
    Login {
        #[arg(long)]
        username: String,
    },
    /// Record an expense
    AddExpense {
        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: Money,
        #[arg(long)]
        receipt_no: Option<String>,
    },
    /// Record a stock delivery
    AddStock {
        #[arg(long)]
        item: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        quantity: i64,
        #[arg(long)]
        unit_cost: Money,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long = "invoice")]
        invoice_no: Option<String>,
    },
    /// Sell uniform items, storing a receipt unless --no-receipt
    Sell {
        #[arg(long)]
        item: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        quantity: i64,
        #[arg(long)]
        price: Money,
        #[arg(long = "student")]
        student_name: Option<String>,
        #[arg(long = "class")]
        student_class: Option<String>,
        #[arg(long, default_value = "cash")]
        payment: PaymentMode,
        #[arg(long)]
        reference: Option<String>,
        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = false)]
        no_receipt: bool,
    },
    /// Check whether a quantity is in stock
    Available {
        #[arg(long)]
        item: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        quantity: i64,
    },
    /// Render a stored receipt as HTML
    Reprint {
        #[arg(long = "receipt")]
        receipt_id: String,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List stored rows with their total
    List {
        #[arg(value_enum)]
        target: ListTarget,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        search: Option<String>,
        /// Comma-separated expense categories
        #[arg(long = "category", value_delimiter = ',')]
        categories: Vec<String>,
        /// Comma-separated uniform items
        #[arg(long = "item", value_delimiter = ',')]
        items: Vec<String>,
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Print a report
    Report {
        #[arg(value_enum)]
        target: ReportTarget,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Delete all bookkeeping data; admin only
    Reset {
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListTarget {
    Expenses,
    Sales,
    Receipts,
    Stock,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportTarget {
    Expenses,
    Sales,
    Inventory,
    Trends,
    Dashboard,
}

/// `--from` / `--to`, both inclusive.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    /// The range, defaulting to the first of this month through `today`.
    pub fn range(&self, today: NaiveDate) -> Result<DateRange, ValidationError> {
        let start = self.from.unwrap_or_else(|| today.with_day(1).unwrap_or(today));
        DateRange::new(start, self.to.unwrap_or(today))
    }

    /// Like [`range`](Self::range), but `None` when neither bound was given.
    pub fn optional_range(&self, today: NaiveDate) -> Result<Option<DateRange>, ValidationError> {
        if self.from.is_none() && self.to.is_none() {
            return Ok(None);
        }
        self.range(today).map(Some)
    }

    /// Start of the trends window: `--from`, or [`TRENDS_WINDOW_MONTHS`] back.
    pub fn trends_since(&self, today: NaiveDate) -> NaiveDate {
        self.from.unwrap_or_else(|| {
            today
                .checked_sub_months(Months::new(TRENDS_WINDOW_MONTHS))
                .unwrap_or(today)
        })
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", raw))
}

/// Read a required secret from the environment.
pub fn env_secret(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!("set {} in the environment", var),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn every_subcommand_parses() {
        let commands = [
            vec!["tracker", "init", "--username", "bursar"],
            vec!["tracker", "add-user", "--username", "clerk", "--role", "staff"],
            vec!["tracker", "login", "--username", "bursar"],
            vec![
                "tracker", "add-expense", "--category", "Food", "--description", "Lunch",
                "--amount", "1500",
            ],
            vec![
                "tracker", "add-stock", "--item", "Shirt", "--size", "M", "--quantity", "10",
                "--unit-cost", "500",
            ],
            vec![
                "tracker", "sell", "--item", "Shirt", "--size", "M", "--quantity", "3", "--price",
                "700",
            ],
            vec!["tracker", "available", "--item", "Tie", "--size", "ONE", "--quantity", "1"],
            vec!["tracker", "reprint", "--receipt", "REC-1A2B3C4D"],
            vec!["tracker", "list", "stock"],
            vec!["tracker", "report", "dashboard"],
            vec!["tracker", "reset", "--confirm"],
        ];
        for argv in commands {
            Cli::try_parse_from(argv.clone()).unwrap_or_else(|e| panic!("{:?}: {}", argv, e));
        }
    }

    #[test]
    fn sell_parses_typed_values() {
        let cli = Cli::try_parse_from([
            "tracker", "sell", "--item", "Shirt", "--size", "m", "--quantity", "3", "--price",
            "KES 1,250.50", "--payment", "M-Pesa", "--student", "Jane Doe", "--date",
            "2024-03-04", "--no-receipt",
        ])
        .unwrap();

        match cli.command {
            Command::Sell {
                quantity,
                price,
                payment,
                student_name,
                date: sale_date,
                no_receipt,
                ..
            } => {
                assert_eq!(quantity, 3);
                assert_eq!(price.cents(), 125_050);
                assert_eq!(payment, PaymentMode::Mpesa);
                assert_eq!(student_name.as_deref(), Some("Jane Doe"));
                assert_eq!(sale_date, Some(date(2024, 3, 4)));
                assert!(no_receipt);
            }
            other => panic!("expected sell, got {:?}", other),
        }
    }

    #[test]
    fn sell_defaults_to_cash_with_receipt() {
        let cli = Cli::try_parse_from([
            "tracker", "sell", "--item", "Tie", "--size", "ONE", "--quantity", "1", "--price", "200",
        ])
        .unwrap();

        match cli.command {
            Command::Sell {
                payment, no_receipt, date, ..
            } => {
                assert_eq!(payment, PaymentMode::Cash);
                assert!(!no_receipt);
                assert_eq!(date, None);
            }
            other => panic!("expected sell, got {:?}", other),
        }
    }

    #[test]
    fn bad_values_are_rejected() {
        let bad = [
            vec!["tracker", "add-user", "--username", "x", "--role", "root"],
            vec![
                "tracker", "add-stock", "--item", "Shirt", "--size", "M", "--quantity", "three",
                "--unit-cost", "500",
            ],
            vec![
                "tracker", "add-expense", "--category", "Food", "--description", "x", "--amount",
                "12.345",
            ],
            vec![
                "tracker", "add-expense", "--category", "Food", "--description", "x", "--amount",
                "10", "--date", "04/03/2024",
            ],
            vec![
                "tracker", "sell", "--item", "Tie", "--size", "ONE", "--quantity", "1", "--price",
                "200", "--payment", "barter",
            ],
            vec!["tracker", "list", "everything"],
            vec!["tracker", "reprint"],
        ];
        for argv in bad {
            assert!(Cli::try_parse_from(argv.clone()).is_err(), "{:?} should fail", argv);
        }
    }

    #[test]
    fn list_filters_split_on_commas() {
        let cli = Cli::try_parse_from([
            "tracker", "list", "expenses", "--from", "2024-01-01", "--category", "Food,Fuel",
            "--csv",
        ])
        .unwrap();

        match cli.command {
            Command::List {
                target,
                range,
                categories,
                csv,
                ..
            } => {
                assert_eq!(target, ListTarget::Expenses);
                assert_eq!(range.from, Some(date(2024, 1, 1)));
                assert_eq!(categories, ["Food", "Fuel"]);
                assert!(csv);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn range_defaults_to_month_to_date() {
        let today = date(2024, 3, 15);
        let range = RangeArgs::default().range(today).unwrap();

        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, today);
        assert_eq!(RangeArgs::default().optional_range(today).unwrap(), None);

        let backwards = RangeArgs {
            from: Some(date(2024, 4, 1)),
            to: Some(date(2024, 3, 1)),
        };
        assert!(backwards.range(today).is_err());
    }

    #[test]
    fn trends_window_defaults_to_a_year_back() {
        let today = date(2024, 3, 15);
        assert_eq!(RangeArgs::default().trends_since(today), date(2023, 3, 15));

        let from = RangeArgs {
            from: Some(date(2024, 1, 1)),
            to: None,
        };
        assert_eq!(from.trends_since(today), date(2024, 1, 1));
    }
}
