//! # tracker
//!
//! Command-line front end for the school expense and uniform tracker.
//!
//! ## Usage
//! ```bash
//! # First run: create the admin account (password from TRACKER_PASSWORD)
//! TRACKER_PASSWORD=... tracker init --username bursar
//!
//! # Sign in; every other command reads the token from TRACKER_TOKEN
//! export TRACKER_TOKEN=$(TRACKER_PASSWORD=... tracker login --username bursar)
//!
//! tracker add-expense --date 2024-03-04 --category Food --description "Lunch" --amount 1500
//! tracker add-stock --item Shirt --size M --quantity 10 --unit-cost 500
//! tracker sell --item Shirt --size M --quantity 3 --price 700 --student "Jane Doe"
//! tracker report sales --from 2024-03-01 --to 2024-03-31 --csv
//! ```

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use tracker_app::auth::AuthContext;
use tracker_app::cli::{env_secret, Cli, Command, ListTarget, RangeArgs, ReportTarget, PASSWORD_VAR, TOKEN_VAR};
use tracker_app::commands::{admin, auth, expense, receipt, report, sale, stock};
use tracker_app::{init_tracing, AppConfig, AppState};
use tracker_core::export::{to_csv, CsvRecord};
use tracker_core::{ExpenseFilter, NewExpense, NewSale, NewStock, ReceiptFilter, SaleFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;
    info!(database = %config.database_path.display(), "Starting tracker");
    let state = AppState::init(config)
        .await
        .context("failed to open the database")?;

    let result = run(&state, cli.command).await;
    state.db().close().await;
    result
}

async fn run(state: &AppState, command: Command) -> Result<()> {
    let today = Local::now().date_naive();

    match command {
        // =====================================================================
        // Accounts
        // =====================================================================
        Command::Init { username } => {
            let password = env_secret(PASSWORD_VAR)?;
            auth::bootstrap_admin(state, &username, &password).await?;
            println!("✓ Admin account '{}' created", username.trim());
        }
        Command::AddUser { username, role } => {
            let caller = authenticate(state)?;
            let password = env_secret(PASSWORD_VAR)?;
            auth::create_user(state, &caller, &username, &password, role).await?;
            println!("✓ Account '{}' created ({})", username.trim(), role);
        }
        Command::Login { username } => {
            let password = env_secret(PASSWORD_VAR)?;
            let session = auth::login(state, &username, &password).await?;
            println!("{}", session.token);
        }

        // =====================================================================
        // Bookkeeping
        // =====================================================================
        Command::AddExpense {
            date,
            category,
            description,
            amount,
            receipt_no,
        } => {
            let caller = authenticate(state)?;
            let new = NewExpense {
                date: date.unwrap_or(today),
                category,
                description,
                amount,
                receipt_no,
            };
            let saved = expense::add_expense(state, &caller, new).await?;
            println!("✓ Expense #{} recorded: {} {}", saved.id, saved.category, saved.amount());
        }
        Command::AddStock {
            item,
            size,
            quantity,
            unit_cost,
            supplier,
            invoice_no,
        } => {
            let caller = authenticate(state)?;
            let new = NewStock {
                item,
                size,
                quantity,
                unit_cost,
                supplier,
                invoice_no,
            };
            let row = stock::add_stock(state, &caller, new).await?;
            println!("✓ {} {} now has {} in stock", row.item, row.size, row.quantity);
        }
        Command::Sell {
            item,
            size,
            quantity,
            price,
            student_name,
            student_class,
            payment,
            reference,
            date,
            no_receipt,
        } => {
            let caller = authenticate(state)?;
            let new = NewSale {
                date: date.unwrap_or(today),
                student_name,
                student_class,
                item,
                size,
                quantity,
                selling_price: price,
                payment_mode: payment,
                reference,
            };
            let outcome = sale::record_sale(state, &caller, new, !no_receipt).await?;
            println!(
                "✓ Sale #{} recorded: {} × {} {} = {}",
                outcome.sale.id,
                outcome.sale.quantity,
                outcome.sale.item,
                outcome.sale.size,
                outcome.sale.total()
            );
            match outcome.receipt {
                Some(stored) => println!("  Receipt {}", stored.receipt_id),
                None => println!("  Reference {} (no receipt stored)", outcome.sale.receipt_id),
            }
        }
        Command::Available { item, size, quantity } => {
            let caller = authenticate(state)?;
            let ok = stock::check_availability(state, &caller, &item, &size, quantity).await?;
            println!("{}", if ok { "available" } else { "not available" });
        }
        Command::Reprint { receipt_id, out } => {
            let caller = authenticate(state)?;
            let html = receipt::reprint_receipt(state, &caller, &receipt_id).await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("✓ Receipt written to {}", path.display());
                }
                None => println!("{}", html),
            }
        }
        Command::List {
            target,
            range,
            search,
            categories,
            items,
            csv,
        } => {
            let caller = authenticate(state)?;
            let range = range.optional_range(today)?;
            match target {
                ListTarget::Expenses => {
                    let filter = ExpenseFilter {
                        range,
                        categories,
                        search,
                    };
                    let listing = expense::list_expenses(state, &caller, &filter).await?;
                    emit(csv, &listing, &listing.rows)?;
                }
                ListTarget::Sales => {
                    let filter = SaleFilter { range, items, search };
                    let listing = sale::list_sales(state, &caller, &filter).await?;
                    emit(csv, &listing, &listing.rows)?;
                }
                ListTarget::Receipts => {
                    let filter = ReceiptFilter { range, search };
                    let listing = receipt::list_receipts(state, &caller, &filter).await?;
                    emit(csv, &listing, &listing.rows)?;
                }
                ListTarget::Stock => {
                    let listing = stock::list_stock(state, &caller).await?;
                    emit(csv, &listing, &listing.rows)?;
                }
            }
        }
        Command::Report { target, range, csv } => {
            let caller = authenticate(state)?;
            run_report(state, &caller, target, &range, csv, today).await?;
        }
        Command::Reset { confirm } => {
            let caller = authenticate(state)?;
            if !confirm {
                bail!("reset deletes every expense, stock row, sale and receipt; pass --confirm");
            }
            admin::reset_all(state, &caller).await?;
            println!("✓ All bookkeeping data deleted");
        }
    }

    Ok(())
}

fn authenticate(state: &AppState) -> Result<AuthContext> {
    let token = env_secret(TOKEN_VAR)?;
    Ok(state.sessions().authenticate(&token)?)
}

async fn run_report(
    state: &AppState,
    caller: &AuthContext,
    target: ReportTarget,
    range: &RangeArgs,
    csv: bool,
    today: NaiveDate,
) -> Result<()> {
    match target {
        ReportTarget::Expenses => {
            let summary = report::expense_summary(state, caller, range.range(today)?).await?;
            emit(csv, &summary, &summary.categories)
        }
        ReportTarget::Sales => {
            let summary = report::sales_summary(state, caller, range.range(today)?).await?;
            emit(csv, &summary, &summary.by_variant)
        }
        ReportTarget::Inventory => {
            let valuation = report::inventory_valuation(state, caller).await?;
            emit(csv, &valuation, &valuation.rows)
        }
        ReportTarget::Trends => {
            let trends = report::monthly_trends(state, caller, range.trends_since(today)).await?;
            emit(csv, &trends, &trends)
        }
        ReportTarget::Dashboard => {
            if csv {
                bail!("the dashboard has no CSV form");
            }
            let dash = report::dashboard(state, caller, today).await?;
            print_json(&dash)
        }
    }
}

/// Prints `rows` as CSV when `--csv` is set, otherwise `value` as JSON.
fn emit<T: Serialize, R: CsvRecord>(csv: bool, value: &T, rows: &[R]) -> Result<()> {
    if csv {
        print!("{}", to_csv(rows));
        Ok(())
    } else {
        print_json(value)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
