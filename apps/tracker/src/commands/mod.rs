//! # Commands Module
//!
//! The command surface the CLI (or any other front end) calls.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── auth.rs     ◄─── Login, bootstrap admin, user creation
//! ├── expense.rs  ◄─── Expense entry and listings
//! ├── stock.rs    ◄─── Deliveries, stock list, availability
//! ├── sale.rs     ◄─── Sale recording and listings
//! ├── receipt.rs  ◄─── Receipt lookup and HTML reprint
//! ├── report.rs   ◄─── Summaries, valuation, trends, dashboard
//! └── admin.rs    ◄─── Reset (admin only)
//! ```
//!
//! ## Calling Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let auth = state.sessions().authenticate(&token)?;                     │
//! │                                                                         │
//! │  commands::sale::record_sale(&state, &auth, new_sale, true).await       │
//! │         │                                                               │
//! │         │  &AppState    ◄── database, config, sessions                  │
//! │         │  &AuthContext ◄── who is calling (issued_by, admin checks)    │
//! │         ▼                                                               │
//! │  Result<SaleOutcome, ApiError>                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `auth::login` and `auth::bootstrap_admin` run without an
//! [`AuthContext`](crate::auth::AuthContext).

pub mod admin;
pub mod auth;
pub mod expense;
pub mod receipt;
pub mod report;
pub mod sale;
pub mod stock;
