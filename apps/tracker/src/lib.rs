//! # School Tracker Application Library
//!
//! Configuration, sessions and the command layer behind the `tracker`
//! binary.
//!
//! ## Module Organization
//! ```text
//! tracker_app/
//! ├── lib.rs          ◄─── You are here (logging setup, exports)
//! ├── config.rs       ◄─── Layered AppConfig
//! ├── auth.rs         ◄─── SessionManager, AuthContext
//! ├── state.rs        ◄─── AppState (database + config + sessions)
//! ├── commands/       ◄─── One module per area, Result<T, ApiError>
//! ├── cli.rs          ◄─── clap definition for the binary
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()        RUST_LOG or "info,tracker=debug,sqlx=warn"    │
//! │  2. AppConfig::load()     defaults → tracker.toml → TRACKER_* env       │
//! │  3. AppState::init()      open pool, run migrations, session key        │
//! │  4. authenticate token    TRACKER_TOKEN → AuthContext                  │
//! │  5. run the command                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use auth::{AuthContext, SessionManager};
pub use config::AppConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tracker=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tracker_db=trace` - Trace the database layer only
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
