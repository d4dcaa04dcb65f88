//! # Application State
//!
//! Everything a command needs, built once at startup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppState                                                               │
//! │  ├── Database        SqlitePool inside, thread-safe, cheap to clone     │
//! │  ├── AppConfig       read-only after startup                           │
//! │  └── SessionManager  signing key for session tokens                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use tracker_core::receipt::ReceiptHeader;
use tracker_db::{Database, DbConfig, DbError};

use crate::auth::SessionManager;
use crate::config::AppConfig;

pub struct AppState {
    db: Database,
    config: AppConfig,
    sessions: SessionManager,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, sessions: SessionManager) -> Self {
        AppState {
            db,
            config,
            sessions,
        }
    }

    /// Opens the database (running migrations) and prepares sessions.
    pub async fn init(config: AppConfig) -> Result<Self, DbError> {
        if let Some(dir) = config.database_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    DbError::ConnectionFailed(format!("cannot create {}: {}", dir.display(), e))
                })?;
            }
        }

        let db_config = DbConfig::new(&config.database_path)
            .max_connections(config.max_connections)
            .connect_timeout(config.connect_timeout());
        let db = Database::new(db_config).await?;

        info!(path = %config.database_path.display(), "Database connected and migrations applied");

        let sessions = SessionManager::from_config(&config);
        Ok(AppState::new(db, config, sessions))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// School details printed on receipts.
    pub fn receipt_header(&self) -> ReceiptHeader {
        ReceiptHeader {
            school_name: self.config.school_name.clone(),
            address_line: self.config.school_address.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::AuthContext;
    use chrono::{Duration, Utc};
    use tracker_core::Role;

    pub async fn state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = AppConfig {
            school_name: "Hillside Academy".to_string(),
            school_address: "P.O. Box 12, Nakuru".to_string(),
            session_secret: Some("test-secret".to_string()),
            ..AppConfig::default()
        };
        let sessions = SessionManager::from_config(&config);
        AppState::new(db, config, sessions)
    }

    pub fn auth(username: &str, role: Role) -> AuthContext {
        AuthContext {
            username: username.to_string(),
            role,
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    pub fn admin() -> AuthContext {
        auth("bursar", Role::Admin)
    }

    pub fn staff() -> AuthContext {
        auth("clerk", Role::Staff)
    }
}
