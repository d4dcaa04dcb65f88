//! # Admin Commands

use tracing::warn;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;

/// Deletes all expenses, stock, sales and receipts. Accounts are kept.
///
/// ## Errors
/// * `FORBIDDEN` - caller is not an admin; nothing is deleted
pub async fn reset_all(state: &AppState, auth: &AuthContext) -> Result<(), ApiError> {
    auth.require_admin()?;

    warn!(by = %auth.username, "reset_all command");
    state.db().reset_all().await?;
    Ok(())
}
