//! # Auth Commands
//!
//! Login and account management.

use tracing::{debug, info, warn};

use crate::auth::{AuthContext, Session};
use crate::error::ApiError;
use crate::state::AppState;
use tracker_core::Role;

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Verifies credentials and issues a session token.
///
/// Unknown user and wrong password fail identically.
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<Session, ApiError> {
    debug!(username = %username.trim(), "login command");

    let user = state
        .db()
        .users()
        .verify_credentials(username, password)
        .await?
        .ok_or_else(|| {
            warn!(username = %username.trim(), "Login failed");
            ApiError::unauthenticated(BAD_CREDENTIALS)
        })?;

    let session = state.sessions().issue(&user)?;
    info!(username = %user.username, role = %user.role, "User logged in");
    Ok(session)
}

/// Creates the first admin account on an empty credential store.
///
/// ## Errors
/// * `FORBIDDEN` - accounts already exist
pub async fn bootstrap_admin(state: &AppState, username: &str, password: &str) -> Result<(), ApiError> {
    if state.db().users().count().await? > 0 {
        return Err(ApiError::forbidden(
            "Accounts already exist; sign in as an admin to add users",
        ));
    }

    let user = state.db().users().create(username, password, Role::Admin).await?;
    info!(username = %user.username, "Bootstrap admin created");
    Ok(())
}

/// Creates an account. Admin only.
pub async fn create_user(
    state: &AppState,
    auth: &AuthContext,
    username: &str,
    password: &str,
    role: Role,
) -> Result<(), ApiError> {
    auth.require_admin()?;
    debug!(by = %auth.username, %role, "create_user command");

    state.db().users().create(username, password, role).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::test_support::{admin, staff, state};

    #[tokio::test]
    async fn test_bootstrap_then_login() {
        let state = state().await;
        bootstrap_admin(&state, "bursar", "ledger-2024").await.unwrap();

        let session = login(&state, "bursar", "ledger-2024").await.unwrap();
        let auth = state.sessions().authenticate(&session.token).unwrap();
        assert_eq!(auth.username, "bursar");
        assert!(auth.is_admin());
    }

    #[tokio::test]
    async fn test_bootstrap_only_once() {
        let state = state().await;
        bootstrap_admin(&state, "bursar", "ledger-2024").await.unwrap();

        let err = bootstrap_admin(&state, "intruder", "password1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let state = state().await;
        bootstrap_admin(&state, "bursar", "ledger-2024").await.unwrap();

        let wrong_password = login(&state, "bursar", "not-it-at-all").await.unwrap_err();
        let unknown_user = login(&state, "ghost", "ledger-2024").await.unwrap_err();

        assert_eq!(wrong_password.code, ErrorCode::Unauthenticated);
        assert_eq!(wrong_password.code, unknown_user.code);
        assert_eq!(wrong_password.message, unknown_user.message);
    }

    #[tokio::test]
    async fn test_only_admin_creates_users() {
        let state = state().await;

        let err = create_user(&state, &staff(), "newbie", "password1", Role::Staff)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        create_user(&state, &admin(), "newbie", "password1", Role::Staff)
            .await
            .unwrap();
        let session = login(&state, "newbie", "password1").await.unwrap();
        assert!(!session.context.is_admin());
    }
}
