//! Session authentication.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login(username, password)                                              │
//! │       │  argon2 verify against the credential store                     │
//! │       ▼                                                                 │
//! │  SessionManager::issue ──► HS256 token {sub, role, iat, exp, jti}       │
//! │                                                                         │
//! │  every other command                                                    │
//! │       │                                                                 │
//! │  SessionManager::authenticate(token) ──► AuthContext                    │
//! │       │  (signature and expiry checked)                                 │
//! │       ▼                                                                 │
//! │  command(&state, &auth, ...) ── auth.require_admin()? for reset         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;
use tracker_core::{Role, User};

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// The authenticated caller, passed explicitly to every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `FORBIDDEN` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            warn!(username = %self.username, "Admin operation refused");
            Err(ApiError::forbidden("This operation requires an admin account"))
        }
    }
}

/// An issued token and the context it grants.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub context: AuthContext,
}

/// Issues and validates session tokens.
pub struct SessionManager {
    secret: String,
    lifetime_secs: i64,
}

impl SessionManager {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        SessionManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Uses the configured secret, or a random one for this process only.
    pub fn from_config(config: &AppConfig) -> Self {
        let secret = match &config.session_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!(
                    "No session_secret configured; using a random per-process secret. \
                     Tokens will not survive a restart."
                );
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        };
        SessionManager::new(secret, config.session_lifetime_secs)
    }

    /// Issue a token for a verified user.
    pub fn issue(&self, user: &User) -> Result<Session, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = self.sign(&claims)?;
        Ok(Session {
            token,
            context: context_from(claims)?,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate a token and return the caller it identifies.
    pub fn authenticate(&self, token: &str) -> Result<AuthContext, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token.trim(),
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            warn!(error = %e, "Session token rejected");
            ApiError::unauthenticated("Session is invalid or has expired")
        })?;

        context_from(token_data.claims)
    }
}

fn context_from(claims: Claims) -> Result<AuthContext, ApiError> {
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .ok_or_else(|| ApiError::unauthenticated("Session is invalid or has expired"))?;

    Ok(AuthContext {
        username: claims.sub,
        role: claims.role,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn user(role: Role) -> User {
        User {
            id: 1,
            username: "bursar".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let manager = SessionManager::new("test-secret", 3600);
        let session = manager.issue(&user(Role::Admin)).unwrap();

        let auth = manager.authenticate(&session.token).unwrap();
        assert_eq!(auth, session.context);
        assert_eq!(auth.username, "bursar");
        assert!(auth.is_admin());
        assert!(auth.expires_at > Utc::now());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = SessionManager::new("secret-a", 3600)
            .issue(&user(Role::Staff))
            .unwrap()
            .token;

        let err = SessionManager::new("secret-b", 3600)
            .authenticate(&token)
            .unwrap_err();
        assert!(matches!(err.code, ErrorCode::Unauthenticated));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let manager = SessionManager::new("test-secret", 3600);
        let token = manager.issue(&user(Role::Staff)).unwrap().token;

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = Claims {
            sub: "bursar".to_string(),
            role: Role::Admin,
            iat: 0,
            exp: Utc::now().timestamp() + 3600,
            jti: "x".to_string(),
        };
        let forged_token = SessionManager::new("attacker", 3600).sign(&forged).unwrap();
        parts[1] = forged_token.split('.').nth(1).unwrap().to_string();

        assert!(manager.authenticate(&parts.join(".")).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = SessionManager::new("test-secret", 3600);
        let now = Utc::now().timestamp();
        let expired = Claims {
            sub: "bursar".to_string(),
            role: Role::Admin,
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = manager.sign(&expired).unwrap();

        let err = manager.authenticate(&token).unwrap_err();
        assert!(matches!(err.code, ErrorCode::Unauthenticated));
    }

    #[test]
    fn test_require_admin() {
        let ctx = |role| AuthContext {
            username: "someone".to_string(),
            role,
            expires_at: Utc::now(),
        };

        assert!(ctx(Role::Admin).require_admin().is_ok());
        let err = ctx(Role::Staff).require_admin().unwrap_err();
        assert!(matches!(err.code, ErrorCode::Forbidden));
    }

    #[test]
    fn test_random_secret_when_unconfigured() {
        let config = AppConfig::default();
        let a = SessionManager::from_config(&config);
        let b = SessionManager::from_config(&config);

        let token = a.issue(&user(Role::Staff)).unwrap().token;
        assert!(a.authenticate(&token).is_ok());
        assert!(b.authenticate(&token).is_err());
    }
}
