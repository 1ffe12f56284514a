use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::entities::user;
use crate::db::repositories::UserRepository;
use crate::db::validation::{self, PASSWORD_MIN, USERNAME_MAX};
use crate::error::{AppError, Result, ValidationErrors};

/// Who is making a request. Passed explicitly into operations that need a
/// signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(user::Model),
}

impl Identity {
    pub fn user(&self) -> Option<&user::Model> {
        match self {
            Self::User(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.user().map(|u| u.username.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn require_user(&self) -> Result<&user::Model> {
        self.user().ok_or(AppError::AuthenticationRequired)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    fn validate_for_sign_up(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        validation::required(&mut errors, "username", &self.username);
        validation::max_chars(&mut errors, "username", &self.username, USERNAME_MAX);
        validation::username_chars(&mut errors, "username", &self.username);
        validation::min_chars(&mut errors, "password", &self.password, PASSWORD_MIN);
        errors.into_result()
    }
}

/// A freshly issued session. `token` is only ever handed to the client.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: user::Model,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AccountService {
    users: UserRepository,
    session_ttl: Duration,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(db: DatabaseConnection, session_ttl_hours: i64, bcrypt_cost: u32) -> Self {
        Self {
            users: UserRepository::new(db),
            session_ttl: Duration::hours(session_ttl_hours),
            bcrypt_cost,
        }
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<user::Model> {
        credentials.validate_for_sign_up()?;

        if self
            .users
            .find_by_username(&credentials.username)
            .await?
            .is_some()
        {
            return Err(AppError::IntegrityConflict(
                "A user with that username already exists.".to_string(),
            ));
        }

        let password_hash = hash_password(credentials.password.clone(), self.bcrypt_cost).await?;
        let user = self.users.create(&credentials.username, password_hash).await?;

        info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Checks the password and opens a new session. Unknown usernames and
    /// wrong passwords fail the same way.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginSession> {
        let user = self
            .users
            .find_by_username(&credentials.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(credentials.password.clone(), user.password_hash.clone()).await? {
            debug!("Rejected password for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let purged = self.users.delete_expired_sessions().await?;
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }

        let token = generate_session_token();
        let expires_at = Utc::now() + self.session_ttl;
        self.users
            .create_session(user.id, hash_session_token(&token), expires_at)
            .await?;

        info!("User {} logged in", user.id);
        Ok(LoginSession {
            user,
            token,
            expires_at,
        })
    }

    /// Ends the session behind `token`. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<()> {
        let removed = self.users.delete_session(&hash_session_token(token)).await?;
        debug!("Logout removed {} sessions", removed);
        Ok(())
    }

    /// Maps a presented token to an identity. Missing, unknown and expired
    /// tokens all resolve to `Identity::Anonymous`.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Identity> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Identity::Anonymous);
        };

        let token_hash = hash_session_token(token);
        let Some(session) = self.users.find_session(&token_hash).await? else {
            return Ok(Identity::Anonymous);
        };

        if session.expires_at <= Utc::now() {
            self.users.delete_session(&token_hash).await?;
            debug!("Session {} expired", session.id);
            return Ok(Identity::Anonymous);
        }

        Ok(self
            .users
            .find_by_id(session.user_id)
            .await?
            .map(Identity::User)
            .unwrap_or(Identity::Anonymous))
    }
}

/// 32 random bytes, URL-safe base64 without padding.
pub fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
}

async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_generation() {
        let token = generate_session_token();
        assert_eq!(token.len(), 43);
        assert_ne!(token, generate_session_token());
    }

    #[test]
    fn test_session_token_hash_is_stable() {
        let token = "test_token_1234567890";
        assert_eq!(hash_session_token(token), hash_session_token(token));
        assert_ne!(hash_session_token(token), token);
        assert_eq!(hash_session_token(token).len(), 43);
    }

    #[test]
    fn test_anonymous_identity_requires_login() {
        let identity = Identity::Anonymous;
        assert!(!identity.is_authenticated());
        assert!(matches!(
            identity.require_user(),
            Err(AppError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_sign_up_validation() {
        let credentials = Credentials {
            username: "bad name".to_string(),
            password: "short".to_string(),
        };
        match credentials.validate_for_sign_up() {
            Err(AppError::Validation(errors)) => {
                assert!(errors.contains("username"));
                assert!(errors.contains("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
