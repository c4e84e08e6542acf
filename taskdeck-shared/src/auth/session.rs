/// Session token utilities and the session manager
///
/// This module is the single interface for session lifecycle:
/// [`SessionManager::begin_session`], [`SessionManager::resolve_session`]
/// and [`SessionManager::end_session`]. No framework callback registry sits
/// behind it; it is constructed with a pool at startup and injected where
/// needed.
///
/// # Security
///
/// - **Format**: 48 random alphanumeric chars (base62: [A-Za-z0-9])
/// - **Storage**: tokens are hashed with SHA-256 before storage, so a leaked
///   sessions table cannot be replayed
/// - **Expiry**: every session carries an absolute expiry; expired rows are
///   deleted the moment they are seen
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::session::SessionManager;
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> anyhow::Result<()> {
/// let sessions = SessionManager::new(pool, chrono::Duration::hours(168));
///
/// let token = sessions.begin_session(user_id).await?;
/// let user = sessions.resolve_session(&token).await?;
/// assert_eq!(user.id, user_id);
///
/// sessions.end_session(&token).await?;
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::session::Session;
use crate::models::user::User;

/// Length of a session token (characters)
pub const SESSION_TOKEN_LENGTH: usize = 48;

/// Generates a new session token
///
/// Uses base62 encoding (A-Z, a-z, 0-9) for cookie-safe tokens.
/// Token space: 62^48, far beyond guessability.
pub fn generate_session_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..SESSION_TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a session token for storage
///
/// Returns the hex-encoded SHA-256 digest (64 characters).
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token is missing, unknown, or expired
    #[error("no valid session")]
    NoSession,

    /// The session points at a user that no longer exists
    #[error("session references a missing user")]
    UserNotFound,

    /// The session store failed
    #[error("session store error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Manages the session lifecycle against the database-backed store
#[derive(Clone)]
pub struct SessionManager {
    pool: PgPool,
    ttl: Duration,
}

impl SessionManager {
    /// Creates a new session manager with the given time-to-live
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Returns the configured session time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Establishes a session for `user_id`
    ///
    /// Returns the plaintext token to place in the cookie; only its hash
    /// is persisted.
    pub async fn begin_session(&self, user_id: Uuid) -> Result<String, SessionError> {
        let token = generate_session_token();
        Session::create(&self.pool, &hash_session_token(&token), user_id, self.ttl).await?;

        tracing::debug!(%user_id, "session established");
        Ok(token)
    }

    /// Resolves a session token back into its user
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoSession`] if the token is unknown or expired
    ///   (an expired row is deleted on the spot)
    /// - [`SessionError::UserNotFound`] if the session is stale: it points
    ///   at a user record that no longer exists
    /// - [`SessionError::Storage`] on database failure
    pub async fn resolve_session(&self, token: &str) -> Result<User, SessionError> {
        let token_hash = hash_session_token(token);

        let session = Session::find_by_token_hash(&self.pool, &token_hash)
            .await?
            .ok_or(SessionError::NoSession)?;

        if session.is_expired() {
            Session::delete(&self.pool, &token_hash).await?;
            return Err(SessionError::NoSession);
        }

        User::find_by_id(&self.pool, session.user_id)
            .await?
            .ok_or(SessionError::UserNotFound)
    }

    /// Invalidates a session
    ///
    /// Idempotent: ending an already-invalid token is not an error.
    pub async fn end_session(&self, token: &str) -> Result<(), SessionError> {
        Session::delete(&self.pool, &hash_session_token(token)).await?;
        Ok(())
    }

    /// Removes expired sessions, returning how many were deleted
    pub async fn delete_expired(&self) -> Result<u64, SessionError> {
        let deleted = Session::delete_expired(&self.pool).await?;
        if deleted > 0 {
            tracing::debug!(deleted, "reaped expired sessions");
        }
        Ok(deleted)
    }
}
