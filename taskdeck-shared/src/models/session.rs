/// Session model and database operations
///
/// A session maps a server-issued token to a user. Only the SHA-256 hash of
/// the token is stored; the plaintext value exists solely in the client's
/// cookie. Rows carry an absolute expiry and are removed on logout, when an
/// expired row is seen at resolve time, or by [`Session::delete_expired`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     token_hash VARCHAR(64) PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Session record binding a token hash to a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// SHA-256 hex digest of the session token
    pub token_hash: String,

    /// User this session authenticates
    pub user_id: Uuid,

    /// When the session was established
    pub created_at: DateTime<Utc>,

    /// When the session stops being honored
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Checks whether the session has passed its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Creates a session for `user_id` valid for `ttl`
    pub async fn create(
        pool: &PgPool,
        token_hash: &str,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<Self, sqlx::Error> {
        let expires_at = Utc::now() + ttl;

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token_hash, user_id, created_at, expires_at
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session by token hash
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token_hash, user_id, created_at, expires_at
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Deletes a session by token hash
    ///
    /// Deleting a hash with no matching row is not an error, which makes
    /// logout idempotent.
    pub async fn delete(pool: &PgPool, token_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Removes all expired sessions, returning how many were deleted
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired() {
        let expired = Session {
            token_hash: "a".repeat(64),
            user_id: Uuid::new_v4(),
            created_at: Utc::now() - Duration::hours(2),
            expires_at: Utc::now() - Duration::hours(1),
        };
        assert!(expired.is_expired());

        let live = Session {
            token_hash: "b".repeat(64),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!live.is_expired());
    }
}
