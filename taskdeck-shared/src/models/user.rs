/// User model and database operations
///
/// Users are created from Google OAuth identities. The `google_id` column
/// holds the provider-issued subject claim and is unique across all users;
/// once created, a user record is never updated or deleted by the
/// application.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     google_id VARCHAR(255) NOT NULL UNIQUE,
///     email VARCHAR(255),
///     display_name VARCHAR(255),
///     avatar_url VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::user::{CreateUser, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::find_or_create(
///     &pool,
///     CreateUser {
///         google_id: "118234567890".to_string(),
///         email: Some("user@example.com".to_string()),
///         display_name: Some("Jane Doe".to_string()),
///         avatar_url: None,
///     },
/// )
/// .await?;
/// println!("Authenticated user: {}", user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing an authenticated account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Google-issued subject identifier, unique across all users
    pub google_id: String,

    /// Email address reported by Google at first login
    pub email: Option<String>,

    /// Display name reported by Google at first login
    pub display_name: Option<String>,

    /// Profile picture URL reported by Google at first login
    pub avatar_url: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user from an OAuth profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Google-issued subject identifier
    pub google_id: String,

    /// Email address from the userinfo response
    pub email: Option<String>,

    /// Display name from the userinfo response
    pub display_name: Option<String>,

    /// Profile picture URL from the userinfo response
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the google_id already exists (unique constraint
    /// violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (google_id, email, display_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, google_id, email, display_name, avatar_url, created_at, updated_at
            "#,
        )
        .bind(data.google_id)
        .bind(data.email)
        .bind(data.display_name)
        .bind(data.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, google_id, email, display_name, avatar_url, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by their Google subject identifier
    ///
    /// Backed by the unique index on `google_id`.
    pub async fn find_by_google_id(
        pool: &PgPool,
        google_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, google_id, email, display_name, avatar_url, created_at, updated_at
            FROM users
            WHERE google_id = $1
            "#,
        )
        .bind(google_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Looks up a user by Google identity, creating the record on first login
    ///
    /// Two concurrent callbacks for the same new identity can both miss the
    /// lookup and race on the insert. The unique constraint on `google_id`
    /// makes the loser's insert fail with a unique violation, which is
    /// recovered here by re-fetching the winner's row. No application-level
    /// locking is involved.
    ///
    /// # Errors
    ///
    /// Returns an error only on database failure; the unique violation is
    /// never surfaced to callers.
    pub async fn find_or_create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        if let Some(user) = Self::find_by_google_id(pool, &data.google_id).await? {
            return Ok(user);
        }

        let google_id = data.google_id.clone();
        match Self::create(pool, data).await {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Lost the creation race; the row now exists.
                Self::find_by_google_id(pool, &google_id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let create_user = CreateUser {
            google_id: "118234567890".to_string(),
            email: Some("test@example.com".to_string()),
            display_name: Some("Test User".to_string()),
            avatar_url: None,
        };

        assert_eq!(create_user.google_id, "118234567890");
        assert_eq!(create_user.email.as_deref(), Some("test@example.com"));
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User {
            id: Uuid::new_v4(),
            google_id: "118234567890".to_string(),
            email: None,
            display_name: Some("Test User".to_string()),
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("googleId").is_some());
        assert!(json.get("displayName").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("google_id").is_none());
    }

    // Integration tests for database operations, including the concurrent
    // find_or_create race, require a running database.
}
