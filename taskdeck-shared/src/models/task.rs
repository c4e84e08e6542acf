/// Task model and database operations
///
/// Tasks are the core entity of TaskDeck. Every operation here is scoped to
/// the owning user: reads filter by `created_by`, and writes match on
/// `(id, created_by)` so that at most one record can ever be affected.
/// `created_by` is set once at insert time and is never part of any UPDATE.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('high', 'medium', 'low');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(100) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date TIMESTAMPTZ,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{CreateTask, Task, TaskPriority};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, owner, CreateTask {
///     title: "Buy milk".to_string(),
///     description: None,
///     completed: false,
///     due_date: None,
///     priority: TaskPriority::Low,
///     tags: vec![],
/// }).await?;
///
/// let mine = Task::list_by_owner(&pool, owner).await?;
/// assert!(mine.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task priority level
///
/// Stored as the lowercase Postgres enum `task_priority`; serialized on the
/// wire with the capitalized variant names (`"High"`, `"Medium"`, `"Low"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum TaskPriority {
    /// Needs attention first
    High,

    /// The default level
    #[default]
    Medium,

    /// Can wait
    Low,
}

impl TaskPriority {
    /// Converts the priority to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "High",
            TaskPriority::Medium => "Medium",
            TaskPriority::Low => "Low",
        }
    }

    /// Parses a wire value; returns None for anything outside the enum
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(TaskPriority::High),
            "Medium" => Some(TaskPriority::Medium),
            "Low" => Some(TaskPriority::Low),
            _ => None,
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user; immutable after creation
    pub created_by: Uuid,

    /// Short title, at most 100 characters after trimming
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Completion flag
    pub completed: bool,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Priority level
    pub priority: TaskPriority,

    /// Ordered tag list
    pub tags: Vec<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// The owner is not part of this struct: it is passed separately to
/// [`Task::create`] from the authenticated request context, so a
/// client-supplied owner can never reach the insert.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Task title (already trimmed and validated by the caller)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Completion flag
    pub completed: bool,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Priority level
    pub priority: TaskPriority,

    /// Tag list
    pub tags: Vec<String>,
}

/// Input for partially updating a task
///
/// Only non-None fields are written; everything else is left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New completion flag
    pub completed: Option<bool>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New tag list (replaces the previous list)
    pub tags: Option<Vec<String>>,
}

impl Task {
    /// Creates a new task owned by `owner`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(pool: &PgPool, owner: Uuid, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (created_by, title, description, completed, due_date, priority, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, created_by, title, description, completed, due_date, priority, tags,
                      created_at, updated_at
            "#,
        )
        .bind(owner)
        .bind(data.title)
        .bind(data.description)
        .bind(data.completed)
        .bind(data.due_date)
        .bind(data.priority)
        .bind(data.tags)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, visible only to its owner
    ///
    /// Returns None both when the task does not exist and when it belongs to
    /// another user; callers must not be able to tell the two apart.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, created_by, title, description, completed, due_date, priority, tags,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1 AND created_by = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks owned by `owner`, newest first
    pub async fn list_by_owner(pool: &PgPool, owner: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, created_by, title, description, completed, due_date, priority, tags,
                   created_at, updated_at
            FROM tasks
            WHERE created_by = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update to an owned task
    ///
    /// Builds the SET clause dynamically from the fields present in `data`.
    /// The WHERE clause matches on both id and owner, so a task belonging to
    /// someone else yields None exactly like a missing one. An update with
    /// no fields still touches `updated_at` and returns the record.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.tags.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tags = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND created_by = $2 \
             RETURNING id, created_by, title, description, completed, due_date, priority, tags, \
             created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(tags) = data.tags {
            q = q.bind(tags);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes an owned task
    ///
    /// Returns true if a record was removed; false when the task does not
    /// exist or belongs to another user.
    pub async fn delete(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tasks owned by `owner`
    pub async fn count_by_owner(pool: &PgPool, owner: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE created_by = $1")
            .bind(owner)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::High.as_str(), "High");
        assert_eq!(TaskPriority::Medium.as_str(), "Medium");
        assert_eq!(TaskPriority::Low.as_str(), "Low");
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(TaskPriority::parse("High"), Some(TaskPriority::High));
        assert_eq!(TaskPriority::parse("Medium"), Some(TaskPriority::Medium));
        assert_eq!(TaskPriority::parse("Low"), Some(TaskPriority::Low));
        assert_eq!(TaskPriority::parse("low"), None);
        assert_eq!(TaskPriority::parse("Urgent"), None);
        assert_eq!(TaskPriority::parse(""), None);
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_priority_wire_format() {
        let json = serde_json::to_string(&TaskPriority::Low).unwrap();
        assert_eq!(json, "\"Low\"");

        let parsed: TaskPriority = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(parsed, TaskPriority::High);
    }

    #[test]
    fn test_update_task_default_is_empty() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.completed.is_none());
        assert!(update.due_date.is_none());
        assert!(update.priority.is_none());
        assert!(update.tags.is_none());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            description: None,
            completed: false,
            due_date: None,
            priority: TaskPriority::Low,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "Low");
        assert_eq!(json["completed"], false);
        assert!(json.get("createdBy").is_some());
        assert!(json.get("dueDate").is_some());
        assert!(json.get("created_by").is_none());
        assert_eq!(json["tags"], serde_json::json!([]));
    }

    // Ownership isolation (get/update/delete across users) is covered by
    // integration tests against a running database.
}
