use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Lifecycle of a task. A task starts `in_progress` and moves exactly once
/// into one of the finalized states (repeat finalize calls may move it
/// between the two finalized states, never back to `in_progress`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    InProgress,
    Finalized,
    FinalizedLate,
}

impl TaskStatus {
    /// Status a task takes when finalized at `now`: on time unless an
    /// expected due date exists and has already passed.
    pub fn at_finalize(now: OffsetDateTime, expected_due_at: Option<OffsetDateTime>) -> Self {
        match expected_due_at {
            Some(due) if now > due => TaskStatus::FinalizedLate,
            _ => TaskStatus::Finalized,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: OffsetDateTime,
    pub expected_due_at: Option<OffsetDateTime>,
    pub finalized_at: Option<OffsetDateTime>,
    pub owner_user_id: Option<i32>,
}

/// A task joined with its owner's name; `owner_name` is "" when the owner id
/// is null or matches no user.
#[derive(Debug, Clone, FromRow)]
pub struct TaskWithOwner {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: OffsetDateTime,
    pub expected_due_at: Option<OffsetDateTime>,
    pub finalized_at: Option<OffsetDateTime>,
    pub owner_user_id: Option<i32>,
    pub owner_name: String,
}

/// Changeset applied by the finalize operation.
#[derive(Debug, Clone, Copy)]
pub struct FinalizeChange {
    pub finalized_at: OffsetDateTime,
    pub status: TaskStatus,
}

/// Insert a new task as `in_progress`. The owner id is stored as given; no
/// check that it names an existing user.
pub async fn create(
    db: &PgPool,
    title: &str,
    description: &str,
    owner_user_id: i32,
    expected_due_at: Option<OffsetDateTime>,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (title, description, owner_user_id, expected_due_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, description, status, created_at,
                  expected_due_at, finalized_at, owner_user_id
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(owner_user_id)
    .bind(expected_due_at)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: i32) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, title, description, status, created_at,
               expected_due_at, finalized_at, owner_user_id
        FROM tasks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list_with_owner(db: &PgPool) -> Result<Vec<TaskWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, TaskWithOwner>(
        r#"
        SELECT t.id, t.title, t.description, t.status, t.created_at,
               t.expected_due_at, t.finalized_at, t.owner_user_id,
               COALESCE(u.name, '') AS owner_name
        FROM tasks t
        LEFT JOIN users u ON u.id = t.owner_user_id
        "#,
    )
    .fetch_all(db)
    .await
}

/// Apply a finalize changeset to the task with `id`, returning the updated
/// row, or `None` if no such task exists.
pub async fn update_finalized(
    db: &PgPool,
    id: i32,
    change: FinalizeChange,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks
        SET finalized_at = $2, status = $3
        WHERE id = $1
        RETURNING id, title, description, status, created_at,
                  expected_due_at, finalized_at, owner_user_id
        "#,
    )
    .bind(id)
    .bind(change.finalized_at)
    .bind(change.status)
    .fetch_optional(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn finalize_before_due_is_on_time() {
        let now = OffsetDateTime::now_utc();
        let due = now + Duration::hours(1);
        assert_eq!(TaskStatus::at_finalize(now, Some(due)), TaskStatus::Finalized);
    }

    #[test]
    fn finalize_after_due_is_late() {
        let now = OffsetDateTime::now_utc();
        let due = now - Duration::hours(1);
        assert_eq!(
            TaskStatus::at_finalize(now, Some(due)),
            TaskStatus::FinalizedLate
        );
    }

    #[test]
    fn finalize_without_due_date_is_on_time() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(TaskStatus::at_finalize(now, None), TaskStatus::Finalized);
    }

    #[test]
    fn finalize_exactly_at_due_is_on_time() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(TaskStatus::at_finalize(now, Some(now)), TaskStatus::Finalized);
    }

    #[sqlx::test]
    async fn list_resolves_owner_name(pool: PgPool) {
        let owner = crate::users::repo::create(&pool, "owner@mail.com", "Owner User", "hash")
            .await
            .unwrap();
        let task = create(&pool, "t", "d", owner.id, None).await.unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.finalized_at.is_none());

        let rows = list_with_owner(&pool).await.unwrap();
        let row = rows.iter().find(|r| r.id == task.id).unwrap();
        assert_eq!(row.owner_name, "Owner User");
        assert_eq!(row.owner_user_id, Some(owner.id));
    }

    #[sqlx::test]
    async fn list_renders_unresolvable_owner_as_empty(pool: PgPool) {
        let task = create(&pool, "t", "d", 999_999, None).await.unwrap();
        let rows = list_with_owner(&pool).await.unwrap();
        let row = rows.iter().find(|r| r.id == task.id).unwrap();
        assert_eq!(row.owner_name, "");
    }

    #[sqlx::test]
    async fn finalize_past_due_task_is_late(pool: PgPool) {
        let now = OffsetDateTime::now_utc();
        let task = create(&pool, "t", "d", 1, Some(now - Duration::hours(1)))
            .await
            .unwrap();
        let change = FinalizeChange {
            finalized_at: now,
            status: TaskStatus::at_finalize(now, task.expected_due_at),
        };
        let task = update_finalized(&pool, task.id, change)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(task.status, TaskStatus::FinalizedLate);
        assert!(task.finalized_at.is_some());
    }

    #[sqlx::test]
    async fn finalize_missing_task_returns_none(pool: PgPool) {
        assert!(find_by_id(&pool, 42).await.unwrap().is_none());
        let change = FinalizeChange {
            finalized_at: OffsetDateTime::now_utc(),
            status: TaskStatus::Finalized,
        };
        assert!(update_finalized(&pool, 42, change).await.unwrap().is_none());
    }

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "in_progress"
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::Finalized).unwrap(),
            "finalized"
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::FinalizedLate).unwrap(),
            "finalized_late"
        );
    }
}
