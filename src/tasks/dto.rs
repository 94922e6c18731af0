use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::tasks::repo::{TaskStatus, TaskWithOwner};

/// Request body for task creation. `fecha` is the expected due date and may
/// be omitted or null; `user_id` is required on the wire but stored without
/// checking it names an existing user.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    pub user_id: i32,
    #[serde(rename = "fecha", default, with = "time::serde::rfc3339::option")]
    pub expected_due_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct CreatedTaskResponse {
    pub message: &'static str,
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct FinalizedTaskResponse {
    pub message: &'static str,
    pub id: i32,
    #[serde(rename = "estado")]
    pub status: TaskStatus,
}

/// Task as returned by the listing endpoint: the row plus the resolved owner
/// name ("" when the owner id matches no user).
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "estado")]
    pub status: TaskStatus,
    #[serde(rename = "fecha_creacion", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        rename = "fecha_finalizacion_esperada",
        with = "time::serde::rfc3339::option"
    )]
    pub expected_due_at: Option<OffsetDateTime>,
    #[serde(rename = "fecha_finalizacion", with = "time::serde::rfc3339::option")]
    pub finalized_at: Option<OffsetDateTime>,
    #[serde(rename = "id_usuario")]
    pub owner_user_id: Option<i32>,
    #[serde(rename = "nombre_usuario")]
    pub owner_name: String,
}

impl From<TaskWithOwner> for TaskResponse {
    fn from(t: TaskWithOwner) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            created_at: t.created_at,
            expected_due_at: t.expected_due_at,
            finalized_at: t.finalized_at,
            owner_user_id: t.owner_user_id,
            owner_name: t.owner_name,
        }
    }
}
