use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    error::ApiError,
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, CreatedTaskResponse, FinalizedTaskResponse, TaskResponse},
        repo::{self, FinalizeChange, TaskStatus},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tareas", get(list_tasks).post(create_task))
        .route("/tareas/finalizar/:id", put(finalize_task))
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = repo::list_with_owner(&state.db).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreatedTaskResponse>), ApiError> {
    let task = repo::create(
        &state.db,
        &payload.title,
        &payload.description,
        payload.user_id,
        payload.expected_due_at,
    )
    .await?;

    info!(task_id = task.id, owner = ?task.owner_user_id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedTaskResponse {
            message: "Tarea registrada exitosamente",
            id: task.id,
        }),
    ))
}

/// Finalize a task. Not idempotent: a repeat call overwrites `finalized_at`
/// with the new current time and recomputes the late/on-time status from it.
#[instrument(skip(state))]
pub async fn finalize_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FinalizedTaskResponse>, ApiError> {
    let task = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("task not found"))?;

    let now = OffsetDateTime::now_utc();
    let change = FinalizeChange {
        finalized_at: now,
        status: TaskStatus::at_finalize(now, task.expected_due_at),
    };

    let task = repo::update_finalized(&state.db, id, change)
        .await?
        .ok_or(ApiError::NotFound("task not found"))?;

    info!(task_id = task.id, status = ?task.status, "task finalized");
    Ok(Json(FinalizedTaskResponse {
        message: "Tarea finalizada correctamente",
        id: task.id,
        status: task.status,
    }))
}
