use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse},
        password::{hash_password, verify_password},
        repo,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/usuarios", get(list_users))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if repo::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::create(&state.db, &payload.email, &payload.name, &hash).await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuario registrado exitosamente",
            user_name: user.name,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::NotFound("user not found"))?;

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(email = %payload.email, user_id = user.id, "login invalid password");
        return Err(ApiError::Unauthorized("invalid password"));
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        message: "Inicio de sesión exitoso",
        user_name: user.name,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = repo::list_all(&state.db).await?;
    let items = users
        .into_iter()
        .map(|u| UserResponse {
            id: u.id,
            name: u.name,
            email: u.email,
        })
        .collect();
    Ok(Json(items))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::PgPool;

    use super::*;
    use crate::config::AppConfig;

    fn test_state(pool: PgPool) -> AppState {
        let config = Arc::new(AppConfig {
            database_url: String::new(),
        });
        AppState::from_parts(pool, config)
    }

    fn register_body(email: &str, name: &str, password: &str) -> Json<RegisterRequest> {
        Json(RegisterRequest {
            email: email.into(),
            name: name.into(),
            password: password.into(),
        })
    }

    fn login_body(email: &str, password: &str) -> Json<LoginRequest> {
        Json(LoginRequest {
            email: email.into(),
            password: password.into(),
        })
    }

    #[sqlx::test]
    async fn duplicate_registration_is_rejected(pool: PgPool) {
        let state = test_state(pool);

        let (status, body) = register(
            State(state.clone()),
            register_body("test@mail.com", "Test User", "test123"),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.0.user_name, "Test User");

        // Same address, different casing: the lowercase normalization must
        // still catch it.
        let err = register(
            State(state),
            register_body("Test@Mail.com", "Test User", "test123"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[sqlx::test]
    async fn login_unknown_email_is_not_found(pool: PgPool) {
        let state = test_state(pool);
        let err = login(State(state), login_body("nobody@mail.com", "test123"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[sqlx::test]
    async fn login_wrong_password_is_unauthorized(pool: PgPool) {
        let state = test_state(pool);
        register(
            State(state.clone()),
            register_body("test@mail.com", "Test User", "test123"),
        )
        .await
        .unwrap();

        let err = login(State(state), login_body("test@mail.com", "wrongpass"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[sqlx::test]
    async fn login_success_returns_user_name(pool: PgPool) {
        let state = test_state(pool);
        register(
            State(state.clone()),
            register_body("Test@Mail.com", "Test User", "test123"),
        )
        .await
        .unwrap();

        let body = login(State(state), login_body("test@mail.com", "test123"))
            .await
            .unwrap();
        assert_eq!(body.0.user_name, "Test User");
    }
}
