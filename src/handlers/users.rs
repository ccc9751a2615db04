use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    error::AppError,
    models::{User, UserCreate},
    state::AppState,
};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<Json<User>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&state.pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Validation(
            "A user with this email already exists".to_string(),
        ));
    }

    // Password hashing is out of scope; the auth surface is a stub
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, full_name, hashed_password, role, status)
         VALUES ($1, $2, $3, COALESCE($4, 'user'), COALESCE($5, 'active'))
         RETURNING *",
    )
    .bind(&payload.email)
    .bind(&payload.full_name)
    .bind(&payload.password)
    .bind(&payload.role)
    .bind(&payload.status)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(user))
}
