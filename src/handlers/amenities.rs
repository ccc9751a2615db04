use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    error::AppError,
    models::{Amenity, AmenityCreate, AmenityUpdate},
    state::AppState,
};

pub async fn list_amenities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Amenity>>, AppError> {
    let amenities = sqlx::query_as::<_, Amenity>("SELECT * FROM amenities ORDER BY id")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(amenities))
}

pub async fn create_amenity(
    State(state): State<AppState>,
    Json(payload): Json<AmenityCreate>,
) -> Result<Json<Amenity>, AppError> {
    let amenity = sqlx::query_as::<_, Amenity>(
        "INSERT INTO amenities (name_uz, name_ru, name_en, icon)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(&payload.name_uz)
    .bind(&payload.name_ru)
    .bind(&payload.name_en)
    .bind(&payload.icon)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(amenity))
}

/// Partial update; absent fields keep their current values.
pub async fn update_amenity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AmenityUpdate>,
) -> Result<Json<Amenity>, AppError> {
    let amenity = sqlx::query_as::<_, Amenity>(
        "UPDATE amenities SET
            name_uz = COALESCE($2, name_uz),
            name_ru = COALESCE($3, name_ru),
            name_en = COALESCE($4, name_en),
            icon = COALESCE($5, icon)
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&payload.name_uz)
    .bind(&payload.name_ru)
    .bind(&payload.name_en)
    .bind(&payload.icon)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Amenity not found".to_string()))?;

    Ok(Json(amenity))
}

pub async fn delete_amenity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Amenity>, AppError> {
    let amenity = sqlx::query_as::<_, Amenity>("DELETE FROM amenities WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Amenity not found".to_string()))?;

    Ok(Json(amenity))
}
