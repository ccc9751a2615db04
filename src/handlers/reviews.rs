use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::{Page, Review, ReviewCreate, ReviewUpdate, default_page, default_size},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    pub listing_id: Option<i32>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Paginated review list filtered by listing, creation window, and free-text
/// search over the author name and comment.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Page<Review>>, AppError> {
    let offset = (query.page - 1).max(0) * query.size;
    let pattern = query.search.as_ref().map(|s| format!("%{s}%"));

    let filter = "($1::int4 IS NULL OR listing_id = $1)
           AND ($2::text IS NULL OR created_at >= ($2::text)::timestamptz)
           AND ($3::text IS NULL OR created_at <= ($3::text)::timestamptz)
           AND ($4::text IS NULL OR user_name ILIKE $4 OR comment ILIKE $4)";

    let items = sqlx::query_as::<_, Review>(&format!(
        "SELECT * FROM reviews
         WHERE {filter}
         ORDER BY created_at DESC
         LIMIT $5 OFFSET $6"
    ))
    .bind(query.listing_id)
    .bind(&query.start_date)
    .bind(&query.end_date)
    .bind(&pattern)
    .bind(query.size)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM reviews WHERE {filter}"))
        .bind(query.listing_id)
        .bind(&query.start_date)
        .bind(&query.end_date)
        .bind(&pattern)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(Page::new(items, total, query.page, query.size)))
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<ReviewCreate>,
) -> Result<Json<Review>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (listing_id, user_name, rating, comment)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(payload.listing_id)
    .bind(&payload.user_name)
    .bind(payload.rating)
    .bind(&payload.comment)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(review))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Review>, AppError> {
    let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    Ok(Json(review))
}

/// Partial update; absent fields keep their current values.
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReviewUpdate>,
) -> Result<Json<Review>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let review = sqlx::query_as::<_, Review>(
        "UPDATE reviews SET
            user_name = COALESCE($2, user_name),
            rating = COALESCE($3, rating),
            comment = COALESCE($4, comment),
            updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&payload.user_name)
    .bind(payload.rating)
    .bind(&payload.comment)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Review>, AppError> {
    let review = sqlx::query_as::<_, Review>("DELETE FROM reviews WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    Ok(Json(review))
}
