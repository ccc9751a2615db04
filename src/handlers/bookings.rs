use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::{AdminBooking, Booking, BookingCreate, BookingUpdate, Page, default_page, default_size},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    pub status: Option<String>,
}

/// Paginated booking list with the joined display names the admin UI shows.
/// `status=all` (the default) disables the filter.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Page<AdminBooking>>, AppError> {
    let status = query.status.unwrap_or_else(|| "all".to_string());
    let offset = (query.page - 1).max(0) * query.size;

    let items = sqlx::query_as::<_, AdminBooking>(
        "SELECT b.id, b.user_id, b.listing_id, b.check_in, b.check_out, b.guests,
                b.total_price, b.status, b.customer_name, b.customer_phone, b.created_at,
                COALESCE(b.customer_name, u.full_name, 'User #' || b.user_id::text, 'Guest')
                    AS user_name,
                COALESCE(l.title, 'Listing #' || b.listing_id::text, 'Listing') AS listing_title
         FROM bookings b
         LEFT JOIN users u ON u.id = b.user_id
         LEFT JOIN listings l ON l.id = b.listing_id
         WHERE ($1 = 'all' OR b.status = $1)
         ORDER BY b.id DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(&status)
    .bind(query.size)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE ($1 = 'all' OR status = $1)")
            .bind(&status)
            .fetch_one(&state.pool)
            .await?;

    Ok(Json(Page::new(items, total, query.page, query.size)))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<BookingCreate>,
) -> Result<Json<Booking>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = sqlx::query_as::<_, Booking>(
        "INSERT INTO bookings
            (user_id, listing_id, check_in, check_out, guests, total_price, status,
             customer_name, customer_phone)
         VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'pending'), $8, $9)
         RETURNING *",
    )
    .bind(payload.user_id)
    .bind(payload.listing_id)
    .bind(payload.check_in)
    .bind(payload.check_out)
    .bind(payload.guests)
    .bind(payload.total_price)
    .bind(&payload.status)
    .bind(&payload.customer_name)
    .bind(&payload.customer_phone)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(booking))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Booking>, AppError> {
    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    Ok(Json(booking))
}

/// Partial update; absent fields keep their current values.
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<BookingUpdate>,
) -> Result<Json<Booking>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET
            check_in = COALESCE($2, check_in),
            check_out = COALESCE($3, check_out),
            guests = COALESCE($4, guests),
            total_price = COALESCE($5, total_price),
            status = COALESCE($6, status),
            customer_name = COALESCE($7, customer_name),
            customer_phone = COALESCE($8, customer_phone)
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(payload.check_in)
    .bind(payload.check_out)
    .bind(payload.guests)
    .bind(payload.total_price)
    .bind(&payload.status)
    .bind(&payload.customer_name)
    .bind(&payload.customer_phone)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    Ok(Json(booking))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Booking>, AppError> {
    let booking = sqlx::query_as::<_, Booking>("DELETE FROM bookings WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    Ok(Json(booking))
}
