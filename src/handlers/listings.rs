use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    cache::LISTING_CACHE_TTL,
    error::AppError,
    models::{Listing, ListingCreate, ListingUpdate, Page, default_page, default_size},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub region: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

/// Deterministic cache key for one search window. Free-text filters are
/// hashed so the key stays a flat Redis token regardless of their content.
fn listing_cache_key(query: &ListingQuery) -> String {
    let mut hasher = DefaultHasher::new();
    query.region.as_deref().map(str::to_lowercase).hash(&mut hasher);
    query.search.as_deref().map(str::to_lowercase).hash(&mut hasher);

    format!(
        "listings:v1:{}:{}:{:x}",
        query.page,
        query.size,
        hasher.finish()
    )
}

/// Paginated listing search, served from the cache when a fresh entry exists.
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Page<Listing>>, AppError> {
    let key = listing_cache_key(&query);
    let pool = state.pool.clone();

    let page = state
        .cache
        .get_or_compute(&key, LISTING_CACHE_TTL, || async move {
            fetch_listing_page(&pool, &query).await
        })
        .await?;

    Ok(Json(page))
}

async fn fetch_listing_page(
    pool: &PgPool,
    query: &ListingQuery,
) -> Result<Page<Listing>, AppError> {
    let offset = (query.page - 1).max(0) * query.size;
    let pattern = query.search.as_ref().map(|s| format!("%{s}%"));

    let items = sqlx::query_as::<_, Listing>(
        "SELECT * FROM listings
         WHERE ($1::text IS NULL OR region = $1)
           AND ($2::text IS NULL OR title ILIKE $2 OR location ILIKE $2)
         ORDER BY id DESC
         LIMIT $3 OFFSET $4",
    )
    .bind(&query.region)
    .bind(&pattern)
    .bind(query.size)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM listings
         WHERE ($1::text IS NULL OR region = $1)
           AND ($2::text IS NULL OR title ILIKE $2 OR location ILIKE $2)",
    )
    .bind(&query.region)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok(Page::new(items, total, query.page, query.size))
}

pub async fn create_listing(
    State(state): State<AppState>,
    Json(payload): Json<ListingCreate>,
) -> Result<Json<Listing>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = sqlx::query_as::<_, Listing>(
        "INSERT INTO listings
            (title, region, location, price_per_night, guests_max, rooms, beds, baths,
             amenities, images, video_url, description)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                 COALESCE($9, '{}'::jsonb), COALESCE($10, '[]'::jsonb), $11, $12)
         RETURNING *",
    )
    .bind(&payload.title)
    .bind(&payload.region)
    .bind(&payload.location)
    .bind(payload.price_per_night)
    .bind(payload.guests_max)
    .bind(payload.rooms)
    .bind(payload.beds)
    .bind(payload.baths)
    .bind(&payload.amenities)
    .bind(&payload.images)
    .bind(&payload.video_url)
    .bind(&payload.description)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(listing))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Listing>, AppError> {
    let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    Ok(Json(listing))
}

/// Partial update; absent fields keep their current values.
pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ListingUpdate>,
) -> Result<Json<Listing>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = sqlx::query_as::<_, Listing>(
        "UPDATE listings SET
            title = COALESCE($2, title),
            region = COALESCE($3, region),
            location = COALESCE($4, location),
            price_per_night = COALESCE($5, price_per_night),
            guests_max = COALESCE($6, guests_max),
            rooms = COALESCE($7, rooms),
            beds = COALESCE($8, beds),
            baths = COALESCE($9, baths),
            amenities = COALESCE($10, amenities),
            images = COALESCE($11, images),
            video_url = COALESCE($12, video_url),
            description = COALESCE($13, description),
            updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&payload.title)
    .bind(&payload.region)
    .bind(&payload.location)
    .bind(payload.price_per_night)
    .bind(payload.guests_max)
    .bind(payload.rooms)
    .bind(payload.beds)
    .bind(payload.baths)
    .bind(&payload.amenities)
    .bind(&payload.images)
    .bind(&payload.video_url)
    .bind(&payload.description)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    Ok(Json(listing))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Listing>, AppError> {
    let listing = sqlx::query_as::<_, Listing>("DELETE FROM listings WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    Ok(Json(listing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(region: Option<&str>, search: Option<&str>, page: i64, size: i64) -> ListingQuery {
        ListingQuery {
            region: region.map(String::from),
            search: search.map(String::from),
            page,
            size,
        }
    }

    #[test]
    fn identical_queries_share_a_key() {
        let a = listing_cache_key(&query(Some("tashkent"), Some("pool"), 1, 10));
        let b = listing_cache_key(&query(Some("tashkent"), Some("pool"), 1, 10));
        assert_eq!(a, b);
    }

    #[test]
    fn filter_case_does_not_split_the_cache() {
        let a = listing_cache_key(&query(Some("Tashkent"), None, 1, 10));
        let b = listing_cache_key(&query(Some("tashkent"), None, 1, 10));
        assert_eq!(a, b);
    }

    #[test]
    fn different_windows_get_different_keys() {
        let base = listing_cache_key(&query(Some("tashkent"), None, 1, 10));
        assert_ne!(base, listing_cache_key(&query(Some("tashkent"), None, 2, 10)));
        assert_ne!(base, listing_cache_key(&query(Some("tashkent"), None, 1, 20)));
        assert_ne!(base, listing_cache_key(&query(Some("samarkand"), None, 1, 10)));
        assert_ne!(base, listing_cache_key(&query(None, None, 1, 10)));
    }

    #[test]
    fn absent_and_empty_filters_are_distinct() {
        let absent = listing_cache_key(&query(None, None, 1, 10));
        let empty = listing_cache_key(&query(Some(""), None, 1, 10));
        assert_ne!(absent, empty);
    }
}
