use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Offset-paginated response envelope shared by all list endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, size: i64) -> Self {
        Self {
            items,
            total,
            page,
            size,
            pages: page_count(total, size),
        }
    }
}

pub fn page_count(total: i64, size: i64) -> i64 {
    if total <= 0 || size <= 0 {
        return 0;
    }
    (total + size - 1) / size
}

pub fn default_page() -> i64 {
    1
}

pub fn default_size() -> i64 {
    10
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: i32,
    pub title: String,
    pub region: String,
    pub location: Option<String>,
    pub price_per_night: f64,
    pub rating: f64,
    pub reviews_count: i32,
    pub guests_max: i32,
    pub rooms: i32,
    pub beds: i32,
    pub baths: i32,
    pub amenities: serde_json::Value,
    pub images: serde_json::Value,
    pub video_url: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListingCreate {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub region: String,
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub price_per_night: f64,
    #[validate(range(min = 1))]
    pub guests_max: i32,
    pub rooms: i32,
    pub beds: i32,
    pub baths: i32,
    pub amenities: Option<serde_json::Value>,
    pub images: Option<serde_json::Value>,
    pub video_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub price_per_night: Option<f64>,
    #[validate(range(min = 1))]
    pub guests_max: Option<i32>,
    pub rooms: Option<i32>,
    pub beds: Option<i32>,
    pub baths: Option<i32>,
    pub amenities: Option<serde_json::Value>,
    pub images: Option<serde_json::Value>,
    pub video_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip)]
    pub hashed_password: String,
    pub role: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i32,
    pub user_id: Option<i32>,
    pub listing_id: Option<i32>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i32,
    pub total_price: f64,
    pub status: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Booking row joined with the display names the admin table shows.
#[derive(Debug, Serialize, FromRow)]
pub struct AdminBooking {
    pub id: i32,
    pub user_id: Option<i32>,
    pub listing_id: Option<i32>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i32,
    pub total_price: f64,
    pub status: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub user_name: String,
    pub listing_title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookingCreate {
    pub user_id: Option<i32>,
    pub listing_id: i32,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub guests: i32,
    #[validate(range(min = 0.0))]
    pub total_price: f64,
    pub status: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookingUpdate {
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub guests: Option<i32>,
    #[validate(range(min = 0.0))]
    pub total_price: Option<f64>,
    pub status: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i32,
    pub listing_id: i32,
    pub user_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewCreate {
    pub listing_id: i32,
    #[validate(length(min = 1))]
    pub user_name: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewUpdate {
    pub user_name: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Amenity {
    pub id: i32,
    pub name_uz: String,
    pub name_ru: String,
    pub name_en: String,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AmenityCreate {
    pub name_uz: String,
    pub name_ru: String,
    pub name_en: String,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AmenityUpdate {
    pub name_uz: Option<String>,
    pub name_ru: Option<String>,
    pub name_en: Option<String>,
    pub icon: Option<String>,
}

/// Result of one successful file upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    pub filename: String,
}

/// Partial update of the storage credential override rows.
#[derive(Debug, Deserialize)]
pub struct StorageSettingsUpdate {
    pub bot_token: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(25, 10), 3);
        assert_eq!(page_count(30, 10), 3);
        assert_eq!(page_count(1, 10), 1);
    }

    #[test]
    fn page_count_handles_empty_results() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 0), 0);
    }

    #[test]
    fn page_envelope_carries_window() {
        let page = Page::new(vec![1, 2, 3], 13, 2, 3);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 13);
        assert_eq!(page.page, 2);
        assert_eq!(page.size, 3);
        assert_eq!(page.pages, 5);
    }
}
