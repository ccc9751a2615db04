use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

/// Initialize and return a PostgreSQL connection pool.
pub async fn init_db(database_url: &str) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");

    // Create a new PostgreSQL connection pool with a maximum of 5 connections
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    info!("Database connection established");
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        full_name TEXT,
        hashed_password TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        status TEXT NOT NULL DEFAULT 'active',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )",
    "CREATE TABLE IF NOT EXISTS listings (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        region TEXT NOT NULL,
        location TEXT,
        price_per_night DOUBLE PRECISION NOT NULL DEFAULT 0,
        rating DOUBLE PRECISION NOT NULL DEFAULT 0,
        reviews_count INTEGER NOT NULL DEFAULT 0,
        guests_max INTEGER NOT NULL DEFAULT 1,
        rooms INTEGER NOT NULL DEFAULT 1,
        beds INTEGER NOT NULL DEFAULT 1,
        baths INTEGER NOT NULL DEFAULT 1,
        amenities JSONB NOT NULL DEFAULT '{}'::jsonb,
        images JSONB NOT NULL DEFAULT '[]'::jsonb,
        video_url TEXT,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )",
    "CREATE TABLE IF NOT EXISTS bookings (
        id SERIAL PRIMARY KEY,
        user_id INTEGER REFERENCES users(id),
        listing_id INTEGER REFERENCES listings(id),
        check_in TIMESTAMPTZ NOT NULL,
        check_out TIMESTAMPTZ NOT NULL,
        guests INTEGER NOT NULL DEFAULT 1,
        total_price DOUBLE PRECISION NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'pending',
        customer_name TEXT,
        customer_phone TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS reviews (
        id SERIAL PRIMARY KEY,
        listing_id INTEGER NOT NULL REFERENCES listings(id) ON DELETE CASCADE,
        user_name TEXT NOT NULL,
        rating INTEGER NOT NULL DEFAULT 5,
        comment TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )",
    "CREATE TABLE IF NOT EXISTS amenities (
        id SERIAL PRIMARY KEY,
        name_uz TEXT NOT NULL,
        name_ru TEXT NOT NULL,
        name_en TEXT NOT NULL,
        icon TEXT
    )",
];

/// Create missing tables and seed the default admin account.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    sqlx::query(
        "INSERT INTO users (email, full_name, hashed_password, role, status)
         VALUES ('admin', 'Super Admin', 'admin', 'admin', 'active')
         ON CONFLICT (email) DO NOTHING",
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
