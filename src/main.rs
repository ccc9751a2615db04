mod cache;
mod config;
mod database;
mod error;
mod handlers;
mod media;
mod models;
mod settings;
mod state;
mod storage;
mod utils;

use axum::{Router, extract::DefaultBodyLimit, routing::{get, post}};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    cache::RedisCache,
    config::Config,
    database::{init_db, init_schema},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()
        .expect("Failed to load configuration");

    let pool = init_db(&config.database_url)
        .await
        .expect("Failed to connect to db");
    init_schema(&pool)
        .await
        .expect("Failed to initialize schema");

    let cache = RedisCache::connect(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");

    let http = reqwest::Client::new();

    let app_state = AppState {
        pool,
        cache,
        http,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(handlers::auth::login))
        .route("/upload/file", post(handlers::upload::upload_file))
        .route("/upload/files", post(handlers::upload::upload_files))
        .route("/proxy/{reference}", get(handlers::proxy::proxy_file))
        .route(
            "/settings/storage",
            get(handlers::settings::read_storage_settings)
                .post(handlers::settings::update_storage_settings),
        )
        .route(
            "/listings",
            get(handlers::listings::list_listings).post(handlers::listings::create_listing),
        )
        .route(
            "/listings/{id}",
            get(handlers::listings::get_listing)
                .put(handlers::listings::update_listing)
                .delete(handlers::listings::delete_listing),
        )
        .route(
            "/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route(
            "/bookings/{id}",
            get(handlers::bookings::get_booking)
                .put(handlers::bookings::update_booking)
                .delete(handlers::bookings::delete_booking),
        )
        .route(
            "/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        .route(
            "/reviews/{id}",
            get(handlers::reviews::get_review)
                .put(handlers::reviews::update_review)
                .delete(handlers::reviews::delete_review),
        )
        .route(
            "/amenities",
            get(handlers::amenities::list_amenities).post(handlers::amenities::create_amenity),
        )
        .route(
            "/amenities/{id}",
            axum::routing::put(handlers::amenities::update_amenity)
                .delete(handlers::amenities::delete_amenity),
        )
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .layer(DefaultBodyLimit::max(config.max_file_size as usize))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
