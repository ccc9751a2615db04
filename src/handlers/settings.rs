use axum::{Json, extract::State};

use crate::{
    error::AppError,
    models::StorageSettingsUpdate,
    settings::{StorageCredential, resolve_credential, update_credential},
    state::AppState,
};

/// Read the resolved storage credential pair (override row or env default).
pub async fn read_storage_settings(
    State(state): State<AppState>,
) -> Result<Json<StorageCredential>, AppError> {
    let credential = resolve_credential(&state.pool, &state.config).await?;
    Ok(Json(credential))
}

/// Update the credential override rows and return the resolved pair.
pub async fn update_storage_settings(
    State(state): State<AppState>,
    Json(payload): Json<StorageSettingsUpdate>,
) -> Result<Json<StorageCredential>, AppError> {
    update_credential(&state.pool, &payload).await?;

    let credential = resolve_credential(&state.pool, &state.config).await?;
    Ok(Json(credential))
}
