use axum::{Json, extract::{Multipart, State}};
use bytes::Bytes;
use tracing::error;

use crate::{
    error::AppError,
    media::normalize_image,
    models::UploadedFile,
    settings::resolve_credential,
    state::AppState,
    storage::{StoredMedia, store_media},
    utils::file_extension,
};

/// Upload a single file using multipart/form-data.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadedFile>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error parsing multipart: {}", e);
        AppError::Multipart(format!("Failed to parse multipart form: {e}"))
    })? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(|e| {
            error!("Error reading file bytes: {}", e);
            AppError::Multipart(format!("Failed to read the file: {e}"))
        })?;

        return Ok(Json(store_upload(&state, data, filename).await?));
    }

    Err(AppError::Validation("No file provided".to_string()))
}

/// Upload several files in one request. Files are stored sequentially; the
/// first failure aborts the rest of the batch.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<UploadedFile>>, AppError> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error parsing multipart: {}", e);
        AppError::Multipart(format!("Failed to parse multipart form: {e}"))
    })? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(|e| {
            error!("Error reading file bytes: {}", e);
            AppError::Multipart(format!("Failed to read the file: {e}"))
        })?;

        uploaded.push(store_upload(&state, data, filename).await?);
    }

    if uploaded.is_empty() {
        return Err(AppError::Validation("No files provided".to_string()));
    }

    Ok(Json(uploaded))
}

async fn store_upload(
    state: &AppState,
    data: Bytes,
    filename: String,
) -> Result<UploadedFile, AppError> {
    let extension = file_extension(&filename)
        .ok_or_else(|| AppError::Validation(format!("File {filename} has no extension")))?;

    if !state.config.allowed_extensions.contains(&extension) {
        return Err(AppError::Validation(format!(
            "File extension .{} is not allowed. Allowed extensions: {}",
            extension,
            state.config.allowed_extensions.join(", ")
        )));
    }

    // Settings are re-read per upload so credential changes apply immediately
    let credential = resolve_credential(&state.pool, &state.config).await?;

    let (data, extension) = normalize_image(data, extension).await;
    let stored = store_media(&state.http, &credential, data, &filename, &extension).await?;

    Ok(UploadedFile {
        url: public_url(&state.config.public_base_url, &stored, &extension),
        filename,
    })
}

/// Rewrite a proxy reference into an absolute, extension-qualified URL that a
/// browser tag can consume. Direct URLs pass through untouched.
fn public_url(base_url: &str, stored: &StoredMedia, extension: &str) -> String {
    match stored {
        StoredMedia::DirectUrl(url) => url.clone(),
        StoredMedia::ProxyRef(file_id) => format!(
            "{}/proxy/{}.{}",
            base_url.trim_end_matches('/'),
            file_id,
            extension
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_urls_pass_through_untouched() {
        let stored = StoredMedia::DirectUrl("https://telegra.ph/file/a.png".to_string());
        assert_eq!(
            public_url("http://localhost:8000", &stored, "png"),
            "https://telegra.ph/file/a.png"
        );
    }

    #[test]
    fn proxy_refs_are_rewritten_with_base_and_extension() {
        let stored = StoredMedia::ProxyRef("ABC123".to_string());
        assert_eq!(
            public_url("http://localhost:8000", &stored, "mp4"),
            "http://localhost:8000/proxy/ABC123.mp4"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let stored = StoredMedia::ProxyRef("ABC123".to_string());
        assert_eq!(
            public_url("https://dacha.example/", &stored, "jpg"),
            "https://dacha.example/proxy/ABC123.jpg"
        );
    }
}
