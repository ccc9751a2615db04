use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use tracing::info;

use crate::{
    error::AppError,
    settings::resolve_credential,
    state::AppState,
    storage::telegram,
    utils::file_extension,
};

/// Streaming reads can take minutes for large videos.
const STREAM_TIMEOUT: Duration = Duration::from_secs(300);

const CACHE_DIRECTIVE: &str = "public, max-age=3600";

/// Stream a relayed file back to the client.
///
/// The reference may carry a format-hint extension appended at upload time;
/// it is stripped before resolution.
pub async fn proxy_file(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, AppError> {
    let file_id = strip_reference_extension(&reference);

    // Settings are re-read per request so token rotation applies immediately
    let credential = resolve_credential(&state.pool, &state.config).await?;
    if credential.bot_token.is_empty() {
        return Err(AppError::Configuration(
            "Storage bot token is not configured".to_string(),
        ));
    }

    let file_path = telegram::resolve_file_path(&state.http, &credential.bot_token, file_id)
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to contact remote storage: {e}")))?
        .ok_or_else(|| AppError::NotFound("File not found on remote storage".to_string()))?;

    info!("Proxying {} from {}", file_id, file_path);

    let download_url = telegram::file_download_url(&credential.bot_token, &file_path);
    let upstream = state
        .http
        .get(&download_url)
        .timeout(STREAM_TIMEOUT)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to open remote stream: {e}")))?;

    if !upstream.status().is_success() {
        return Err(AppError::NotFound(
            "File content not available".to_string(),
        ));
    }

    // Relay chunks as they arrive; a mid-transfer upstream error ends the
    // stream without retry or resumption
    Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(&file_path))
        .header(header::CACHE_CONTROL, CACHE_DIRECTIVE)
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

fn strip_reference_extension(reference: &str) -> &str {
    match reference.split_once('.') {
        Some((file_id, _)) => file_id,
        None => reference,
    }
}

fn content_type_for(path: &str) -> &'static str {
    match file_extension(path).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_hint_is_stripped_before_resolution() {
        assert_eq!(strip_reference_extension("ABC123.mp4"), "ABC123");
        assert_eq!(strip_reference_extension("ABC123"), "ABC123");
    }

    #[test]
    fn content_type_follows_resolved_path_extension() {
        assert_eq!(content_type_for("videos/x.mp4"), "video/mp4");
        assert_eq!(content_type_for("photos/a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("photos/a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("clips/c.mov"), "video/quicktime");
        assert_eq!(content_type_for("images/i.webp"), "image/webp");
    }

    #[test]
    fn unknown_extensions_fall_back_to_binary() {
        assert_eq!(content_type_for("documents/d.pdf"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
