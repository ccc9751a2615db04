use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::warn;

use super::{MediaBackend, StorageError, StoredMedia};
use crate::settings::StorageCredential;

const API_BASE: &str = "https://api.telegram.org";

/// File metadata lookups are quick; content streaming is bounded separately
/// by the proxy handler.
pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Relay backend. Posts the file to the configured channel and keeps only the
/// opaque file id; content is fetched again at proxy time.
pub struct TelegramStorage;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    document: Option<FileHandle>,
    video: Option<FileHandle>,
    photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Deserialize)]
struct FileHandle {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
    file_id: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct FileMeta {
    file_path: Option<String>,
}

/// Pick the file id out of a channel post: document, then video, then the
/// largest photo variant.
fn extract_file_id(message: &Message) -> Option<String> {
    if let Some(document) = &message.document {
        return Some(document.file_id.clone());
    }
    if let Some(video) = &message.video {
        return Some(video.file_id.clone());
    }
    message.photo.as_ref().and_then(|sizes| {
        sizes
            .iter()
            .max_by_key(|size| u64::from(size.width) * u64::from(size.height))
            .map(|size| size.file_id.clone())
    })
}

/// Best-effort public message link for posts with no extractable file id.
/// Not resolvable through the proxy; degraded legacy fallback only.
fn message_link(channel_id: &str, message_id: i64) -> String {
    if let Some(name) = channel_id.strip_prefix('@') {
        format!("https://t.me/{name}/{message_id}")
    } else {
        let id = channel_id.strip_prefix("-100").unwrap_or(channel_id);
        format!("https://t.me/c/{id}/{message_id}")
    }
}

/// Resolve an opaque file id to a remote file path (proxy phase one).
///
/// `Ok(None)` means the remote does not know the reference; transport errors
/// bubble up so the caller can distinguish an unreachable API.
pub async fn resolve_file_path(
    http: &Client,
    bot_token: &str,
    file_id: &str,
) -> Result<Option<String>, reqwest::Error> {
    let url = format!("{API_BASE}/bot{bot_token}/getFile");

    let envelope: Envelope<FileMeta> = http
        .get(&url)
        .query(&[("file_id", file_id)])
        .timeout(RESOLVE_TIMEOUT)
        .send()
        .await?
        .json()
        .await?;

    if !envelope.ok {
        warn!(
            "File resolve failed: {}",
            envelope.description.as_deref().unwrap_or("unknown error")
        );
        return Ok(None);
    }

    Ok(envelope.result.and_then(|meta| meta.file_path))
}

/// Content endpoint for a resolved file path (proxy phase two).
pub fn file_download_url(bot_token: &str, file_path: &str) -> String {
    format!("{API_BASE}/file/bot{bot_token}/{file_path}")
}

#[async_trait]
impl MediaBackend for TelegramStorage {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn store(
        &self,
        http: &Client,
        data: &Bytes,
        filename: &str,
        credential: &StorageCredential,
    ) -> Result<StoredMedia, StorageError> {
        let url = format!("{API_BASE}/bot{}/sendDocument", credential.bot_token);

        let part = Part::bytes(data.to_vec()).file_name(filename.to_string());
        let form = Form::new()
            .text("chat_id", credential.channel_id.clone())
            .part("document", part);

        let envelope: Envelope<Message> = http
            .post(&url)
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        if !envelope.ok {
            return Err(StorageError::Rejected(
                envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let message = envelope
            .result
            .ok_or_else(|| StorageError::BadResponse("missing message in response".to_string()))?;

        match extract_file_id(&message) {
            Some(file_id) => Ok(StoredMedia::ProxyRef(file_id)),
            None => Ok(StoredMedia::DirectUrl(message_link(
                &credential.channel_id,
                message.message_id,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_message(json: &str) -> Message {
        let envelope: Envelope<Message> = serde_json::from_str(json).unwrap();
        assert!(envelope.ok);
        envelope.result.unwrap()
    }

    #[test]
    fn document_id_wins_over_video_and_photo() {
        let message = parse_message(
            r#"{"ok": true, "result": {
                "message_id": 7,
                "document": {"file_id": "DOC1"},
                "video": {"file_id": "VID1"},
                "photo": [{"file_id": "PH1", "width": 90, "height": 90}]
            }}"#,
        );
        assert_eq!(extract_file_id(&message), Some("DOC1".to_string()));
    }

    #[test]
    fn video_id_wins_over_photo() {
        let message = parse_message(
            r#"{"ok": true, "result": {
                "message_id": 7,
                "video": {"file_id": "ABC123"},
                "photo": [{"file_id": "PH1", "width": 90, "height": 90}]
            }}"#,
        );
        assert_eq!(extract_file_id(&message), Some("ABC123".to_string()));
    }

    #[test]
    fn largest_photo_variant_is_selected() {
        let message = parse_message(
            r#"{"ok": true, "result": {
                "message_id": 7,
                "photo": [
                    {"file_id": "SMALL", "width": 90, "height": 90},
                    {"file_id": "LARGE", "width": 1280, "height": 960},
                    {"file_id": "MEDIUM", "width": 320, "height": 240}
                ]
            }}"#,
        );
        assert_eq!(extract_file_id(&message), Some("LARGE".to_string()));
    }

    #[test]
    fn message_without_media_has_no_file_id() {
        let message = parse_message(r#"{"ok": true, "result": {"message_id": 7}}"#);
        assert_eq!(extract_file_id(&message), None);
    }

    #[test]
    fn non_ok_envelope_carries_description() {
        let envelope: Envelope<Message> = serde_json::from_str(
            r#"{"ok": false, "description": "Bad Request: chat not found"}"#,
        )
        .unwrap();
        assert!(!envelope.ok);
        assert_eq!(
            envelope.description.as_deref(),
            Some("Bad Request: chat not found")
        );
    }

    #[test]
    fn public_channel_link_uses_channel_name() {
        assert_eq!(message_link("@dachas", 42), "https://t.me/dachas/42");
    }

    #[test]
    fn private_channel_link_strips_internal_prefix() {
        assert_eq!(
            message_link("-1001234567890", 42),
            "https://t.me/c/1234567890/42"
        );
    }

    #[test]
    fn download_url_embeds_token_and_path() {
        assert_eq!(
            file_download_url("TOKEN", "videos/x.mp4"),
            "https://api.telegram.org/file/botTOKEN/videos/x.mp4"
        );
    }
}
