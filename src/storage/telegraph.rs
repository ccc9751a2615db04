use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;

use super::{MediaBackend, StorageError, StoredMedia};
use crate::settings::StorageCredential;

const UPLOAD_URL: &str = "https://telegra.ph/upload";
const BASE_URL: &str = "https://telegra.ph";

/// Direct-link backend. Returns a permanent public URL for small images and
/// clips; no credential needed.
pub struct TelegraphStorage;

// The upload endpoint answers with either `[{"src": "/file/..."}]`
// or `{"error": "..."}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Files(Vec<UploadedEntry>),
    Failure { error: String },
}

#[derive(Debug, Deserialize)]
struct UploadedEntry {
    src: String,
}

fn direct_url(response: UploadResponse) -> Result<StoredMedia, StorageError> {
    match response {
        UploadResponse::Files(files) => match files.into_iter().next() {
            Some(entry) => Ok(StoredMedia::DirectUrl(format!("{BASE_URL}{}", entry.src))),
            None => Err(StorageError::BadResponse(
                "empty upload response".to_string(),
            )),
        },
        UploadResponse::Failure { error } => Err(StorageError::Rejected(error)),
    }
}

#[async_trait]
impl MediaBackend for TelegraphStorage {
    fn name(&self) -> &'static str {
        "telegraph"
    }

    async fn store(
        &self,
        http: &Client,
        data: &Bytes,
        filename: &str,
        _credential: &StorageCredential,
    ) -> Result<StoredMedia, StorageError> {
        let part = Part::bytes(data.to_vec()).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = http.post(UPLOAD_URL).multipart(form).send().await?;
        let parsed: UploadResponse = response.json().await?;

        direct_url(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_entry_becomes_absolute_url() {
        let parsed: UploadResponse =
            serde_json::from_str(r#"[{"src": "/file/abc123.jpg"}]"#).unwrap();
        assert_eq!(
            direct_url(parsed).unwrap(),
            StoredMedia::DirectUrl("https://telegra.ph/file/abc123.jpg".to_string())
        );
    }

    #[test]
    fn error_envelope_is_rejected() {
        let parsed: UploadResponse =
            serde_json::from_str(r#"{"error": "File type invalid"}"#).unwrap();
        match direct_url(parsed) {
            Err(StorageError::Rejected(msg)) => assert_eq!(msg, "File type invalid"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_list_is_a_bad_response() {
        let parsed: UploadResponse = serde_json::from_str("[]").unwrap();
        assert!(matches!(
            direct_url(parsed),
            Err(StorageError::BadResponse(_))
        ));
    }
}
