// Submodules for the direct-link (telegra.ph) and relay (Telegram) backends
pub mod telegram;
pub mod telegraph;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::StorageCredential;
use crate::storage::{telegram::TelegramStorage, telegraph::TelegraphStorage};

/// Extensions the direct-link backend accepts.
pub const DIRECT_LINK_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "mp4"];

/// The direct-link backend rejects anything at or above 5 MiB.
pub const DIRECT_LINK_MAX_BYTES: usize = 5 * 1024 * 1024;

// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage credentials are not configured")]
    Unconfigured,

    #[error("rejected by remote storage: {0}")]
    Rejected(String), // Remote returned a non-ok envelope

    #[error("remote storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected remote storage response: {0}")]
    BadResponse(String),
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredMedia {
    /// Absolute URL served directly by the remote backend.
    DirectUrl(String),
    /// Opaque file reference, resolved later through `/proxy/{reference}`.
    ProxyRef(String),
}

// Async backend trait shared by both storage services
#[async_trait]
pub trait MediaBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Upload a file and return its direct URL or proxy reference.
    async fn store(
        &self,
        http: &Client,
        data: &Bytes,
        filename: &str,
        credential: &StorageCredential,
    ) -> Result<StoredMedia, StorageError>;
}

pub fn direct_link_eligible(extension: &str, size: usize) -> bool {
    DIRECT_LINK_EXTENSIONS.contains(&extension) && size < DIRECT_LINK_MAX_BYTES
}

/// Store a file with the first backend that accepts it.
///
/// Direct-link eligible files try the direct-link backend before falling back
/// to the relay; everything else goes straight to the relay.
pub async fn store_media(
    http: &Client,
    credential: &StorageCredential,
    data: Bytes,
    filename: &str,
    extension: &str,
) -> Result<StoredMedia, StorageError> {
    if !credential.is_configured() {
        return Err(StorageError::Unconfigured);
    }

    let telegraph = TelegraphStorage;
    let telegram = TelegramStorage;

    let backends: Vec<&dyn MediaBackend> = if direct_link_eligible(extension, data.len()) {
        vec![&telegraph, &telegram]
    } else {
        vec![&telegram]
    };

    let mut last_error = StorageError::BadResponse("no storage backend attempted".to_string());
    for backend in backends {
        match backend.store(http, &data, filename, credential).await {
            Ok(stored) => {
                info!("Stored {} via {}", filename, backend.name());
                return Ok(stored);
            }
            Err(err) => {
                warn!("Backend {} failed for {}: {}", backend.name(), filename, err);
                last_error = err;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_media_of_supported_type_is_direct_link_eligible() {
        assert!(direct_link_eligible("png", 2 * 1024 * 1024));
        assert!(direct_link_eligible("mp4", DIRECT_LINK_MAX_BYTES - 1));
    }

    #[test]
    fn oversized_media_goes_to_relay() {
        assert!(!direct_link_eligible("mp4", 6 * 1024 * 1024));
        assert!(!direct_link_eligible("png", DIRECT_LINK_MAX_BYTES));
    }

    #[test]
    fn unsupported_types_go_to_relay() {
        assert!(!direct_link_eligible("mov", 1024));
        assert!(!direct_link_eligible("heic", 1024));
        assert!(!direct_link_eligible("webm", 1024));
    }
}
