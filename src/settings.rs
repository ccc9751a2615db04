use serde::Serialize;
use sqlx::PgPool;

use crate::config::Config;
use crate::models::StorageSettingsUpdate;

pub const BOT_TOKEN_KEY: &str = "TELEGRAM_BOT_TOKEN";
pub const CHANNEL_ID_KEY: &str = "TELEGRAM_CHANNEL_ID";

/// Credential pair for the relay storage backend.
#[derive(Debug, Clone, Serialize)]
pub struct StorageCredential {
    pub bot_token: String,
    pub channel_id: String,
}

impl StorageCredential {
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.channel_id.is_empty()
    }
}

/// Resolve the current credential pair: a settings override row wins over the
/// environment default. Re-read on every call; overrides take effect without
/// a restart.
pub async fn resolve_credential(
    pool: &PgPool,
    config: &Config,
) -> Result<StorageCredential, sqlx::Error> {
    let bot_token = fetch_override(pool, BOT_TOKEN_KEY).await?;
    let channel_id = fetch_override(pool, CHANNEL_ID_KEY).await?;

    Ok(StorageCredential {
        bot_token: pick(bot_token, &config.telegram_bot_token),
        channel_id: pick(channel_id, &config.telegram_channel_id),
    })
}

/// Upsert the override rows named in the update; untouched fields keep their
/// current source.
pub async fn update_credential(
    pool: &PgPool,
    update: &StorageSettingsUpdate,
) -> Result<(), sqlx::Error> {
    if let Some(bot_token) = &update.bot_token {
        upsert(pool, BOT_TOKEN_KEY, bot_token).await?;
    }
    if let Some(channel_id) = &update.channel_id {
        upsert(pool, CHANNEL_ID_KEY, channel_id).await?;
    }
    Ok(())
}

fn pick(override_value: Option<String>, env_default: &str) -> String {
    override_value.unwrap_or_else(|| env_default.to_string())
}

async fn fetch_override(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await
}

async fn upsert(pool: &PgPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES ($1, $2)
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_row_wins_over_env_default() {
        assert_eq!(pick(Some("T2".to_string()), "T1"), "T2");
    }

    #[test]
    fn env_default_used_when_no_override_exists() {
        assert_eq!(pick(None, "T1"), "T1");
    }

    #[test]
    fn credential_configured_requires_both_fields() {
        let full = StorageCredential {
            bot_token: "token".to_string(),
            channel_id: "@channel".to_string(),
        };
        assert!(full.is_configured());

        let missing_channel = StorageCredential {
            bot_token: "token".to_string(),
            channel_id: String::new(),
        };
        assert!(!missing_channel.is_configured());
    }
}
