use std::future::Future;
use std::time::Duration;

use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

/// How long a cached listing page stays valid. Listing writes do not purge
/// entries, so reads may lag a mutation by up to this window.
pub const LISTING_CACHE_TTL: Duration = Duration::from_secs(60);

/// Redis-backed cache for serialized query results.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        info!("Connecting to Redis at {}", redis_url);

        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        info!("Redis connection established");
        Ok(Self { conn })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(key).await?;

        match data {
            Some(json) => match serde_json::from_str(&json) {
                Ok(value) => {
                    debug!("Cache HIT: {}", key);
                    Ok(Some(value))
                }
                Err(err) => {
                    warn!("Discarding undecodable cache entry {}: {}", key, err);
                    Ok(None)
                }
            },
            None => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), redis::RedisError> {
        let Ok(json) = serde_json::to_string(value) else {
            warn!("Skipping cache write for {}: value not serializable", key);
            return Ok(());
        };

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, json, ttl.as_secs()).await?;

        debug!("Cache SET: {} (ttl {}s)", key, ttl.as_secs());
        Ok(())
    }

    /// Serve `key` from the cache, or run `compute` and store its result.
    ///
    /// Cache failures degrade to the computed value, so a Redis outage slows
    /// the read path down instead of taking it offline.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get(key).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) => warn!("Cache read failed for {}: {}", key, err),
        }

        let value = compute().await?;

        if let Err(err) = self.set(key, &value, ttl).await {
            warn!("Cache write failed for {}: {}", key, err);
        }

        Ok(value)
    }
}
