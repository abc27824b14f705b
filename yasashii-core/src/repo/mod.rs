use crate::{seed, CoreError, Pool, PoolKind, Progress, SessionResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod memory;

pub const KEY_PROGRESS: &str = "progress";
pub const KEY_STREAK: &str = "streak";
pub const KEY_RESULTS: &str = "results";

/// Whole-value key/value storage. Each key holds one JSON document.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError>;
    async fn put(&self, key: &str, value: Value) -> Result<(), CoreError>;
    async fn clear(&self) -> Result<(), CoreError>;

    async fn load_progress(&self) -> Result<Progress, CoreError> {
        Ok(decode_or(KEY_PROGRESS, self.get(KEY_PROGRESS).await?, Progress::default))
    }

    async fn save_progress(&self, progress: &Progress) -> Result<(), CoreError> {
        self.put(KEY_PROGRESS, encode(progress)?).await
    }

    async fn load_pool(&self, kind: PoolKind) -> Result<Pool, CoreError> {
        let key = kind.storage_key();
        Ok(decode_or(key, self.get(key).await?, || seed::default_pool(kind)))
    }

    async fn save_pool(&self, kind: PoolKind, pool: &Pool) -> Result<(), CoreError> {
        self.put(kind.storage_key(), encode(pool)?).await
    }

    async fn load_streak(&self) -> Result<u32, CoreError> {
        Ok(decode_or(KEY_STREAK, self.get(KEY_STREAK).await?, || 0))
    }

    async fn save_streak(&self, streak: u32) -> Result<(), CoreError> {
        self.put(KEY_STREAK, Value::from(streak)).await
    }

    async fn load_results(&self) -> Result<Vec<SessionResult>, CoreError> {
        Ok(decode_or(KEY_RESULTS, self.get(KEY_RESULTS).await?, Vec::new))
    }

    async fn save_results(&self, results: &[SessionResult]) -> Result<(), CoreError> {
        self.put(KEY_RESULTS, encode(results)?).await
    }
}

fn encode<T: serde::Serialize + ?Sized>(v: &T) -> Result<Value, CoreError> {
    serde_json::to_value(v).map_err(|_| CoreError::Storage("encode"))
}

/// Missing or undecodable values fall back to the default.
fn decode_or<T: DeserializeOwned>(key: &str, value: Option<Value>, default: impl FnOnce() -> T) -> T {
    match value {
        None => default(),
        Some(v) => match serde_json::from_value(v) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value unreadable, using default");
                default()
            }
        },
    }
}
