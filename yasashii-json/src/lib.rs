use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;
use yasashii_core::{repo::Repository, CoreError};

pub mod paths;

pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// One `<key>.json` file per key, cached in memory after open.
pub struct JsonStore {
    dir: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    cache: RwLock<HashMap<String, Value>>,
}

impl JsonStore {
    pub async fn open_with(dir: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_dir(&dir)?;
        ensure_dir(&backups_dir)?;
        let d = dir.clone();
        let cache = task::spawn_blocking(move || load_all(&d))
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(io_err)?;
        tracing::debug!(dir = %dir.display(), keys = cache.len(), "json store opened");
        Ok(Self {
            dir,
            backups_dir,
            max_backups: max_backups.max(1),
            cache: RwLock::new(cache),
        })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_err(e: std::io::Error) -> CoreError {
    tracing::error!(error = %e, "json store io failure");
    CoreError::Storage("io")
}

fn check_key(key: &str) -> Result<(), CoreError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(CoreError::Invalid("storage key must be [a-z0-9_]+"))
    }
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(io_err)
}

fn load_all(dir: &Path) -> Result<HashMap<String, Value>, std::io::Error> {
    let mut map = HashMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let text = fs::read_to_string(&path)?;
        match serde_json::from_str::<Value>(&text) {
            Ok(v) => {
                map.insert(key, v);
            }
            Err(e) => tracing::warn!(file = %path.display(), error = %e, "skipping unreadable value"),
        }
    }
    Ok(map)
}

fn write_with_backup(
    path: &Path,
    backups_dir: &Path,
    key: &str,
    max_backups: usize,
    value: &Value,
) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(backups_dir)?;

    let json = serde_json::to_vec_pretty(value)?;
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = backups_dir.join(format!("{key}-{ts}.json"));
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(&json)?;
    btmp.flush()?;
    btmp.persist(&backup_path).map_err(|e| e.error)?;

    rotate_backups(backups_dir, key, max_backups)
}

fn rotate_backups(dir: &Path, key: &str, keep: usize) -> Result<(), std::io::Error> {
    let prefix = format!("{key}-");
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with(&prefix) && name.ends_with(".json")
        })
        .collect();
    // Names embed the timestamp, so lexical order is age order.
    entries.sort_by_key(|e| e.file_name());
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}

#[async_trait]
impl Repository for JsonStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        check_key(key)?;
        Ok(self.cache.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), CoreError> {
        check_key(key)?;

        let path = self.key_path(key);
        let backups = self.backups_dir.clone();
        let key_owned = key.to_string();
        let keep = self.max_backups;
        let value = task::spawn_blocking(move || {
            write_with_backup(&path, &backups, &key_owned, keep, &value).map(|_| value)
        })
        .await
        .map_err(|_| CoreError::Storage("io"))?
        .map_err(io_err)?;
        // The cache only reflects what reached disk.
        self.cache.write().insert(key.to_string(), value);
        tracing::trace!(key, "value written");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CoreError> {
        let keys: Vec<String> = self.cache.write().drain().map(|(k, _)| k).collect();
        let paths: Vec<PathBuf> = keys.iter().map(|k| self.key_path(k)).collect();
        task::spawn_blocking(move || {
            for p in paths {
                match fs::remove_file(&p) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        })
        .await
        .map_err(|_| CoreError::Storage("io"))?
        .map_err(io_err)?;
        tracing::info!(keys = keys.len(), "store cleared; backups kept");
        Ok(())
    }
}
