//! String-keyed JSON value store, persisted to a single file.
//!
//! Every mutation rewrites the file while the lock is held, so writers are
//! serialised. A mutation whose write fails is undone in memory, so the map
//! never holds state the file does not.

use crate::errors::AppError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::error;

type Entries = BTreeMap<String, Value>;

pub struct KvStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl KvStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let entries = load_entries(&path).await;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let entries = self.entries.lock().await;
        entries.get(key).map(|value| decode(key, value)).transpose()
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value).map_err(|err| AppError::internal("保存に失敗しました", err))?;
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(key.to_string(), value);
        if let Err(err) = persist_entries(&self.path, &entries).await {
            restore(&mut entries, key, previous);
            return Err(err);
        }
        Ok(())
    }

    /// Removes `key`; returns whether anything was there.
    pub async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let mut entries = self.entries.lock().await;
        let Some(removed) = entries.remove(key) else {
            return Ok(false);
        };
        if let Err(err) = persist_entries(&self.path, &entries).await {
            restore(&mut entries, key, Some(removed));
            return Err(err);
        }
        Ok(true)
    }

    pub async fn get_by_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, AppError> {
        let entries = self.entries.lock().await;
        entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| decode(key, value))
            .collect()
    }

    /// Read-modify-write under one lock. Returns `None` without writing when
    /// the key is absent.
    pub async fn update<T, F>(&self, key: &str, apply: F) -> Result<Option<T>, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let mut entries = self.entries.lock().await;
        let Some(current) = entries.get(key) else {
            return Ok(None);
        };
        let updated = apply(decode(key, current)?);
        let value = serde_json::to_value(&updated).map_err(|err| AppError::internal("保存に失敗しました", err))?;
        let previous = entries.insert(key.to_string(), value);
        if let Err(err) = persist_entries(&self.path, &entries).await {
            restore(&mut entries, key, previous);
            return Err(err);
        }
        Ok(Some(updated))
    }
}

/// Puts `key` back to what it held before a write the file never saw.
fn restore(entries: &mut Entries, key: &str, previous: Option<Value>) {
    match previous {
        Some(value) => entries.insert(key.to_string(), value),
        None => entries.remove(key),
    };
}

fn decode<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T, AppError> {
    T::deserialize(value).map_err(|err| AppError::internal("データの読み込みに失敗しました", format!("{key}: {err}")))
}

async fn load_entries(path: &Path) -> Entries {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse data file: {err}");
                Entries::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Entries::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Entries::default()
        }
    }
}

async fn persist_entries(path: &Path, entries: &Entries) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(entries).map_err(|err| AppError::internal("保存に失敗しました", err))?;
    fs::write(path, payload)
        .await
        .map_err(|err| AppError::internal("保存に失敗しました", err))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("study_log_kv_{name}_{}_{nanos}.json", std::process::id()))
    }

    #[tokio::test]
    async fn set_get_delete() {
        let store = KvStore::open(temp_path("basic")).await.unwrap();
        store.set("categories:u1", &vec!["数学"]).await.unwrap();

        let got: Option<Vec<String>> = store.get("categories:u1").await.unwrap();
        assert_eq!(got, Some(vec!["数学".to_string()]));

        assert!(store.delete("categories:u1").await.unwrap());
        assert!(!store.delete("categories:u1").await.unwrap());
        let gone: Option<Vec<String>> = store.get("categories:u1").await.unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn prefix_scan_only_matches_prefix() {
        let store = KvStore::open(temp_path("prefix")).await.unwrap();
        store.set("log:u1:a", &1).await.unwrap();
        store.set("log:u1:b", &2).await.unwrap();
        store.set("log:u10:c", &3).await.unwrap();
        store.set("log:u2:d", &4).await.unwrap();

        let values: Vec<i32> = store.get_by_prefix("log:u1:").await.unwrap();
        assert_eq!(values, vec![1, 2]);
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let path = temp_path("reopen");
        {
            let store = KvStore::open(&path).await.unwrap();
            store.set("k", &"v").await.unwrap();
        }
        let store = KvStore::open(&path).await.unwrap();
        let value: Option<String> = store.get("k").await.unwrap();
        assert_eq!(value.as_deref(), Some("v"));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn failed_writes_leave_memory_unchanged() {
        let path = temp_path("readonly");
        let store = KvStore::open(&path).await.unwrap();
        store.set("kept", &1).await.unwrap();
        store.set("doomed", &2).await.unwrap();

        // A directory at the data path makes every later write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.set("new", &3).await.is_err());
        assert!(store.get::<i32>("new").await.unwrap().is_none());

        assert!(store.set("kept", &10).await.is_err());
        assert_eq!(store.get::<i32>("kept").await.unwrap(), Some(1));

        assert!(store.update("kept", |n: i32| n + 100).await.is_err());
        assert_eq!(store.get::<i32>("kept").await.unwrap(), Some(1));

        assert!(store.delete("doomed").await.is_err());
        assert_eq!(store.get::<i32>("doomed").await.unwrap(), Some(2));

        std::fs::remove_dir(&path).unwrap();
    }

    #[tokio::test]
    async fn update_skips_missing_keys() {
        let store = KvStore::open(temp_path("update")).await.unwrap();
        let missing: Option<i32> = store.update("n", |n: i32| n + 1).await.unwrap();
        assert!(missing.is_none());

        store.set("n", &1).await.unwrap();
        let bumped = store.update("n", |n: i32| n + 1).await.unwrap();
        assert_eq!(bumped, Some(2));
    }
}
