//! Subscription store kept fully in memory and persisted to a JSON-lines
//! file. The file is read once on open (and created empty when missing);
//! every mutation rewrites it before the change becomes visible.

use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use super::SubscriptionStore;
use crate::{
    error::Error,
    model::{Filter, Patch, Subscription},
};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    records: Vec<Subscription>,
    closed: bool,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<FileStore, Error> {
        let path = path.into();
        let records = load(&path).await?;

        info!(
            path = %path.display(),
            records = records.len(),
            "Subscription store loaded"
        );

        Ok(FileStore {
            path,
            inner: RwLock::new(Inner {
                records,
                closed: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &[Subscription]) -> Result<(), Error> {
        let mut data = String::new();

        for record in records {
            data.push_str(&serde_json::to_string(record)?);
            data.push('\n');
        }

        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push("~");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), records = records.len(), "Subscription store persisted");
        Ok(())
    }

    /// Applies `change` to a copy of the records, persists the copy and only
    /// then swaps it in, so a failed write leaves memory untouched.
    async fn mutate<F, T>(&self, change: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Vec<Subscription>) -> Result<T, Error>,
    {
        let mut inner = self.inner.write().await;
        ensure_open(&inner)?;

        let mut records = inner.records.clone();
        let result = change(&mut records)?;
        self.persist(&records).await?;
        inner.records = records;

        Ok(result)
    }
}

fn ensure_open(inner: &Inner) -> Result<(), Error> {
    if inner.closed {
        return Err(Error::StoreError(String::from("store is closed")));
    }
    Ok(())
}

async fn load(path: &Path) -> Result<Vec<Subscription>, Error> {
    let data = match fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::write(path, "").await?;
            return Ok(vec![]);
        },
        Err(e) => return Err(Error::Io(e)),
    };

    let mut records = vec![];

    for (index, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record = serde_json::from_str::<Subscription>(line).map_err(|e| {
            Error::StoreError(format!(
                "{}:{}: {}",
                path.display(),
                index + 1,
                e
            ))
        })?;
        records.push(record);
    }

    Ok(records)
}

#[async_trait]
impl SubscriptionStore for FileStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Subscription>, Error> {
        let inner = self.inner.read().await;
        ensure_open(&inner)?;

        Ok(inner
            .records
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn find_one(
        &self,
        filter: &Filter,
    ) -> Result<Option<Subscription>, Error> {
        let inner = self.inner.read().await;
        ensure_open(&inner)?;

        Ok(inner.records.iter().find(|item| filter.matches(item)).cloned())
    }

    async fn insert(&self, subscription: Subscription) -> Result<(), Error> {
        self.mutate(move |records| {
            let key = Filter::by_endpoint(
                &subscription.user_id,
                &subscription.endpoint,
            );
            if records.iter().any(|item| key.matches(item)) {
                return Err(Error::DuplicateSubscription(
                    subscription.endpoint,
                ));
            }

            records.push(subscription);
            Ok(())
        })
        .await
    }

    async fn update(
        &self,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64, Error> {
        if patch.is_empty() {
            return Ok(0);
        }

        self.mutate(|records| {
            let mut count = 0;
            for item in records.iter_mut().filter(|item| filter.matches(item))
            {
                patch.apply(item);
                count += 1;
            }
            Ok(count)
        })
        .await
    }

    async fn remove(&self, filter: &Filter) -> Result<u64, Error> {
        {
            let inner = self.inner.read().await;
            ensure_open(&inner)?;
            if !inner.records.iter().any(|item| filter.matches(item)) {
                return Ok(0);
            }
        }

        self.mutate(|records| {
            let before = records.len();
            records.retain(|item| !filter.matches(item));
            Ok((before - records.len()) as u64)
        })
        .await
    }

    async fn close(&self) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        if inner.closed {
            return Ok(());
        }

        self.persist(&inner.records).await?;
        inner.closed = true;

        info!(path = %self.path.display(), "Subscription store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::model::Keys;

    fn subscription(user_id: &str, endpoint: &str, service: &str) -> Subscription {
        Subscription::new(
            user_id.to_owned(),
            endpoint.to_owned(),
            Keys {
                p256dh: String::from("k1"),
                auth: String::from("a1"),
            },
            service.to_owned(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_open_missing_file_is_created_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        let store = FileStore::open(&path).await.unwrap();

        let items = store.find(&Filter::default()).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_pair() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("db")).await.unwrap();
        let item = subscription("u1", "https://push.example.com/a", "push.example.com");

        store.insert(item.clone()).await.unwrap();
        let err = store.insert(item).await.unwrap_err();

        assert!(matches!(err, Error::DuplicateSubscription(_)));
        assert_eq!(store.find(&Filter::by_user("u1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_endpoint_for_different_users() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("db")).await.unwrap();

        store
            .insert(subscription("u1", "https://push.example.com/a", "push.example.com"))
            .await
            .unwrap();
        store
            .insert(subscription("u2", "https://push.example.com/a", "push.example.com"))
            .await
            .unwrap();

        assert_eq!(store.find(&Filter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");

        {
            let store = FileStore::open(&path).await.unwrap();
            store
                .insert(subscription("u1", "https://push.example.com/a", "push.example.com"))
                .await
                .unwrap();
            store
                .insert(subscription("u1", "https://fcm.example.net/b", "fcm.example.net"))
                .await
                .unwrap();
            let removed = store
                .remove(&Filter::by_endpoint("u1", "https://fcm.example.net/b"))
                .await
                .unwrap();
            assert_eq!(removed, 1);
            store.close().await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        let items = store.find(&Filter::by_user("u1")).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].endpoint, "https://push.example.com/a");
        assert_eq!(items[0].service, "push.example.com");
    }

    #[tokio::test]
    async fn test_update_touches_matching_records() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("db")).await.unwrap();
        let item = subscription("u1", "https://push.example.com/a", "push.example.com");
        let later = item.created_at + chrono::Duration::seconds(30);

        store.insert(item.clone()).await.unwrap();
        let count = store
            .update(&Filter::by_endpoint("u1", &item.endpoint), &Patch::touch(later))
            .await
            .unwrap();

        assert_eq!(count, 1);
        let stored = store
            .find_one(&Filter::by_endpoint("u1", &item.endpoint))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.created_at, item.created_at);
        assert_eq!(stored.last_modified_at, later);
    }

    #[tokio::test]
    async fn test_remove_without_match_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        let store = FileStore::open(&path).await.unwrap();

        let removed = store
            .remove(&Filter::by_endpoint("u1", "https://push.example.com/a"))
            .await
            .unwrap();

        assert_eq!(removed, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_corrupt_line_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        std::fs::write(&path, "{not json}\n").unwrap();

        let err = FileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, Error::StoreError(_)));
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("db")).await.unwrap();

        store.close().await.unwrap();

        let err = store.find(&Filter::default()).await.unwrap_err();
        assert!(matches!(err, Error::StoreError(_)));
    }
}
