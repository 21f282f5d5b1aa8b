use std::{path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// JSON file-backed single-document store.
///
/// Holds one document `D` in memory and rewrites the whole file on every
/// mutation. Intended for small datasets where a database is overkill.
#[derive(Clone)]
pub struct JsonDocStore<D> {
    inner: Arc<RwLock<D>>,
    file_path: PathBuf,
}

impl<D> JsonDocStore<D>
where
    D: Default + serde::Serialize + serde::de::DeserializeOwned,
{
    /// Initialize the store from a path. Creates the file with a default
    /// document if missing; a file that exists but does not parse is an error.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let doc: D = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("cannot parse {}: {}", file_path.display(), e))
            })?,
            Err(_) => {
                let empty = D::default();
                let data = serde_json::to_vec_pretty(&empty)
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                fs::write(&file_path, data)
                    .await
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(doc)), file_path }))
    }

    async fn persist(&self, doc: &D) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Run a read-only closure against the document.
    pub async fn read<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        let doc = self.inner.read().await;
        f(&doc)
    }

    /// Apply a mutation and rewrite the backing file. The write lock is held
    /// across the whole read-modify-write cycle, so concurrent mutations
    /// cannot interleave between a check and its persist.
    pub async fn update<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut D) -> Result<R, ServiceError>,
    {
        let mut doc = self.inner.write().await;
        let out = f(&mut doc)?;
        self.persist(&doc).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_doc_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn doc_store_update_persists_and_reloads() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonDocStore::<HashMap<String, String>>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.read(|d| d.len()).await, 0);

        store
            .update(|d| {
                d.insert("a".into(), "1".into());
                Ok(())
            })
            .await?;
        store
            .update(|d| {
                d.insert("b".into(), "2".into());
                Ok(())
            })
            .await?;
        assert_eq!(store.read(|d| d.get("a").cloned()).await.as_deref(), Some("1"));

        // a fresh store over the same file sees the persisted state
        let reloaded = JsonDocStore::<HashMap<String, String>>::new(&tmp).await?;
        assert_eq!(reloaded.read(|d| d.len()).await, 2);
        assert_eq!(reloaded.read(|d| d.get("b").cloned()).await.as_deref(), Some("2"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_initialized_with_default() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let _store = JsonDocStore::<HashMap<String, String>>::new(&tmp).await?;
        let bytes = tokio::fs::read(&tmp).await?;
        let on_disk: HashMap<String, String> = serde_json::from_slice(&bytes)?;
        assert!(on_disk.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let tmp = temp_path();
        tokio::fs::write(&tmp, b"not json").await.expect("write corrupt file");
        let res = JsonDocStore::<HashMap<String, String>>::new(&tmp).await;
        assert!(matches!(res, Err(ServiceError::Storage(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
    }

    #[tokio::test]
    async fn failed_update_is_not_persisted() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonDocStore::<HashMap<String, String>>::new(&tmp).await?;
        store
            .update(|d| {
                d.insert("a".into(), "1".into());
                Ok(())
            })
            .await?;

        let res: Result<(), ServiceError> = store
            .update(|_| Err(ServiceError::Validation("rejected".into())))
            .await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));

        let reloaded = JsonDocStore::<HashMap<String, String>>::new(&tmp).await?;
        assert_eq!(reloaded.read(|d| d.len()).await, 1);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
