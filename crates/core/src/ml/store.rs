use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::errors::ModelStoreError;

use super::PriceModel;

/// Keyed persistence for trained price models.
#[async_trait::async_trait]
pub trait ModelStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<PriceModel, ModelStoreError>;
    async fn save(&self, key: &str, model: &PriceModel) -> Result<(), ModelStoreError>;
}

static STAGING_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Stores one pretty-printed JSON artifact per key under `root`.
///
/// Saves go through a staging file in the same directory and a rename, so a
/// reader sees either the previous artifact or the complete new one.
#[derive(Clone, Debug)]
pub struct FileModelStore {
    root: PathBuf,
}

impl FileModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, key: &str) -> Result<PathBuf, ModelStoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait::async_trait]
impl ModelStore for FileModelStore {
    async fn load(&self, key: &str) -> Result<PriceModel, ModelStoreError> {
        let path = self.artifact_path(key)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(ModelStoreError::NotFound(key.to_string()));
            }
            Err(source) => return Err(ModelStoreError::Io { path, source }),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, key: &str, model: &PriceModel) -> Result<(), ModelStoreError> {
        let path = self.artifact_path(key)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| ModelStoreError::Io { path: self.root.clone(), source })?;

        let json = serde_json::to_string_pretty(model)?;
        let staging = self.root.join(format!(
            ".{key}.json.{}-{}.tmp",
            std::process::id(),
            STAGING_SEQUENCE.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(source) = tokio::fs::write(&staging, json).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(ModelStoreError::Io { path: staging, source });
        }
        if let Err(source) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(ModelStoreError::Io { path, source });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryModelStore {
    models: RwLock<HashMap<String, PriceModel>>,
}

#[async_trait::async_trait]
impl ModelStore for InMemoryModelStore {
    async fn load(&self, key: &str) -> Result<PriceModel, ModelStoreError> {
        let models = self.models.read().await;
        models.get(key).cloned().ok_or_else(|| ModelStoreError::NotFound(key.to_string()))
    }

    async fn save(&self, key: &str, model: &PriceModel) -> Result<(), ModelStoreError> {
        validate_key(key)?;
        let mut models = self.models.write().await;
        models.insert(key.to_string(), model.clone());
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), ModelStoreError> {
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed.contains("..") {
        return Err(ModelStoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::{FileModelStore, InMemoryModelStore, ModelStore};
    use crate::errors::ModelStoreError;
    use crate::ml::{synthetic_training_rows, ModelKind, PriceModel};
    use crate::pricing::rules::PricingTable;

    fn model() -> PriceModel {
        let rows = synthetic_training_rows(&PricingTable::affordable(), 80, 11);
        PriceModel::train(ModelKind::LogLinear, &rows).expect("training succeeds")
    }

    #[tokio::test]
    async fn file_store_saves_and_loads_artifacts() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileModelStore::new(dir.path().join("models"));
        let model = model();

        store.save("pricing-model", &model).await.expect("save");
        assert!(dir.path().join("models/pricing-model.json").exists());

        let loaded = store.load("pricing-model").await.expect("load");
        assert_eq!(loaded.weights.len(), model.weights.len());
        assert_eq!(loaded.training_samples, 80);
    }

    #[tokio::test]
    async fn concurrent_saves_leave_one_complete_artifact() {
        let dir = TempDir::new().expect("temp dir");
        let store = Arc::new(FileModelStore::new(dir.path()));
        let model = model();

        let mut tasks = Vec::new();
        for version in 0..8 {
            let store = Arc::clone(&store);
            let mut model = model.clone();
            model.version = format!("v{version}");
            tasks.push(tokio::spawn(async move { store.save("pricing-model", &model).await }));
        }
        for task in tasks {
            task.await.expect("task completes").expect("save");
        }

        let loaded = store.load("pricing-model").await.expect("complete artifact");
        assert!(loaded.version.starts_with('v'));
        assert!(loaded.is_compatible());

        let mut entries = tokio::fs::read_dir(dir.path()).await.expect("read dir");
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.expect("dir entry") {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["pricing-model.json".to_string()]);
    }

    #[tokio::test]
    async fn file_store_reports_missing_artifacts() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileModelStore::new(dir.path());

        let error = store.load("absent").await.expect_err("nothing stored");
        assert!(matches!(error, ModelStoreError::NotFound(ref key) if key == "absent"));
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_artifacts() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("broken.json"), "{not json").expect("write");
        let store = FileModelStore::new(dir.path());

        let error = store.load("broken").await.expect_err("corrupt artifact");
        assert!(matches!(error, ModelStoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn keys_cannot_escape_the_store_root() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileModelStore::new(dir.path());

        let error = store.save("../outside", &model()).await.expect_err("path traversal");
        assert!(matches!(error, ModelStoreError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryModelStore::default();
        assert!(matches!(store.load("pricing").await, Err(ModelStoreError::NotFound(_))));

        store.save("pricing", &model()).await.expect("save");
        assert!(store.load("pricing").await.is_ok());
    }
}
