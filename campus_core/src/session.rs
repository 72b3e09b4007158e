use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// The key the logged-in user's role lives under.
pub const ROLE_KEY: &str = "role";

/// Easy alias for error handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can happen while reading or writing storage
#[derive(Debug, Error)]
pub enum Error {
    /// We had a problem reading or writing the backing file, for example with
    /// permissions.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The backing file didn't hold what we expected.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Simple string key/value storage that survives between screens (and, for
/// some implementations, between runs.)
///
/// Writes either take effect completely or not at all: if one fails, reads
/// keep returning what was there before.
pub trait Storage {
    /// Look up a value.
    ///
    /// ## Errors
    ///
    /// If the backing store can't be read.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Set a value, replacing any previous one.
    ///
    /// ## Errors
    ///
    /// If the backing store can't be written.
    fn set_item(&mut self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Forget a value. Removing a key that isn't there is fine.
    ///
    /// ## Errors
    ///
    /// If the backing store can't be written.
    fn remove_item(&mut self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Get the role stored by the last successful login, if any.
///
/// ## Errors
///
/// If the backing store can't be read.
pub fn stored_role<S: Storage + ?Sized>(storage: &S) -> Result<Option<String>> {
    storage.get_item(ROLE_KEY)
}

/// Storage that only lives as long as the value does.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStorage {
    /// Everything stored so far
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    async fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage kept as a JSON object in a file. Reads come from memory; every
/// write goes to disk first and only shows up in memory once it's there.
#[derive(Debug)]
pub struct FileStorage {
    /// Where the JSON lives
    path: PathBuf,

    /// What is on disk, as of our last successful read or write
    items: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open storage at `path`. A missing file is the same as an empty one; it
    /// will be created (along with any missing parent directories) on the
    /// first write.
    ///
    /// ## Errors
    ///
    /// If the file exists but can't be read or isn't a JSON object of
    /// strings.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let items = match fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self { path, items })
    }

    /// Where this storage is kept
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `items` to disk, then adopt them as our current state.
    async fn commit(&mut self, items: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec(&items)?;
        fs::write(&self.path, data).await?;

        tracing::debug!(path = ?self.path, "saved storage");

        self.items = items;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    async fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.clone();
        items.insert(key.to_string(), value.to_string());

        self.commit(items).await
    }

    async fn remove_item(&mut self, key: &str) -> Result<()> {
        if !self.items.contains_key(key) {
            return Ok(());
        }

        let mut items = self.items.clone();
        items.remove(key);

        self.commit(items).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs as std_fs;

    #[tokio::test]
    async fn memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();

        storage.set_item(ROLE_KEY, "faculty").await.unwrap();
        assert_eq!(stored_role(&storage).unwrap().as_deref(), Some("faculty"));

        storage.remove_item(ROLE_KEY).await.unwrap();
        assert_eq!(stored_role(&storage).unwrap(), None);
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::open(dir.path().join("session.json"))
            .await
            .unwrap();

        assert_eq!(stored_role(&storage).unwrap(), None);
    }

    #[tokio::test]
    async fn file_storage_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut storage = FileStorage::open(&path).await.unwrap();
        storage.set_item(ROLE_KEY, "student").await.unwrap();

        let reopened = FileStorage::open(&path).await.unwrap();
        assert_eq!(stored_role(&reopened).unwrap().as_deref(), Some("student"));
    }

    #[tokio::test]
    async fn file_storage_remove_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut storage = FileStorage::open(&path).await.unwrap();
        storage.set_item(ROLE_KEY, "student").await.unwrap();
        storage.remove_item(ROLE_KEY).await.unwrap();

        let reopened = FileStorage::open(&path).await.unwrap();
        assert_eq!(stored_role(&reopened).unwrap(), None);
    }

    #[tokio::test]
    async fn failed_set_keeps_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("sub");
        let mut storage = FileStorage::open(parent.join("session.json"))
            .await
            .unwrap();

        // A regular file where the directory should be makes every write fail.
        std_fs::write(&parent, "in the way").unwrap();

        let res = storage.set_item(ROLE_KEY, "admin").await;

        assert!(matches!(res, Err(Error::Io(_))), "{res:?}");
        assert_eq!(stored_role(&storage).unwrap(), None);
    }

    #[tokio::test]
    async fn failed_remove_keeps_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut storage = FileStorage::open(&path).await.unwrap();
        storage.set_item(ROLE_KEY, "student").await.unwrap();

        // A directory where the file should be makes every write fail.
        std_fs::remove_file(&path).unwrap();
        std_fs::create_dir(&path).unwrap();

        let res = storage.remove_item(ROLE_KEY).await;

        assert!(matches!(res, Err(Error::Io(_))), "{res:?}");
        assert_eq!(stored_role(&storage).unwrap().as_deref(), Some("student"));
    }

    #[tokio::test]
    async fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std_fs::write(&path, "not json").unwrap();

        assert!(matches!(FileStorage::open(&path).await, Err(Error::Json(_))));
    }
}
