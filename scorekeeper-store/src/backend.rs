use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::{Error, Result};

/// A string key-value store.
pub trait KeyValueStore {
    /// Returns the value of `key`, or `None` if `key` does not exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a key that does not exist is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// A [`KeyValueStore`] keeping all values in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// A [`KeyValueStore`] storing every key in its own file within a directory.
///
/// Keys may only contain ASCII alphanumeric characters, `_` and `-`.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a new `FileStore` in the directory `root`. The directory is created on the first
    /// write.
    pub fn new<P>(root: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if valid {
            Ok(self.root.join(format!("{}.json", key)))
        } else {
            Err(Error::Backend(format!("invalid key {:?}", key)))
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.root)?;

        // Write the whole value first so a failed write never leaves a truncated file behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, KeyValueStore, MemoryStore};
    use crate::Error;

    fn test_backend<S>(store: &S)
    where
        S: KeyValueStore,
    {
        assert_eq!(store.get("tournaments").unwrap(), None);

        store.set("tournaments", "[]").unwrap();
        assert_eq!(store.get("tournaments").unwrap().as_deref(), Some("[]"));

        store.set("tournaments", "[1]").unwrap();
        assert_eq!(store.get("tournaments").unwrap().as_deref(), Some("[1]"));

        store.remove("tournaments").unwrap();
        assert_eq!(store.get("tournaments").unwrap(), None);
        store.remove("tournaments").unwrap();
    }

    #[test]
    fn test_memory_store() {
        test_backend(&MemoryStore::new());
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        test_backend(&store);

        store.set("match_history", "[]").unwrap();
        assert!(dir.path().join("data").join("match_history.json").exists());
    }

    #[test]
    fn test_file_store_invalid_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(store.set("../escape", "[]"), Err(Error::Backend(_))));
        assert!(matches!(store.get(""), Err(Error::Backend(_))));
    }
}
