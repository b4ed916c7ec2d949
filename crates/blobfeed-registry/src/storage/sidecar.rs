//! Filesystem storage keeping attributes in a JSON sidecar file.
//!
//! Layout: `<root>/<container>/<item>/attributes.json`. Commits go through a
//! temporary file in the same directory followed by a rename, so readers see
//! either the old or the new attribute set.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{check_size, AttributeStore, BlobLocation, BlobStorage};
use crate::{
    attributes::AttributeMap,
    error::{ErrorContext, StorageError},
};

const ATTRIBUTES_FILE: &str = "attributes.json";

#[derive(Debug, Clone)]
pub struct SidecarStorage {
    root: PathBuf,
    max_attributes_size: usize,
}

impl SidecarStorage {
    pub fn new<P: AsRef<Path>>(root: P, max_attributes_size: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_attributes_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_dir(&self, location: &BlobLocation) -> Result<PathBuf, StorageError> {
        location.validate()?;
        Ok(self.root.join(&location.container).join(&location.item))
    }

    fn blob(&self, location: &BlobLocation, dir: PathBuf) -> SidecarBlob {
        SidecarBlob {
            location: location.clone(),
            dir,
            attributes: AttributeMap::new(),
            max_attributes_size: self.max_attributes_size,
        }
    }
}

impl BlobStorage for SidecarStorage {
    type Blob = SidecarBlob;

    fn open_blob(&self, location: &BlobLocation) -> Result<Option<SidecarBlob>, StorageError> {
        let dir = self.blob_dir(location)?;
        if !dir.join(ATTRIBUTES_FILE).is_file() {
            return Ok(None);
        }
        Ok(Some(self.blob(location, dir)))
    }

    fn create_blob(&self, location: &BlobLocation) -> Result<SidecarBlob, StorageError> {
        let dir = self.blob_dir(location)?;
        fs::create_dir_all(&dir).with_context(|| format!("creating directory {}", dir.display()))?;
        Ok(self.blob(location, dir))
    }
}

#[derive(Debug)]
pub struct SidecarBlob {
    location: BlobLocation,
    dir: PathBuf,
    attributes: AttributeMap,
    max_attributes_size: usize,
}

impl SidecarBlob {
    pub fn attributes_path(&self) -> PathBuf {
        self.dir.join(ATTRIBUTES_FILE)
    }
}

impl AttributeStore for SidecarBlob {
    fn location(&self) -> &BlobLocation {
        &self.location
    }

    fn fetch_attributes(&mut self) -> Result<(), StorageError> {
        let path = self.attributes_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::BlobNotFound(self.location.to_string()));
            }
            Err(err) => {
                return Err(StorageError::IoError {
                    action: format!("reading {}", path.display()),
                    source: err,
                });
            }
        };

        self.attributes = serde_json::from_str(&content).map_err(|err| {
            StorageError::CorruptAttributes {
                location: self.location.to_string(),
                source: err,
            }
        })?;
        debug!("fetched {} attributes from {}", self.attributes.len(), path.display());
        Ok(())
    }

    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    fn commit_attributes(&mut self) -> Result<(), StorageError> {
        check_size(&self.location, &self.attributes, self.max_attributes_size)?;

        let dest = self.attributes_path();
        let content = serde_json::to_string_pretty(&self.attributes).map_err(|err| {
            StorageError::CorruptAttributes {
                location: self.location.to_string(),
                source: err,
            }
        })?;

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating directory {}", self.dir.display()))?;
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("creating temporary file in {}", self.dir.display()))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("writing attributes for {}", self.location))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("syncing attributes for {}", self.location))?;
        tmp.persist(&dest)
            .map_err(|err| err.error)
            .with_context(|| format!("renaming attributes into {}", dest.display()))?;

        debug!("committed {} attributes to {}", self.attributes.len(), dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> BlobLocation {
        BlobLocation::new("my-package", "1-0-0")
    }

    #[test]
    fn test_open_missing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SidecarStorage::new(dir.path(), 8192);
        assert!(storage.open_blob(&location()).unwrap().is_none());
    }

    #[test]
    fn test_created_blob_is_absent_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SidecarStorage::new(dir.path(), 8192);
        let _blob = storage.create_blob(&location()).unwrap();
        assert!(storage.open_blob(&location()).unwrap().is_none());
    }

    #[test]
    fn test_commit_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SidecarStorage::new(dir.path(), 8192);

        let mut blob = storage.create_blob(&location()).unwrap();
        blob.attributes_mut()
            .insert("Id".to_string(), "My.Package".to_string());
        blob.attributes_mut()
            .insert("Description".to_string(), "multi\nline, \"quoted\"".to_string());
        blob.commit_attributes().unwrap();

        assert!(dir
            .path()
            .join("my-package/1-0-0/attributes.json")
            .is_file());

        let mut reopened = storage.open_blob(&location()).unwrap().unwrap();
        reopened.fetch_attributes().unwrap();
        assert_eq!(reopened.attributes(), blob.attributes());
    }

    #[test]
    fn test_fetch_corrupted_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SidecarStorage::new(dir.path(), 8192);
        let blob_dir = dir.path().join("my-package/1-0-0");
        fs::create_dir_all(&blob_dir).unwrap();
        fs::write(blob_dir.join(ATTRIBUTES_FILE), "NOT JSON").unwrap();

        let mut blob = storage.open_blob(&location()).unwrap().unwrap();
        assert!(matches!(
            blob.fetch_attributes(),
            Err(StorageError::CorruptAttributes { .. })
        ));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SidecarStorage::new(dir.path(), 8192);
        let result = storage.create_blob(&BlobLocation::new("..", "1-0-0"));
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
    }

    #[test]
    fn test_commit_rejects_oversized_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SidecarStorage::new(dir.path(), 32);
        let mut blob = storage.create_blob(&location()).unwrap();
        blob.attributes_mut()
            .insert("ReleaseNotes".to_string(), "x".repeat(64));
        assert!(matches!(
            blob.commit_attributes(),
            Err(StorageError::AttributesTooLarge { .. })
        ));
        assert!(storage.open_blob(&location()).unwrap().is_none());
    }
}
