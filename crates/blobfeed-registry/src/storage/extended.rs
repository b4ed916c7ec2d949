//! Filesystem storage keeping attributes in extended file attributes.
//!
//! Each blob is a file at `<root>/<container>/<item>`; attribute `Key` is
//! stored as the `user.blobfeed.Key` xattr. Requires a filesystem with user
//! xattr support.
//!
//! Filesystems bound the xattrs of one inode more tightly than the attribute
//! size limit does: ext4 keeps them in a single block (usually 4 KiB,
//! including names and entry headers) and Linux caps a single value at
//! 64 KiB. A commit rejected by the filesystem restores the previous set.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use super::{check_size, AttributeStore, BlobLocation, BlobStorage};
use crate::{
    attributes::AttributeMap,
    error::{ErrorContext, StorageError},
};

const XATTR_PREFIX: &str = "user.blobfeed.";

#[derive(Debug, Clone)]
pub struct XattrStorage {
    root: PathBuf,
    max_attributes_size: usize,
}

impl XattrStorage {
    pub fn new<P: AsRef<Path>>(root: P, max_attributes_size: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_attributes_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, location: &BlobLocation) -> Result<PathBuf, StorageError> {
        location.validate()?;
        Ok(self.root.join(&location.container).join(&location.item))
    }

    fn blob(&self, location: &BlobLocation, path: PathBuf) -> XattrBlob {
        XattrBlob {
            location: location.clone(),
            path,
            attributes: AttributeMap::new(),
            max_attributes_size: self.max_attributes_size,
        }
    }
}

impl BlobStorage for XattrStorage {
    type Blob = XattrBlob;

    fn open_blob(&self, location: &BlobLocation) -> Result<Option<XattrBlob>, StorageError> {
        let path = self.blob_path(location)?;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(self.blob(location, path)))
    }

    fn create_blob(&self, location: &BlobLocation) -> Result<XattrBlob, StorageError> {
        let path = self.blob_path(location)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        Ok(self.blob(location, path))
    }
}

#[derive(Debug)]
pub struct XattrBlob {
    location: BlobLocation,
    path: PathBuf,
    attributes: AttributeMap,
    max_attributes_size: usize,
}

impl XattrBlob {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stored_keys(&self) -> Result<Vec<String>, StorageError> {
        let names = xattr::list(&self.path)
            .with_context(|| format!("listing attributes of {}", self.path.display()))?;
        Ok(names
            .filter_map(|name| {
                name.to_str()
                    .and_then(|name| name.strip_prefix(XATTR_PREFIX))
                    .map(String::from)
            })
            .collect())
    }

    fn read_stored(&self) -> Result<AttributeMap, StorageError> {
        let mut attributes = AttributeMap::new();
        for key in self.stored_keys()? {
            let name = format!("{XATTR_PREFIX}{key}");
            let value = xattr::get(&self.path, &name)
                .with_context(|| format!("reading attribute {name} of {}", self.path.display()))?;
            match value.map(String::from_utf8) {
                Some(Ok(value)) => {
                    attributes.insert(key, value);
                }
                Some(Err(_)) => {
                    warn!("skipping non UTF-8 attribute {name} on {}", self.path.display());
                }
                None => {}
            }
        }
        Ok(attributes)
    }

    fn set_all(&self, attributes: &AttributeMap) -> Result<(), StorageError> {
        for (key, value) in attributes {
            let name = format!("{XATTR_PREFIX}{key}");
            xattr::set(&self.path, &name, value.as_bytes())
                .with_context(|| format!("writing attribute {name} of {}", self.path.display()))?;
        }
        Ok(())
    }

    fn remove_keys<'a>(&self, keys: impl Iterator<Item = &'a String>) -> Result<(), StorageError> {
        for key in keys {
            let name = format!("{XATTR_PREFIX}{key}");
            xattr::remove(&self.path, &name).with_context(|| {
                format!("removing attribute {name} of {}", self.path.display())
            })?;
        }
        Ok(())
    }

    /// Puts the set stored under `previous_keys` back after a partially
    /// applied commit.
    fn restore(&self, previous_keys: &[String], previous: &AttributeMap) -> Result<(), StorageError> {
        let added: Vec<String> = self
            .stored_keys()?
            .into_iter()
            .filter(|key| !previous_keys.contains(key))
            .collect();
        self.remove_keys(added.iter())?;
        self.set_all(previous)
    }
}

impl AttributeStore for XattrBlob {
    fn location(&self) -> &BlobLocation {
        &self.location
    }

    fn fetch_attributes(&mut self) -> Result<(), StorageError> {
        if !self.path.is_file() {
            return Err(StorageError::BlobNotFound(self.location.to_string()));
        }

        self.attributes = self.read_stored()?;
        debug!("fetched {} attributes from {}", self.attributes.len(), self.path.display());
        Ok(())
    }

    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    /// Writes every new value before removing stale keys. If a write fails
    /// the previously stored set is put back, so readers never see a mix of
    /// the two sets once this returns.
    fn commit_attributes(&mut self) -> Result<(), StorageError> {
        check_size(&self.location, &self.attributes, self.max_attributes_size)?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("creating blob {}", self.path.display()))?;

        let previous_keys = self.stored_keys()?;
        let previous = self.read_stored()?;

        if let Err(err) = self.set_all(&self.attributes) {
            if let Err(restore_err) = self.restore(&previous_keys, &previous) {
                warn!(
                    "failed to restore attributes of {}: {}",
                    self.path.display(),
                    restore_err
                );
            }
            return Err(err);
        }

        let stale = previous_keys
            .iter()
            .filter(|key| !self.attributes.contains_key(*key));
        self.remove_keys(stale)?;

        debug!("committed {} attributes to {}", self.attributes.len(), self.path.display());
        Ok(())
    }
}
